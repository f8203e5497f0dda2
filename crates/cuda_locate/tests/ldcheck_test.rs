#![cfg(unix)]
// End-to-end linker check against a scripted toolchain layout. The
// affected platform is data, so the Windows-only branch is exercised on
// any host by pointing it at shell scripts that mimic gcc and ld.

use cuda_locate::ldcheck::{check, LdStatus};
use cuda_locate::platform::{Arch, Os, Platform};
use cuda_locate::version::LdVersion;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

fn win64() -> Platform {
    Platform::new(Os::Windows, Arch::X86_64)
}

/// Lay out <root>/bin/gcc.exe and <root>/x86_64-w64-mingw32/bin/ld.exe,
/// with ld printing the given --version line.
fn scripted_toolchain(label: &str, version_line: &str) -> (PathBuf, PathBuf) {
    let root = std::env::temp_dir().join(format!("cuda_locate_ld_{}_{}", label, std::process::id()));
    let _ = fs::remove_dir_all(&root);

    let cc = root.join("bin").join("gcc.exe");
    fs::create_dir_all(cc.parent().unwrap()).unwrap();
    fs::write(&cc, "#!/bin/sh\nexit 0\n").unwrap();

    let ld = root.join("x86_64-w64-mingw32").join("bin").join("ld.exe");
    fs::create_dir_all(ld.parent().unwrap()).unwrap();
    fs::write(&ld, format!("#!/bin/sh\necho '{version_line}'\n")).unwrap();

    for exe in [&cc, &ld] {
        let mut perm = fs::metadata(exe).unwrap().permissions();
        perm.set_mode(0o755);
        fs::set_permissions(exe, perm).unwrap();
    }
    (cc, ld)
}

#[test]
fn test_old_linker_fails_the_build() {
    let (cc, ld) = scripted_toolchain("old", "GNU ld (GNU Binutils) 2.20.51.20100613");
    let err = check(win64(), Some(&cc)).unwrap_err().to_string();
    assert!(err.contains(&ld.display().to_string()), "must name the binary: {err}");
    assert!(err.contains("2.20.51.20100613"));
    assert!(err.contains("sourceware.org"), "must link the bug report");
    assert!(err.contains("sourceforge.net"), "must link fixed binaries");
}

#[test]
fn test_safe_linker_passes() {
    let (cc, _ld) = scripted_toolchain("safe", "GNU ld (GNU Binutils) 2.25.1");
    match check(win64(), Some(&cc)).unwrap() {
        LdStatus::Ok(version) => assert_eq!(version, LdVersion(vec![2, 25, 1])),
        other => panic!("expected Ok, got {other:?}"),
    }
}

#[test]
fn test_newer_linker_passes() {
    let (cc, _ld) = scripted_toolchain("newer", "GNU ld (GNU Binutils) 2.40");
    assert!(matches!(check(win64(), Some(&cc)).unwrap(), LdStatus::Ok(_)));
}

#[test]
fn test_unparseable_version_is_soft() {
    let (cc, _ld) = scripted_toolchain("garbled", "GNU ld version unknown");
    match check(win64(), Some(&cc)).unwrap() {
        LdStatus::Skipped(reason) => assert!(reason.contains("unparseable")),
        other => panic!("expected soft skip, got {other:?}"),
    }
}
