// ldcheck.rs - Detect the mingw-w64 ld known to corrupt CUDA links
//
// On 64-bit Windows the linker that performs the final link is not the
// one the build tool reports: it sits in the target-triple toolchain
// directory next to the C compiler. Binutils ld before 2.25.1
// miscompiles relocations in CUDA object files, producing binaries that
// link cleanly and crash on the first API call. Old enough to check for,
// bad enough to stop the build over.

use crate::candidates::find_in_path;
use crate::diag;
use crate::platform::{Arch, Os, Platform};
use crate::version::LdVersion;
use anyhow::{anyhow, Result};
use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Oldest ld known to link CUDA object files correctly.
pub const MIN_SAFE_LD: &[u32] = &[2, 25, 1];

/// Toolchain subdirectory holding the real linker, relative to two
/// levels above the C compiler.
const TOOLCHAIN_SUBDIR: &str = "x86_64-w64-mingw32";

const CHECK_DOC_URL: &str = "https://sourceware.org/bugzilla/show_bug.cgi?id=16598";
const FIXED_LD_URL: &str = "https://sourceforge.net/projects/mingw-w64/files/";

/// Outcome of the compatibility check. Fatal incompatibility is an
/// error from [`check`], not a variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LdStatus {
    /// Target is not the affected platform; nothing was probed.
    NotApplicable,
    /// Linker found and its version is safe.
    Ok(LdVersion),
    /// The check could not be carried out. A warning was emitted and
    /// the build is allowed to continue.
    Skipped(String),
}

/// Run the linker compatibility check for `platform`.
///
/// `compiler` is the C compiler the build already knows about; the
/// suspect linker is derived from its location. Everything that merely
/// prevents the check from running is a soft failure: warn, then let
/// the build continue. Only a linker that parses and compares below
/// [`MIN_SAFE_LD`] is fatal.
pub fn check(platform: Platform, compiler: Option<&Path>) -> Result<LdStatus> {
    if !(platform.os == Os::Windows && platform.arch == Arch::X86_64) {
        return Ok(LdStatus::NotApplicable);
    }

    let Some(cc) = compiler else {
        return Ok(skip("C compiler not found; linker version not checked"));
    };
    let Some(ld) = derived_ld_path(cc) else {
        return Ok(skip(&format!(
            "cannot derive toolchain layout from {}; linker version not checked",
            cc.display()
        )));
    };
    if !ld.is_file() {
        return Ok(skip(&format!(
            "{} does not exist; linker version not checked",
            ld.display()
        )));
    }

    let output = match Command::new(&ld).arg("--version").output() {
        Ok(output) => output,
        Err(e) => {
            return Ok(skip(&format!(
                "failed to run {} --version ({}); linker version not checked",
                ld.display(),
                e
            )));
        }
    };
    let text = String::from_utf8_lossy(&output.stdout);
    let version = match LdVersion::from_version_output(&text) {
        Ok(version) => version,
        Err(e) => {
            return Ok(skip(&format!(
                "unparseable linker version {:?} ({}); linker version not checked",
                text.lines().next().unwrap_or(""),
                e
            )));
        }
    };

    if version < LdVersion(MIN_SAFE_LD.to_vec()) {
        return Err(anyhow!(bad_ld_message(&ld, &version)));
    }
    diag::debug(&format!("linker {} version {} is safe", ld.display(), version));
    Ok(LdStatus::Ok(version))
}

/// The C compiler the build would use: CC if set, otherwise gcc on PATH.
pub fn default_compiler(platform: Platform) -> Option<PathBuf> {
    if let Some(cc) = env::var_os("CC") {
        return Some(PathBuf::from(cc));
    }
    let exe = match platform.os {
        Os::Windows => "gcc.exe",
        Os::MacOs | Os::Unix => "cc",
    };
    find_in_path(exe)
}

fn skip(reason: &str) -> LdStatus {
    diag::warn(&format!("{reason} (see {CHECK_DOC_URL})"));
    LdStatus::Skipped(reason.to_string())
}

/// `<cc>/../../x86_64-w64-mingw32/bin/ld.exe`
fn derived_ld_path(cc: &Path) -> Option<PathBuf> {
    let toolchain_root = cc.parent()?.parent()?;
    Some(
        toolchain_root
            .join(TOOLCHAIN_SUBDIR)
            .join("bin")
            .join("ld.exe"),
    )
}

fn bad_ld_message(ld: &Path, version: &LdVersion) -> String {
    format!(
        "\
********************************************************************************
Incompatible linker detected:

    {} (version {})

ld.exe before 2.25.1 silently corrupts relocations when linking CUDA
object files. The link succeeds, but the resulting binary crashes on the
first call into the toolkit. Update the mingw-w64 binutils shipped with
your toolchain before building.

    bug report: {}
    fixed binaries: {}
********************************************************************************",
        ld.display(),
        version,
        CHECK_DOC_URL,
        FIXED_LD_URL,
    )
}
