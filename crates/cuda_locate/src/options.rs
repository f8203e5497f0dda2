// options.rs - Derive compile and link settings from a validated root

use crate::platform::{Arch, CompilerFlavor, CompilerIdentity, Os, Platform};
use crate::resolve::{Installation, INCLUDE_SUBDIR};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Binding generation emits exhaustive enum matches only when the
/// preprocessing front-end is at least this version.
pub const EXHAUSTIVE_ENUMS_SINCE: (u32, u32) = (3, 9);

/// Complete set of options needed to compile and link against the
/// toolkit. Every path in here is derived from the validated install
/// root plus a platform-determined suffix; nothing is invented.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    pub include_dirs: Vec<PathBuf>,
    pub library_dirs: Vec<PathBuf>,
    pub libraries: Vec<String>,
    pub frameworks: Vec<String>,
    /// Raw arguments for the final link step.
    pub ld_flags: Vec<String>,
    /// Arguments for the header preprocessor that generates bindings.
    pub bindgen_args: Vec<String>,
    /// Per-front-end compile flags, keyed by canonical flavor name.
    pub compiler_flags: BTreeMap<String, Vec<String>>,
    /// Free-form fields a consumer may interpret, e.g. runtime DLL names.
    pub extra: BTreeMap<String, String>,
}

/// Relative library directory for a target. Total over the whole
/// platform matrix; keep the arms explicit so the table stays auditable.
pub fn lib_subdir(platform: Platform) -> &'static str {
    match (platform.os, platform.arch) {
        (Os::Windows, Arch::X86) => "lib/Win32",
        (Os::Windows, Arch::X86_64) => "lib/x64",
        (Os::Windows, Arch::Other) => "lib",
        (Os::MacOs, _) => "lib",
        (Os::Unix, Arch::X86_64) => "lib64",
        (Os::Unix, Arch::X86) | (Os::Unix, Arch::Other) => "lib",
    }
}

/// Libraries to link. macOS links the static runtime plus the device
/// runtime; everywhere else the shared runtime plus the driver stub.
fn runtime_libraries(os: Os) -> &'static [&'static str] {
    match os {
        Os::MacOs => &["cudadevrt", "cudart_static"],
        Os::Windows | Os::Unix => &["cudart", "cuda"],
    }
}

/// Word-size flag understood by gnu/clang front-ends.
fn arch_flag(arch: Arch) -> Option<&'static str> {
    match arch {
        Arch::X86 => Some("-m32"),
        Arch::X86_64 => Some("-m64"),
        Arch::Other => None,
    }
}

/// Derive the full option set for one configuration.
///
/// Pure: identical inputs always yield an identical value. The
/// Windows-only runtime-DLL lookup is a separate step (`dll_names`)
/// composed by the caller, so synthesis itself cannot fail.
pub fn synthesize(
    install: &Installation,
    platform: Platform,
    compiler: CompilerIdentity,
    profiling: bool,
) -> BuildOptions {
    let mut options = BuildOptions::default();

    options.include_dirs.push(install.root.join(INCLUDE_SUBDIR));
    let lib_dir = install.root.join(lib_subdir(platform));
    options.library_dirs.push(lib_dir.clone());

    options.libraries = runtime_libraries(platform.os)
        .iter()
        .map(|name| name.to_string())
        .collect();
    if platform.os == Os::MacOs {
        options.frameworks.push("CUDA".to_string());
    }

    // The static runtime on macOS needs no embedded search path; on
    // other Unixes the produced binary must find libcudart at run time
    // without LD_LIBRARY_PATH. Profiling builds inject their own
    // runtime and skip the embedding.
    if platform.os == Os::Unix && !profiling {
        options
            .ld_flags
            .push(format!("-Wl,-rpath,{}", lib_dir.display()));
    }

    let mut cc_flags: Vec<String> = Vec::new();
    if let Some(flag) = arch_flag(platform.arch) {
        options.bindgen_args.push(flag.to_string());
        cc_flags.push(flag.to_string());
    }
    if platform.os == Os::MacOs {
        // The Apple blocks extension keyword collides with CUDA header
        // naming; undefine it for header preprocessing only.
        options.bindgen_args.push("-U__BLOCKS__".to_string());
    }
    if compiler.version >= EXHAUSTIVE_ENUMS_SINCE {
        options
            .bindgen_args
            .push("-DCUDA_ENUMS_EXHAUSTIVE".to_string());
        cc_flags.push("-DCUDA_ENUMS_EXHAUSTIVE".to_string());
    }
    if !cc_flags.is_empty() && compiler.flavor != CompilerFlavor::Msvc {
        options
            .compiler_flags
            .insert(compiler.flavor.name().to_string(), cc_flags);
    }

    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Arch, CompilerFlavor, CompilerIdentity, Os, Platform};
    use crate::resolve::Installation;
    use std::path::Path;

    const ALL_OS: [Os; 3] = [Os::Windows, Os::MacOs, Os::Unix];
    const ALL_ARCH: [Arch; 3] = [Arch::X86, Arch::X86_64, Arch::Other];

    fn install() -> Installation {
        Installation {
            root: Path::new("/opt/cuda").to_path_buf(),
        }
    }

    fn clang() -> CompilerIdentity {
        CompilerIdentity::new(CompilerFlavor::Clang, (9, 0))
    }

    #[test]
    fn test_lib_subdir_total_over_platform_matrix() {
        for os in ALL_OS {
            for arch in ALL_ARCH {
                let suffix = lib_subdir(Platform::new(os, arch));
                assert!(!suffix.is_empty());
            }
        }
    }

    #[test]
    fn test_lib_subdir_known_rows() {
        assert_eq!(lib_subdir(Platform::new(Os::Windows, Arch::X86)), "lib/Win32");
        assert_eq!(lib_subdir(Platform::new(Os::Windows, Arch::X86_64)), "lib/x64");
        assert_eq!(lib_subdir(Platform::new(Os::MacOs, Arch::X86_64)), "lib");
        assert_eq!(lib_subdir(Platform::new(Os::Unix, Arch::X86_64)), "lib64");
        assert_eq!(lib_subdir(Platform::new(Os::Unix, Arch::X86)), "lib");
    }

    #[test]
    fn test_all_paths_derive_from_root() {
        for os in ALL_OS {
            for arch in ALL_ARCH {
                let options = synthesize(&install(), Platform::new(os, arch), clang(), false);
                for dir in options.include_dirs.iter().chain(&options.library_dirs) {
                    assert!(dir.starts_with("/opt/cuda"), "{} escapes the root", dir.display());
                }
            }
        }
    }

    #[test]
    fn test_macos_output() {
        let options = synthesize(&install(), Platform::new(Os::MacOs, Arch::X86_64), clang(), false);
        assert_eq!(options.libraries, vec!["cudadevrt", "cudart_static"]);
        assert_eq!(options.frameworks, vec!["CUDA"]);
        assert!(options.ld_flags.iter().all(|f| !f.contains("rpath")));
        assert!(options.bindgen_args.contains(&"-U__BLOCKS__".to_string()));
        assert!(options.bindgen_args.contains(&"-m64".to_string()));
    }

    #[test]
    fn test_linux_links_shared_runtime_with_rpath() {
        let options = synthesize(&install(), Platform::new(Os::Unix, Arch::X86_64), clang(), false);
        assert_eq!(options.libraries, vec!["cudart", "cuda"]);
        assert!(options.frameworks.is_empty());
        assert_eq!(options.library_dirs, vec![Path::new("/opt/cuda/lib64")]);
        assert_eq!(options.ld_flags, vec!["-Wl,-rpath,/opt/cuda/lib64"]);
    }

    #[test]
    fn test_profiling_omits_rpath() {
        let options = synthesize(&install(), Platform::new(Os::Unix, Arch::X86_64), clang(), true);
        assert!(options.ld_flags.is_empty());
    }

    #[test]
    fn test_windows_omits_rpath() {
        let options = synthesize(&install(), Platform::new(Os::Windows, Arch::X86_64), clang(), false);
        assert!(options.ld_flags.is_empty());
        assert_eq!(options.library_dirs, vec![Path::new("/opt/cuda/lib/x64")]);
    }

    #[test]
    fn test_exhaustive_enum_define_gated_on_version() {
        let old = CompilerIdentity::new(CompilerFlavor::Clang, (3, 8));
        let new = CompilerIdentity::new(CompilerFlavor::Clang, (3, 9));
        let platform = Platform::new(Os::Unix, Arch::X86_64);
        let without = synthesize(&install(), platform, old, false);
        let with = synthesize(&install(), platform, new, false);
        assert!(!without.bindgen_args.contains(&"-DCUDA_ENUMS_EXHAUSTIVE".to_string()));
        assert!(with.bindgen_args.contains(&"-DCUDA_ENUMS_EXHAUSTIVE".to_string()));
    }

    #[test]
    fn test_no_arch_flag_for_unknown_word_size() {
        let options = synthesize(&install(), Platform::new(Os::Unix, Arch::Other), clang(), false);
        assert!(!options.bindgen_args.iter().any(|f| f == "-m32" || f == "-m64"));
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let platform = Platform::new(Os::Unix, Arch::X86_64);
        let a = synthesize(&install(), platform, clang(), false);
        let b = synthesize(&install(), platform, clang(), false);
        assert_eq!(a, b);
    }
}
