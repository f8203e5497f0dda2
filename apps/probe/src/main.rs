//! Toolkit probe runner
//!
//! Drives the discovery pipeline once for the current target:
//! resolve installation -> synthesize options -> linker sanity check ->
//! persist the generated build-info file.
//!
//! Exit status is non-zero when no installation can be found or when the
//! toolchain linker is known to corrupt CUDA links, so a calling build
//! stops before producing a broken binary. Check failures that merely
//! prevent checking warn and let the run succeed.
//!
//! Usage: probe [--profiling] [OUTPUT_DIR]

use anyhow::Result;
use cuda_locate::candidates::default_candidates;
use cuda_locate::platform::{CompilerFlavor, CompilerIdentity, Os, Platform};
use cuda_locate::{dll_names, ldcheck, options, resolve};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let mut profiling = false;
    let mut out_dir = PathBuf::from(".");
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--profiling" => profiling = true,
            other => out_dir = PathBuf::from(other),
        }
    }

    let platform = Platform::from_cargo_env().unwrap_or_else(|_| Platform::host());
    let compiler = detect_compiler(platform);

    let install = resolve::resolve(&default_candidates(platform))?;
    let mut opts = options::synthesize(&install, platform, compiler, profiling);
    if platform.os == Os::Windows {
        dll_names::add_runtime_dlls(&mut opts)?;
    }

    // Runs regardless of the synthesis outcome above; an incompatible
    // linker aborts even a probe that found a perfectly good toolkit.
    let cc = ldcheck::default_compiler(platform);
    ldcheck::check(platform, cc.as_deref())?;

    let written = cuda_buildinfo::write_generated(&out_dir, &opts)?;
    let user_file = out_dir.join(cuda_buildinfo::USER_FILE);
    if user_file.is_file() {
        println!(
            "note: {} exists and overrides {}",
            user_file.display(),
            written.display()
        );
    }

    println!("toolkit root: {}", install.root.display());
    println!("include dirs: {}", join_paths(&opts.include_dirs));
    println!("library dirs: {}", join_paths(&opts.library_dirs));
    println!("libraries:    {}", opts.libraries.join(", "));
    if !opts.frameworks.is_empty() {
        println!("frameworks:   {}", opts.frameworks.join(", "));
    }
    println!("wrote {}", written.display());
    Ok(())
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// The probe is the external trigger here, so it has to supply a
/// compiler identity itself: flavor from the target family, version
/// parsed out of `cc --version` when a compiler is reachable.
fn detect_compiler(platform: Platform) -> CompilerIdentity {
    let flavor = match platform.os {
        Os::Windows => CompilerFlavor::Msvc,
        Os::MacOs => CompilerFlavor::Clang,
        Os::Unix => CompilerFlavor::Gnu,
    };
    let version = ldcheck::default_compiler(platform)
        .and_then(|cc| {
            std::process::Command::new(cc)
                .arg("--version")
                .output()
                .ok()
        })
        .and_then(|out| parse_cc_version(&String::from_utf8_lossy(&out.stdout)))
        .unwrap_or((0, 0));
    CompilerIdentity::new(flavor, version)
}

/// First dotted-number token in the banner line, as (major, minor).
fn parse_cc_version(banner: &str) -> Option<(u32, u32)> {
    let first_line = banner.lines().next()?;
    for token in first_line.split_whitespace() {
        let mut parts = token.split('.');
        if let (Some(major), Some(minor)) = (parts.next(), parts.next()) {
            if let (Ok(major), Ok(minor)) = (major.parse(), minor.parse()) {
                return Some((major, minor));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cc_version_gcc_banner() {
        let banner = "cc (Ubuntu 11.4.0-1ubuntu1~22.04) 11.4.0\nCopyright (C) 2021\n";
        assert_eq!(parse_cc_version(banner), Some((11, 4)));
    }

    #[test]
    fn test_parse_cc_version_clang_banner() {
        let banner = "Apple clang version 15.0.0 (clang-1500.1.0.2.5)\n";
        assert_eq!(parse_cc_version(banner), Some((15, 0)));
    }

    #[test]
    fn test_parse_cc_version_rejects_bannerless_output() {
        assert_eq!(parse_cc_version("no numbers here\n"), None);
        assert_eq!(parse_cc_version(""), None);
    }
}
