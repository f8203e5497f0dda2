// platform.rs - Target platform and compiler identity
//
// Both are immutable inputs supplied once per run by whatever drives
// the probe (a build script or the runner binary).

use anyhow::{bail, Result};
use std::env;

/// Word size of the target being compiled for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arch {
    X86,
    X86_64,
    Other,
}

/// Operating-system family of the target. `Unix` covers every
/// non-Apple Unix (Linux, the BSDs).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Os {
    Windows,
    MacOs,
    Unix,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
}

impl Platform {
    pub fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Read the target out of the CARGO_CFG_* variables Cargo sets for
    /// build scripts. Fails outside a build-script context.
    pub fn from_cargo_env() -> Result<Self> {
        let Some(target_os) = env::var_os("CARGO_CFG_TARGET_OS") else {
            bail!("CARGO_CFG_TARGET_OS is not set; not running under a build script");
        };
        let os = match target_os.to_string_lossy().as_ref() {
            "windows" => Os::Windows,
            "macos" | "ios" => Os::MacOs,
            _ => Os::Unix,
        };
        let arch = match env::var("CARGO_CFG_TARGET_POINTER_WIDTH").as_deref() {
            Ok("32") => Arch::X86,
            Ok("64") => Arch::X86_64,
            _ => Arch::Other,
        };
        Ok(Self { os, arch })
    }

    /// The platform this probe itself was compiled for. Used when the
    /// probe runs standalone rather than inside a build script.
    pub fn host() -> Self {
        let os = if cfg!(target_os = "windows") {
            Os::Windows
        } else if cfg!(target_os = "macos") {
            Os::MacOs
        } else {
            Os::Unix
        };
        let arch = if cfg!(target_pointer_width = "64") {
            Arch::X86_64
        } else if cfg!(target_pointer_width = "32") {
            Arch::X86
        } else {
            Arch::Other
        };
        Self { os, arch }
    }
}

/// Front-end that preprocesses the toolkit headers when bindings are
/// generated against the resolved installation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompilerFlavor {
    Gnu,
    Clang,
    Msvc,
}

impl CompilerFlavor {
    /// Canonical name, used as a key in serialized option maps.
    pub fn name(self) -> &'static str {
        match self {
            CompilerFlavor::Gnu => "gnu",
            CompilerFlavor::Clang => "clang",
            CompilerFlavor::Msvc => "msvc",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompilerIdentity {
    pub flavor: CompilerFlavor,
    pub version: (u32, u32),
}

impl CompilerIdentity {
    pub fn new(flavor: CompilerFlavor, version: (u32, u32)) -> Self {
        Self { flavor, version }
    }
}
