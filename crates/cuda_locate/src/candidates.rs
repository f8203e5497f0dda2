// candidates.rs - Ordered search locations for a toolkit installation

use crate::platform::{Os, Platform};
use std::env;
use std::path::PathBuf;

/// Primary override, consulted before any other location.
pub const TOOLKIT_ENV_VAR: &str = "CUDA_PATH";

/// Compiler driver whose location on PATH betrays the install root.
pub const TOOLKIT_COMPILER: &str = "nvcc";

/// Toolkit releases whose Windows installers leave a versioned
/// CUDA_PATH_Vmaj_min variable behind, newest first. Order is the
/// search order; extend the table when a new release ships.
pub const RELEASE_ENV_FALLBACK: &[(u32, u32)] = &[
    (13, 0),
    (12, 9),
    (12, 8),
    (12, 6),
    (12, 5),
    (12, 4),
    (12, 3),
    (12, 2),
    (12, 1),
    (12, 0),
    (11, 8),
    (11, 7),
    (11, 6),
    (11, 5),
    (11, 4),
    (11, 3),
    (11, 2),
    (11, 1),
    (11, 0),
    (10, 2),
    (10, 1),
    (10, 0),
];

/// One place an installation might live. The probe runs lazily, so
/// candidates below the first accepted one are never evaluated. A probe
/// returning None disqualifies the candidate without further noise.
pub struct Candidate {
    pub source: String,
    probe: Box<dyn Fn() -> Option<PathBuf>>,
}

impl Candidate {
    pub fn new(source: impl Into<String>, probe: impl Fn() -> Option<PathBuf> + 'static) -> Self {
        Self {
            source: source.into(),
            probe: Box::new(probe),
        }
    }

    pub fn probe(&self) -> Option<PathBuf> {
        (self.probe)()
    }
}

/// Candidate fed by an environment variable. The value is taken as-is;
/// whether it is a real installation is the validator's business.
pub fn env_var(name: &str) -> Candidate {
    let name = name.to_string();
    Candidate::new(format!("environment variable {name}"), move || {
        env::var_os(&name).map(PathBuf::from)
    })
}

/// Candidate derived from finding the toolkit compiler driver on PATH.
/// The driver lives in `<root>/bin`, so the root is two levels up.
pub fn compiler_on_path(platform: Platform) -> Candidate {
    let exe_name = match platform.os {
        Os::Windows => format!("{TOOLKIT_COMPILER}.exe"),
        _ => TOOLKIT_COMPILER.to_string(),
    };
    Candidate::new(format!("{TOOLKIT_COMPILER} on PATH"), move || {
        let exe = find_in_path(&exe_name)?;
        Some(exe.parent()?.parent()?.to_path_buf())
    })
}

/// Hard-coded per-platform default install location.
pub fn default_install_dir(platform: Platform) -> Candidate {
    let path = match platform.os {
        Os::Windows => PathBuf::from("C:/Program Files/NVIDIA GPU Computing Toolkit/CUDA"),
        Os::MacOs | Os::Unix => PathBuf::from("/usr/local/cuda"),
    };
    Candidate::new(format!("default location {}", path.display()), move || {
        Some(path.clone())
    })
}

/// One candidate per past release that registers a versioned
/// environment variable, in the order given.
pub fn versioned_env_vars(releases: &[(u32, u32)]) -> Vec<Candidate> {
    releases
        .iter()
        .map(|&(major, minor)| env_var(&format!("{TOOLKIT_ENV_VAR}_V{major}_{minor}")))
        .collect()
}

/// The full search order: primary override, compiler on PATH, platform
/// default, then per-release fallback variables.
pub fn default_candidates(platform: Platform) -> Vec<Candidate> {
    let mut all = vec![
        env_var(TOOLKIT_ENV_VAR),
        compiler_on_path(platform),
        default_install_dir(platform),
    ];
    all.extend(versioned_env_vars(RELEASE_ENV_FALLBACK));
    all
}

/// Search PATH for an executable, first hit wins.
pub fn find_in_path(exe_name: &str) -> Option<PathBuf> {
    let path = env::var_os("PATH")?;
    env::split_paths(&path)
        .map(|dir| dir.join(exe_name))
        .find(|candidate| candidate.is_file())
}
