// resolve.rs - Walk candidate locations until one validates

use crate::candidates::Candidate;
use crate::diag;
use anyhow::{anyhow, Result};
use std::io;
use std::path::{Path, PathBuf};

/// Header whose presence marks a directory as a real toolkit root.
pub const MARKER_HEADER: &str = "cuda.h";

/// Subdirectory the marker header lives in.
pub const INCLUDE_SUBDIR: &str = "include";

/// A validated toolkit root. Created once per run and consumed
/// immediately by the option synthesizer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Installation {
    pub root: PathBuf,
}

/// Printed when every candidate has been tried and none validated.
const NOT_FOUND_HELP: &str = "\
********************************************************************************
Failed to locate a CUDA toolkit installation.

The CUDA toolkit provides the headers and libraries this package links
against. Install it from:

    https://developer.nvidia.com/cuda-downloads

If the toolkit is already installed, either set the CUDA_PATH environment
variable to the installation root (the directory containing include/ and
lib/), or make sure the nvcc compiler driver is reachable through PATH.
For installations in non-standard locations, a hand-written
cuda-buildinfo.toml next to the consuming crate overrides probing
entirely.
********************************************************************************";

/// Check whether `root` really contains the toolkit: the marker header
/// must exist under the include subdirectory. I/O failures count as
/// "not an installation" so that one unreadable candidate never aborts
/// the search. Every decision leaves a diagnostic trace.
pub fn is_installation(root: &Path) -> bool {
    let marker = root.join(INCLUDE_SUBDIR).join(MARKER_HEADER);
    match probe_file(&marker) {
        Ok(true) => {
            diag::note(&format!("accepted {}", root.display()));
            true
        }
        Ok(false) => {
            diag::note(&format!("rejected {} ({} not found)", root.display(), marker.display()));
            false
        }
        Err(e) => {
            diag::note(&format!("rejected {} ({})", root.display(), e));
            false
        }
    }
}

fn probe_file(path: &Path) -> io::Result<bool> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(meta.is_file()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Try candidates strictly in order; the first one that both produces a
/// path and validates wins. Candidates that produce nothing are skipped
/// silently. Exhausting the list is a hard error carrying the full
/// remediation text.
pub fn resolve(candidates: &[Candidate]) -> Result<Installation> {
    for candidate in candidates {
        let Some(root) = candidate.probe() else {
            continue;
        };
        if is_installation(&root) {
            diag::note(&format!(
                "using toolkit at {} (via {})",
                root.display(),
                candidate.source
            ));
            return Ok(Installation { root });
        }
    }
    Err(anyhow!(NOT_FOUND_HELP))
}
