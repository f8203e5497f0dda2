// lib.rs - Persisted build options with user override
//
// The probe writes the options it derived to a generated file. A
// hand-written file at the user path always wins, so an installation in
// an odd place can be described once, committed, and probing never
// consulted again. Lookup is the same first-hit-wins walk the toolkit
// search uses, over exactly two candidates.

use anyhow::{anyhow, Context, Result};
use cuda_locate::candidates::Candidate;
use cuda_locate::options::BuildOptions;
use std::fs;
use std::path::{Path, PathBuf};

/// File a user checks in next to the consuming crate to pin options.
pub const USER_FILE: &str = "cuda-buildinfo.toml";

/// File the probe regenerates on every successful resolution.
pub const GENERATED_FILE: &str = "cuda-buildinfo.generated.toml";

/// Serialize the options to the generated file under `dir`, replacing
/// any previous run's output. Returns the path written.
pub fn write_generated(dir: &Path, options: &BuildOptions) -> Result<PathBuf> {
    let path = dir.join(GENERATED_FILE);
    let text = toml::to_string_pretty(options).context("serializing build options")?;
    fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

/// Load options from `dir`: the user file if present, else the
/// generated one, else an error telling the caller to run the probe.
pub fn load(dir: &Path) -> Result<BuildOptions> {
    let sources = [
        existing_file("user build info", dir.join(USER_FILE)),
        existing_file("generated build info", dir.join(GENERATED_FILE)),
    ];
    let path = sources
        .iter()
        .find_map(|candidate| candidate.probe())
        .ok_or_else(|| {
            anyhow!(
                "neither {} nor {} exists in {}; run the probe first",
                USER_FILE,
                GENERATED_FILE,
                dir.display()
            )
        })?;
    read_file(&path)
}

pub fn read_file(path: &Path) -> Result<BuildOptions> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn existing_file(source: &str, path: PathBuf) -> Candidate {
    Candidate::new(source.to_string(), move || path.is_file().then(|| path.clone()))
}

/// Render loaded options as build-script directives on stdout, the form
/// Cargo consumes them in. `_static`-suffixed libraries get the static
/// link kind, frameworks the framework kind.
pub fn emit_cargo_directives(options: &BuildOptions) {
    for dir in &options.include_dirs {
        println!("cargo:include={}", dir.display());
    }
    for dir in &options.library_dirs {
        println!("cargo:rustc-link-search=native={}", dir.display());
    }
    for lib in &options.libraries {
        if lib.ends_with("_static") {
            println!("cargo:rustc-link-lib=static={lib}");
        } else {
            println!("cargo:rustc-link-lib={lib}");
        }
    }
    for framework in &options.frameworks {
        println!("cargo:rustc-link-lib=framework={framework}");
    }
    for flag in &options.ld_flags {
        println!("cargo:rustc-link-arg={flag}");
    }
}
