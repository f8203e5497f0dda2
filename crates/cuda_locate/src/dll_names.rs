// dll_names.rs - Map import libraries to the DLLs they pull in
//
// Windows import libraries (cudart.lib) are archives whose members name
// the versioned DLL (cudart64_12.dll) the binary loads at start-up.
// Consumers that copy runtime DLLs next to their executable need those
// names, so they are recorded in the extra options field.

use crate::options::BuildOptions;
use anyhow::{anyhow, Context, Result};
use std::path::Path;
use std::process::Command;

/// Binary-symbol dump tool shipped with MSVC.
const SYMBOL_DUMP_TOOL: &str = "dumpbin";

/// Extra-field key the DLL list is stored under.
pub const RUNTIME_DLLS_KEY: &str = "runtime-dlls";

/// Resolve the runtime DLL names behind every import library in the
/// option set and record them under [`RUNTIME_DLLS_KEY`]. Import
/// libraries that do not exist on disk (static stubs) are skipped; a
/// failing dump tool is a real error and propagates.
pub fn add_runtime_dlls(options: &mut BuildOptions) -> Result<()> {
    let Some(lib_dir) = options.library_dirs.first().cloned() else {
        return Ok(());
    };
    let mut dlls: Vec<String> = Vec::new();
    for lib in &options.libraries {
        let lib_path = lib_dir.join(format!("{lib}.lib"));
        if !lib_path.is_file() {
            continue;
        }
        let output = Command::new(SYMBOL_DUMP_TOOL)
            .arg("/NOLOGO")
            .arg("/ARCHIVEMEMBERS")
            .arg(&lib_path)
            .output()
            .with_context(|| format!("running {} on {}", SYMBOL_DUMP_TOOL, lib_path.display()))?;
        if !output.status.success() {
            return Err(anyhow!(
                "{} failed on {}: {}",
                SYMBOL_DUMP_TOOL,
                lib_path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }
        for name in extract_dll_names(&String::from_utf8_lossy(&output.stdout)) {
            if !dlls.contains(&name) {
                dlls.push(name);
            }
        }
    }
    if !dlls.is_empty() {
        options
            .extra
            .insert(RUNTIME_DLLS_KEY.to_string(), dlls.join(","));
    }
    Ok(())
}

/// Pull every distinct `*.dll` token out of an archive-member listing,
/// stripping directory prefixes and surrounding punctuation.
pub fn extract_dll_names(listing: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for token in listing.split_whitespace() {
        let token = token.trim_matches(|c| matches!(c, '(' | ')' | ':' | ',' | '/'));
        if !token.to_ascii_lowercase().ends_with(".dll") {
            continue;
        }
        let name = token
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(token)
            .to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_member_names() {
        // dumpbin terminates archive member names with a slash.
        let listing = "\
Archive member name at 714: cudart64_12.dll/\n\
Archive member name at 9E2: cudart64_12.dll/\n\
  Summary\n";
        let names = extract_dll_names(listing);
        assert_eq!(names, vec!["cudart64_12.dll"]);
    }

    #[test]
    fn test_strips_paths_and_dedupes() {
        let listing = "linker member: lib\\x64\\cudart64_12.dll nvcuda.dll cudart64_12.dll";
        let names = extract_dll_names(listing);
        assert_eq!(names, vec!["cudart64_12.dll", "nvcuda.dll"]);
    }

    #[test]
    fn test_ignores_non_dll_tokens() {
        let names = extract_dll_names("Microsoft (R) COFF/PE Dumper Version 14.29");
        assert!(names.is_empty());
    }

    #[test]
    fn test_no_import_libraries_is_a_no_op() {
        let mut options = BuildOptions::default();
        add_runtime_dlls(&mut options).unwrap();
        assert!(options.extra.is_empty());
    }
}
