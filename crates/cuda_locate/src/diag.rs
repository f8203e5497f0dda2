// diag.rs - Probe diagnostics
//
// Inside a build script, messages that must reach the user have to go
// through the cargo:warning channel; everywhere else plain stderr is
// the right place. Notes always go to stderr so candidate accept/reject
// traces end up in the build output file without spamming warnings.

use std::env;

fn under_cargo() -> bool {
    env::var_os("CARGO").is_some() && env::var_os("OUT_DIR").is_some()
}

/// Trace line, one per probed candidate. Always emitted.
pub fn note(msg: &str) {
    eprintln!("[cuda_locate] {msg}");
}

/// Problem worth surfacing, but the run continues.
pub fn warn(msg: &str) {
    if under_cargo() {
        println!("cargo:warning={msg}");
    } else {
        eprintln!("[cuda_locate] warning: {msg}");
    }
}

/// Only emitted when CUDA_LOCATE_VERBOSE is set.
pub fn debug(msg: &str) {
    if env::var_os("CUDA_LOCATE_VERBOSE").is_some() {
        eprintln!("[cuda_locate] {msg}");
    }
}
