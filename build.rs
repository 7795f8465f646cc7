//! Build script for uart-measure
//!
//! Puts `memory.x` on the linker search path for RP2350 firmware builds.

use std::path::PathBuf;
use std::{env, fs};

fn main() {
    println!("cargo:rerun-if-changed=memory.x");

    // Host builds (library tests) do not link against memory.x
    if env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default() != "arm" {
        return;
    }

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    if let Err(e) = fs::copy("memory.x", out_dir.join("memory.x")) {
        println!("cargo:warning=Failed to copy memory.x: {}", e);
        return;
    }
    println!("cargo:rustc-link-search={}", out_dir.display());
}
