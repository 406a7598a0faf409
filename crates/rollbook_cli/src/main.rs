//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `rollbook_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("rollbook_core version={}", rollbook_core::core_version());
    println!(
        "rollbook_core schema_version={}",
        rollbook_core::db::migrations::latest_version()
    );
}
