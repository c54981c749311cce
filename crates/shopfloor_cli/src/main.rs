//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `shopfloor_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("shopfloor_core ping={}", shopfloor_core::ping());
    println!("shopfloor_core version={}", shopfloor_core::core_version());
}
