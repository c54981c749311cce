//! Text canonicalization for scan matching.
//!
//! # Responsibility
//! - Provide the shared normal form used by every fuzzy comparison.
//! - Keep matching tolerant of scanner/input-method noise without touching
//!   the raw display strings.
//!
//! # Invariants
//! - Normalization is pure and total; it never fails.
//! - Raw catalog fields are never mutated; normalization happens at the
//!   comparison site only.

pub mod normalize;

pub use normalize::normalize;
