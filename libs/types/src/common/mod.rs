//! Common types shared by the codec, config and pump crates

pub mod errors;
pub mod identifiers;
pub mod log_math;
pub mod quad;
