//! Dialect-specific range matchers

pub mod cargo;
pub mod npm;

pub use cargo::CargoRangeMatcher;
pub use npm::NpmRangeMatcher;
