//! Version range resolution
//!
//! This module decides which registered version a caller's range selects.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   find()    │────▶│  Resolver   │────▶│   Matcher   │
//! │ (wrapper)   │     │  (memoize)  │     │ (range sat) │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                                                ▼
//!                                         ┌─────────────┐
//!                                         │  Matchers   │
//!                                         │ (npm,cargo) │
//!                                         └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`resolver`]: memoizing resolver, with an injectable cache and a
//!   process-wide default
//! - [`matcher`]: range satisfaction trait and syntax selection
//! - [`matchers`]: concrete dialects (npm, Cargo)
//! - [`semver`]: shared semver utilities

pub mod matcher;
pub mod matchers;
pub mod resolver;
pub mod semver;
