//! Version-aware wrapping of shared host functions.
//!
//! Independently loaded copies of a library register wrappers for the same
//! host property under their own versions, pick the one a range selects, and
//! install it as a dispatcher without losing the original function.

pub mod config;
pub mod error;
pub mod function;
pub mod host;
pub mod store;
pub mod version;
pub mod wrapper;

pub use function::{Dispatcher, Function, Invocation, Wrapper};
pub use host::Host;
pub use version::matcher::RangeSyntax;
pub use version::resolver::VersionResolver;
pub use wrapper::{VERSION, find, find_with, manage, unwrap, wrap, wrap_current};
