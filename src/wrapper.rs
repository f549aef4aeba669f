//! Version-aware wrapping of host properties
//!
//! Several copies of a library can share one host. Each copy registers its
//! wrapper for a property under its own version with [`wrap`]; any copy can
//! later ask which wrapper a range selects with [`find`], and install one as
//! the live implementation with [`manage`]. [`unwrap`] always recovers the
//! function that was there before any dispatcher.
//!
//! # Example
//!
//! ```rust
//! use versioned_wrapper::{Function, Host, Invocation, Wrapper, find, manage, wrap};
//!
//! let host: Host<i64, i64> =
//!     Host::new().with("sum", Function::native(|_, args: &[i64]| args.iter().sum()));
//!
//! wrap(&host, "sum", Wrapper::new(|inv: Invocation<'_, i64, i64>| {
//!     inv.call_raw().unwrap_or_default() * 2
//! }), "1.0.0");
//!
//! if let Some(wrapper) = find(&host, "sum", "^1.0.0") {
//!     manage(&host, "sum", wrapper);
//! }
//!
//! assert_eq!(host.call("sum", &[1, 2]).unwrap(), 6);
//! ```

use tracing::{debug, trace};

use crate::function::{Function, Wrapper};
use crate::host::Host;
use crate::store::{get_map, get_or_create_map};
use crate::version::resolver::VersionResolver;

/// Version this copy of the crate registers under in [`wrap_current`]
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Register `wrapper` for `object[key]` under `version`.
///
/// The first registration for a version wins; later ones are ignored. The
/// property itself is left untouched.
pub fn wrap<A, R>(object: &Host<A, R>, key: &str, wrapper: Wrapper<A, R>, version: &str) {
    let mut map = get_or_create_map(object, key);
    if map.register(version, wrapper) {
        debug!("Registered wrapper for {} at version {}", key, version);
    } else {
        trace!("Wrapper for {} at version {} already registered", key, version);
    }
}

/// Register `wrapper` under this crate's own [`VERSION`]
pub fn wrap_current<A, R>(object: &Host<A, R>, key: &str, wrapper: Wrapper<A, R>) {
    wrap(object, key, wrapper, VERSION);
}

/// Wrapper registered under the highest version satisfying `range`,
/// resolved through the process-wide [`VersionResolver`]
pub fn find<A, R>(object: &Host<A, R>, key: &str, range: &str) -> Option<Wrapper<A, R>> {
    find_with(VersionResolver::global(), object, key, range)
}

/// Same as [`find`], with an explicit resolver
pub fn find_with<A, R>(
    resolver: &VersionResolver,
    object: &Host<A, R>,
    key: &str,
    range: &str,
) -> Option<Wrapper<A, R>> {
    let map = get_map(object, key)?;
    let version = resolver.max_satisfying(&map.versions(), range)?;
    map.wrapper(&version).cloned()
}

/// Install a dispatcher on `object[key]` that forwards every call to
/// `wrapper`, along with the function it replaced.
///
/// Any previous value is replaced unconditionally. The replaced function is
/// taken through [`unwrap`], so re-managing a property forwards to the
/// pre-dispatch original rather than to the previous dispatcher.
pub fn manage<A, R>(object: &Host<A, R>, key: &str, wrapper: Wrapper<A, R>) {
    let raw = unwrap(object, key);
    debug!(
        "Installing dispatcher on {} (raw present: {})",
        key,
        raw.is_some()
    );
    object.set(key, Function::dispatcher(raw, wrapper));
}

/// The function a dispatcher on `object[key]` replaced, or the property as
/// is when no dispatcher is installed
pub fn unwrap<A, R>(object: &Host<A, R>, key: &str) -> Option<Function<A, R>> {
    let func = object.get(key)?;
    match func.as_dispatcher() {
        Some(dispatcher) => dispatcher.raw().cloned(),
        None => Some(func),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::Invocation;
    use crate::version::matcher::RangeSyntax;
    use rstest::rstest;
    use serial_test::serial;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn host() -> Host<i64, i64> {
        Host::new().with("f", Function::native(|_, args: &[i64]| args.iter().sum()))
    }

    fn constant(value: i64) -> Wrapper<i64, i64> {
        Wrapper::new(move |_: Invocation<'_, i64, i64>| value)
    }

    fn resolver() -> VersionResolver {
        VersionResolver::new(RangeSyntax::Npm.matcher())
    }

    #[rstest]
    #[case("^1.0.0", true)]
    #[case("1.x", true)]
    #[case(">=1.0.0", true)]
    #[case("*", true)]
    #[case("^2.0.0", false)]
    #[case("<1.0.0", false)]
    fn find_returns_registered_wrapper_when_version_satisfies(
        #[case] range: &str,
        #[case] expected: bool,
    ) {
        let host = host();
        let w = constant(1);
        wrap(&host, "f", w.clone(), "1.0.0");

        let found = find_with(&resolver(), &host, "f", range);
        assert_eq!(found, expected.then_some(w));
    }

    #[test]
    fn find_without_registration_returns_none() {
        let host = host();
        assert!(find_with(&resolver(), &host, "f", "*").is_none());

        wrap(&host, "f", constant(1), "1.0.0");
        assert!(find_with(&resolver(), &host, "g", "*").is_none());
    }

    #[test]
    fn wrap_is_idempotent_per_version() {
        let host = host();
        let first = constant(1);
        wrap(&host, "f", first.clone(), "1.0.0");
        wrap(&host, "f", first.clone(), "1.0.0");
        wrap(&host, "f", constant(2), "1.0.0");

        assert_eq!(get_map(&host, "f").unwrap().len(), 1);
        assert_eq!(find_with(&resolver(), &host, "f", "1.0.0"), Some(first));
    }

    #[test]
    fn highest_satisfying_version_wins() {
        let host = host();
        let w1 = constant(1);
        let w2 = constant(2);
        wrap(&host, "f", w1.clone(), "1.0.0");
        wrap(&host, "f", w2.clone(), "2.0.0");

        let resolver = resolver();
        assert_eq!(find_with(&resolver, &host, "f", "^1.0.0"), Some(w1));
        assert_eq!(find_with(&resolver, &host, "f", "^2.0.0"), Some(w2.clone()));
        assert_eq!(find_with(&resolver, &host, "f", ">=1.0.0"), Some(w2));
        assert_eq!(find_with(&resolver, &host, "f", ">=3.0.0"), None);
    }

    #[test]
    fn equal_versions_resolve_to_first_registration() {
        let host = host();
        let w_a = constant(1);
        let w_b = constant(2);
        wrap(&host, "f", w_a.clone(), "1.0.0+a");
        wrap(&host, "f", w_b, "1.0.0+b");

        assert_eq!(find_with(&resolver(), &host, "f", "^1.0.0"), Some(w_a));
    }

    #[test]
    fn wrap_does_not_touch_property() {
        let host = host();
        let original = host.get("f").unwrap();
        wrap(&host, "f", constant(1), "1.0.0");

        assert_eq!(host.get("f"), Some(original));
        assert_eq!(host.call("f", &[1, 2]).unwrap(), 3);
    }

    #[test]
    #[serial]
    fn wrap_current_registers_crate_version() {
        let host = host();
        let w = constant(1);
        wrap_current(&host, "f", w.clone());

        assert_eq!(get_map(&host, "f").unwrap().versions(), vec![VERSION]);
        assert_eq!(find(&host, "f", VERSION), Some(w));
    }

    #[test]
    fn manage_forwards_calls_with_context() {
        let host = host();
        let original = host.get("f").unwrap();
        let calls: Rc<RefCell<Vec<(Function<i64, i64>, Option<Function<i64, i64>>, Vec<i64>)>>> =
            Rc::default();

        let recorded = Rc::clone(&calls);
        manage(
            &host,
            "f",
            Wrapper::new(move |inv: Invocation<'_, i64, i64>| {
                recorded.borrow_mut().push((
                    inv.manager.clone(),
                    inv.raw.cloned(),
                    inv.args.to_vec(),
                ));
                42
            }),
        );

        assert_eq!(host.call("f", &[1, 2]).unwrap(), 42);

        let calls = calls.borrow();
        assert_eq!(calls.len(), 1);
        let (manager, raw, args) = &calls[0];
        assert_eq!(Some(manager), host.get("f").as_ref());
        assert_eq!(raw.as_ref(), Some(&original));
        assert_eq!(args, &vec![1, 2]);
    }

    #[test]
    fn manage_passes_host_as_receiver() {
        let host = host().with("g", Function::native(|_, _: &[i64]| 100));
        manage(
            &host,
            "f",
            Wrapper::new(|inv: Invocation<'_, i64, i64>| {
                inv.call_raw().unwrap_or_default() + inv.this.call("g", &[]).unwrap_or_default()
            }),
        );

        assert_eq!(host.call("f", &[1, 2]).unwrap(), 103);
    }

    #[test]
    fn unwrap_returns_function_replaced_by_manage() {
        let host = host();
        let original = host.get("f").unwrap();
        manage(&host, "f", constant(0));

        assert!(host.get("f").unwrap().is_dispatcher());
        assert_eq!(unwrap(&host, "f"), Some(original));
    }

    #[test]
    fn unwrap_without_dispatcher_returns_property() {
        let host = host();
        assert_eq!(unwrap(&host, "f"), host.get("f"));
        assert_eq!(unwrap(&host, "missing"), None);
    }

    #[test]
    fn remanaging_forwards_to_original() {
        let host = host();
        let original = host.get("f").unwrap();
        manage(&host, "f", constant(1));
        manage(
            &host,
            "f",
            Wrapper::new(|inv: Invocation<'_, i64, i64>| inv.call_raw().unwrap_or(-1) * 10),
        );

        assert_eq!(unwrap(&host, "f"), Some(original));
        assert_eq!(host.call("f", &[1, 2]).unwrap(), 30);
    }

    #[test]
    fn manage_on_missing_property_installs_dispatcher_without_raw() {
        let host = host();
        manage(
            &host,
            "missing",
            Wrapper::new(|inv: Invocation<'_, i64, i64>| inv.call_raw().unwrap_or(-1)),
        );

        assert_eq!(host.call("missing", &[]).unwrap(), -1);
        assert_eq!(unwrap(&host, "missing"), None);
    }

    #[test]
    fn map_created_after_manage_keeps_true_original() {
        let host = host();
        let original = host.get("f").unwrap();
        manage(&host, "f", constant(0));
        wrap(&host, "f", constant(1), "1.0.0");

        assert_eq!(get_map(&host, "f").unwrap().raw(), Some(&original));
    }
}
