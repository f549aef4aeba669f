//! Callable values stored on a [`Host`]
//!
//! A property holds a [`Function`], which is either a native closure or a
//! dispatcher installed by [`crate::manage`]. Dispatchers carry the function
//! they replaced, so [`crate::unwrap`] can recover it with a variant check.
//!
//! Equality on [`Function`] and [`Wrapper`] is identity: two handles are equal
//! when they share the same allocation.

use std::fmt;
use std::rc::Rc;

use crate::host::Host;

type NativeFn<A, R> = dyn Fn(&Host<A, R>, &[A]) -> R;
type BehaviorFn<A, R> = dyn Fn(Invocation<'_, A, R>) -> R;

/// Shared handle to a callable property value
pub struct Function<A, R>(Rc<Callable<A, R>>);

enum Callable<A, R> {
    Native(Box<NativeFn<A, R>>),
    Dispatcher(Dispatcher<A, R>),
}

/// The tagged record behind an installed dispatcher
pub struct Dispatcher<A, R> {
    raw: Option<Function<A, R>>,
    wrapper: Wrapper<A, R>,
}

impl<A, R> Dispatcher<A, R> {
    /// The function this dispatcher replaced, if the property existed
    pub fn raw(&self) -> Option<&Function<A, R>> {
        self.raw.as_ref()
    }

    /// The wrapper every call is forwarded to
    pub fn wrapper(&self) -> &Wrapper<A, R> {
        &self.wrapper
    }
}

impl<A, R> Function<A, R> {
    pub fn native<F>(f: F) -> Self
    where
        F: Fn(&Host<A, R>, &[A]) -> R + 'static,
    {
        Self(Rc::new(Callable::Native(Box::new(f))))
    }

    pub(crate) fn dispatcher(raw: Option<Function<A, R>>, wrapper: Wrapper<A, R>) -> Self {
        Self(Rc::new(Callable::Dispatcher(Dispatcher { raw, wrapper })))
    }

    /// Invoke with `this` as the receiver
    pub fn call(&self, this: &Host<A, R>, args: &[A]) -> R {
        match &*self.0 {
            Callable::Native(f) => f(this, args),
            Callable::Dispatcher(dispatcher) => dispatcher.wrapper.invoke(Invocation {
                this,
                manager: self,
                raw: dispatcher.raw.as_ref(),
                args,
            }),
        }
    }

    /// Returns the dispatcher record when this function was installed by `manage`
    pub fn as_dispatcher(&self) -> Option<&Dispatcher<A, R>> {
        match &*self.0 {
            Callable::Dispatcher(dispatcher) => Some(dispatcher),
            Callable::Native(_) => None,
        }
    }

    pub fn is_dispatcher(&self) -> bool {
        self.as_dispatcher().is_some()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<A, R> Clone for Function<A, R> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<A, R> PartialEq for Function<A, R> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<A, R> Eq for Function<A, R> {}

impl<A, R> fmt::Debug for Function<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            Callable::Native(_) => write!(f, "Function::Native({:p})", Rc::as_ptr(&self.0)),
            Callable::Dispatcher(dispatcher) => f
                .debug_struct("Function::Dispatcher")
                .field("raw", &dispatcher.raw)
                .field("wrapper", &dispatcher.wrapper)
                .finish(),
        }
    }
}

/// A versioned behavior that a dispatcher forwards calls to
pub struct Wrapper<A, R>(Rc<BehaviorFn<A, R>>);

impl<A, R> Wrapper<A, R> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Invocation<'_, A, R>) -> R + 'static,
    {
        Self(Rc::new(f))
    }

    pub fn invoke(&self, invocation: Invocation<'_, A, R>) -> R {
        (self.0)(invocation)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<A, R> Clone for Wrapper<A, R> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<A, R> PartialEq for Wrapper<A, R> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<A, R> Eq for Wrapper<A, R> {}

impl<A, R> fmt::Debug for Wrapper<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Wrapper({:p})", Rc::as_ptr(&self.0))
    }
}

/// Everything a wrapper sees for one call through a dispatcher
pub struct Invocation<'a, A, R> {
    /// Receiver the dispatcher was invoked on
    pub this: &'a Host<A, R>,
    /// The dispatcher itself
    pub manager: &'a Function<A, R>,
    /// Function the dispatcher replaced; `None` if the property was empty
    pub raw: Option<&'a Function<A, R>>,
    pub args: &'a [A],
}

impl<A, R> Invocation<'_, A, R> {
    /// Forward the call, unchanged, to the replaced function
    pub fn call_raw(&self) -> Option<R> {
        self.call_raw_with(self.args)
    }

    /// Call the replaced function with different arguments
    pub fn call_raw_with(&self, args: &[A]) -> Option<R> {
        self.raw.map(|raw| raw.call(self.this, args))
    }
}
