// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fmt;
use std::rc::Rc;

/// A shared, cloneable callback taking its argument by reference.
pub struct Callback<A: ?Sized>(Rc<dyn Fn(&A)>);

impl<A: ?Sized> Callback<A> {
    /// Wrap a closure.
    pub fn new(f: impl Fn(&A) + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invoke the callback.
    pub fn call(&self, arg: &A) {
        (self.0)(arg);
    }

    /// Returns `true` if both handles point at the same closure.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<A: ?Sized> Clone for Callback<A> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<A: ?Sized> fmt::Debug for Callback<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}
