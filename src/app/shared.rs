//! Interrupt-safe home for state touched by several execution contexts.
//!
//! The zero-cross handler and the two gate-timer callbacks all need
//! exclusive access to the same controller.  [`SharedCell`] wraps it in a
//! `critical_section::Mutex` so each entry point runs to completion
//! without interleaving with another.

use core::cell::RefCell;

use critical_section::Mutex;

pub struct SharedCell<T> {
    inner: Mutex<RefCell<Option<T>>>,
}

impl<T> Default for SharedCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SharedCell<T> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Place `value` in the cell, returning whatever was there.
    pub fn install(&self, value: T) -> Option<T> {
        critical_section::with(|cs| self.inner.borrow(cs).replace(Some(value)))
    }

    /// Run `f` with exclusive access.  `None` until something is installed.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        critical_section::with(|cs| {
            let mut slot = self.inner.borrow(cs).borrow_mut();
            slot.as_mut().map(f)
        })
    }
}
