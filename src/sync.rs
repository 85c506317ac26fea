//! Primitive sinkronisasi yang bisa ditukar ke `loom` untuk model checking.
//!
//! Build normal memakai `std`. Dengan `RUSTFLAGS="--cfg loom"` semua atomic,
//! fence, thread dan `UnsafeCell` diambil dari `loom` sehingga setiap
//! interleaving protokol fence bisa dieksplorasi.

#[cfg(loom)]
pub(crate) use loom::{
    cell::UnsafeCell,
    hint::spin_loop,
    sync::atomic::{fence, AtomicUsize, Ordering},
    sync::Arc,
    thread,
};

#[cfg(not(loom))]
pub(crate) use std::{
    hint::spin_loop,
    sync::atomic::{fence, AtomicUsize, Ordering},
    sync::Arc,
    thread,
};

/// `UnsafeCell` dengan API `with`/`with_mut` seperti milik `loom`.
#[cfg(not(loom))]
#[derive(Debug)]
pub(crate) struct UnsafeCell<T>(std::cell::UnsafeCell<T>);

#[cfg(not(loom))]
impl<T> UnsafeCell<T> {
    pub(crate) const fn new(data: T) -> Self {
        Self(std::cell::UnsafeCell::new(data))
    }

    #[inline(always)]
    pub(crate) fn with<R>(&self, f: impl FnOnce(*const T) -> R) -> R {
        f(self.0.get())
    }

    #[inline(always)]
    pub(crate) fn with_mut<R>(&self, f: impl FnOnce(*mut T) -> R) -> R {
        f(self.0.get())
    }
}
