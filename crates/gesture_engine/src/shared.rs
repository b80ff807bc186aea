//! Shared frame handle
//!
//! Device callbacks run on SDK threads while processors run on the dispatch
//! task, so every frame lives behind a mutex. Critical sections are short:
//! one sample in, or one snapshot out.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Cloneable handle to a frame
#[derive(Debug, Default)]
pub struct FrameHandle<F>(Arc<Mutex<F>>);

impl<F> Clone for FrameHandle<F> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<F> FrameHandle<F> {
    pub fn new(frame: F) -> Self {
        Self(Arc::new(Mutex::new(frame)))
    }

    /// Lock the frame, recovering from poisoning
    pub fn lock(&self) -> MutexGuard<'_, F> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a closure against the locked frame
    pub fn with<R>(&self, f: impl FnOnce(&mut F) -> R) -> R {
        f(&mut self.lock())
    }

    /// Whether two handles point at the same frame
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let a = FrameHandle::new(1_u32);
        let b = a.clone();
        b.with(|v| *v += 1);
        assert_eq!(*a.lock(), 2);
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&FrameHandle::new(2)));
    }

    #[test]
    fn test_survives_poisoning() {
        let handle = FrameHandle::new(0_u32);
        let poisoner = handle.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock();
            panic!("poison");
        })
        .join();
        handle.with(|v| *v = 5);
        assert_eq!(*handle.lock(), 5);
    }
}
