//! Cursor lock as an explicit capability.
//!
//! Only one holder may own the capture at a time. The lock is released when
//! the [`CaptureHandle`] is dropped, so a despawned player can never leave
//! the cursor locked.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::input::InputError;

/// Shared cursor-lock flag. Clones refer to the same lock.
#[derive(Debug, Clone, Default)]
pub struct InputCapture {
    locked: Arc<AtomicBool>,
}

impl InputCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the capture, or fail if someone else holds it.
    pub fn acquire(&self) -> Result<CaptureHandle, InputError> {
        self.locked
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| InputError::CaptureHeld)?;
        log::debug!("input captured");
        Ok(CaptureHandle {
            locked: Arc::clone(&self.locked),
        })
    }

    pub fn is_captured(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }
}

/// Proof of holding the capture.
#[derive(Debug)]
pub struct CaptureHandle {
    locked: Arc<AtomicBool>,
}

impl CaptureHandle {
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for CaptureHandle {
    fn drop(&mut self) {
        self.locked.store(false, Ordering::Release);
        log::debug!("input released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_holder() {
        let capture = InputCapture::new();
        let handle = capture.acquire().unwrap();
        assert!(capture.is_captured());
        assert_eq!(capture.acquire().unwrap_err(), InputError::CaptureHeld);

        handle.release();
        assert!(!capture.is_captured());
        assert!(capture.acquire().is_ok());
    }

    #[test]
    fn test_drop_releases() {
        let capture = InputCapture::new();
        let shared = capture.clone();
        {
            let _handle = shared.acquire().unwrap();
            assert!(capture.is_captured());
        }
        assert!(!capture.is_captured());
    }
}
