//! Session lifecycle of a file service.

use crate::FsError;

/// Lifecycle of a file service.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FileSession`.
pub trait FileSession: Send + Sync {
    /// Release backend resources.
    ///
    /// Idempotent: a second call is a no-op and returns `Ok(())`. Every other
    /// operation fails with [`FsError::Closed`] afterwards.
    fn close(&self) -> Result<(), FsError>;

    /// Whether [`close`](Self::close) has been called.
    fn is_closed(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_session_is_object_safe() {
        fn _check(_: &dyn FileSession) {}
    }
}
