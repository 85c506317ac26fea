use crate::sync::thread::JoinHandle;
use crate::task::Role;

/// Thread handle yang selalu di-join: lewat `join()` atau saat di-drop.
///
/// Drop memblok sampai task selesai. Tidak ada thread yang di-detach.
pub(crate) struct TaskHandle<R> {
    role: Role,
    handle: Option<JoinHandle<R>>,
}

impl<R> TaskHandle<R> {
    pub(crate) fn new(role: Role, handle: JoinHandle<R>) -> Self {
        Self {
            role,
            handle: Some(handle),
        }
    }

    /// `None` jika task panic.
    pub(crate) fn join(mut self) -> Option<R> {
        let joined = self.handle.take().and_then(|handle| handle.join().ok());
        if joined.is_none() {
            tracing::warn!(role = %self.role, "task panicked");
        }
        joined
    }
}

impl<R> Drop for TaskHandle<R> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!(role = %self.role, "task panicked while being joined on drop");
            }
        }
    }
}
