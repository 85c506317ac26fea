//! Session: pemilik RingStorage dan kedua thread task.
//!
//! State machine: `Created -> Running -> Joined -> Destroyed`.
//!
//! # Kontrak caller
//! Jumlah elemen yang dibaca consumer harus sama dengan panjang input
//! producer. Kalau tidak, salah satu task spin selamanya dan `destroy()`
//! (atau drop) ikut menggantung. Ini tidak dipulihkan.

use std::fmt;

use tracing::{debug, trace, warn};

use crate::core::RingStorage;
use crate::error::{CreationError, ReuseError, SessionError};
use crate::session::config::SessionConfig;
use crate::session::gate::StartGate;
use crate::session::handle::TaskHandle;
use crate::sync::{thread, Arc};
use crate::task::{ConsumerTask, ProducerTask, Role, WaitPolicy};
use crate::topology::{pin_current_thread, Placement};

/// Tahap hidup sebuah session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Thread sudah di-spawn dan menunggu di start gate
    Created,
    /// Transfer sedang berjalan
    Running,
    /// Kedua thread sudah di-join, storage belum dilepas
    Joined,
    /// Storage sudah dilepas, output sudah diserahkan
    Destroyed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Running => write!(f, "running"),
            Self::Joined => write!(f, "joined"),
            Self::Destroyed => write!(f, "destroyed"),
        }
    }
}

/// Satu transfer SPSC: input sequence masuk lewat producer thread, keluar
/// lewat consumer thread, hanya melalui satu `RingStorage`.
pub struct Session<T: Copy + Send + 'static> {
    state: SessionState,
    storage: Option<Arc<RingStorage<T>>>,
    capacity: usize,
    len: usize,
    wait: WaitPolicy,
    placement: Placement,
    gate: Arc<StartGate>,
    producer: Option<TaskHandle<usize>>,
    consumer: Option<TaskHandle<Vec<T>>>,
}

impl<T: Copy + Send + 'static> Session<T> {
    /// Buat dan langsung jalankan session dengan kapasitas `capacity`.
    pub fn create(
        input: &[T],
        capacity: usize,
    ) -> Result<Self, CreationError> {
        Self::with_config(input, SessionConfig::new(capacity))
    }

    /// Buat dan langsung jalankan session dengan konfigurasi lengkap.
    pub fn with_config(
        input: &[T],
        config: SessionConfig,
    ) -> Result<Self, CreationError> {
        let mut session = Self::spawn(input, config)?;
        session.release();
        Ok(session)
    }

    /// Spawn kedua thread tapi tahan mereka di start gate (state `Created`).
    ///
    /// Validasi terjadi sebelum alokasi apa pun. Kalau spawn consumer gagal,
    /// producer yang sudah jalan dilepas tanpa menyentuh storage lalu di-join.
    pub fn spawn(
        input: &[T],
        config: SessionConfig,
    ) -> Result<Self, CreationError> {
        let len = config.validate(input.len())?;
        let placement = config.pinning.resolve()?;

        let storage = Arc::new(RingStorage::with_capacity(config.capacity));
        let (gate, producer, consumer) =
            start_tasks(&storage, input.to_vec(), len, placement, &config)?;

        debug!(
            capacity = config.capacity,
            len,
            wait = %config.wait,
            placement = %placement,
            "session spawned"
        );

        Ok(Self {
            state: SessionState::Created,
            storage: Some(storage),
            capacity: config.capacity,
            len,
            wait: config.wait,
            placement,
            gate,
            producer: Some(producer),
            consumer: Some(consumer),
        })
    }

    /// Lepas kedua task yang sedang menunggu di start gate.
    pub fn start(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Created => {
                self.release();
                Ok(())
            }
            SessionState::Destroyed => Err(ReuseError::AlreadyDestroyed.into()),
            other => Err(ReuseError::NotRunning(other).into()),
        }
    }

    fn release(&mut self) {
        self.gate.wait_for_arrivals(self.wait);
        self.gate.open();
        self.state = SessionState::Running;
        trace!("session running");
    }

    /// Blok sampai kedua task selesai, lepas storage, dan serahkan output
    /// consumer (panjangnya sama dengan input).
    ///
    /// Tidak ada timeout. Hanya valid pada state `Running`.
    pub fn destroy(&mut self) -> Result<Vec<T>, SessionError> {
        match self.state {
            SessionState::Running => {}
            SessionState::Destroyed => return Err(ReuseError::AlreadyDestroyed.into()),
            other => return Err(ReuseError::NotRunning(other).into()),
        }

        let written = self.producer.take().and_then(TaskHandle::join);
        let output = self.consumer.take().and_then(TaskHandle::join);
        self.state = SessionState::Joined;

        // Kedua task sudah selesai, jadi ini referensi terakhir ke storage
        self.storage = None;
        self.state = SessionState::Destroyed;

        let written = written.ok_or(SessionError::TaskPanicked {
            role: Role::Producer,
        })?;
        let output = output.ok_or(SessionError::TaskPanicked {
            role: Role::Consumer,
        })?;

        debug!(written, read = output.len(), "session destroyed");
        Ok(output)
    }

    /// Jumlah elemen di ring saat ini. `None` setelah session dihancurkan.
    pub fn occupancy(&self) -> Option<usize> {
        self.storage.as_ref().map(|storage| storage.occupancy())
    }

    /// Kapasitas ring
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Jumlah elemen yang ditransfer
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }
}

impl<T: Copy + Send + 'static> Drop for Session<T> {
    fn drop(&mut self) {
        match self.state {
            SessionState::Created => {
                debug!("dropping session before start, aborting tasks");
                self.gate.abort();
            }
            SessionState::Running => {
                debug!("dropping running session, waiting for transfer to finish");
            }
            SessionState::Joined | SessionState::Destroyed => {}
        }
        // TaskHandle yang tersisa di-join oleh Drop masing-masing
    }
}

impl<T: Copy + Send + 'static> fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("capacity", &self.capacity)
            .field("len", &self.len)
            .field("occupancy", &self.occupancy())
            .field("placement", &self.placement)
            .finish()
    }
}

type Tasks<T> = (Arc<StartGate>, TaskHandle<usize>, TaskHandle<Vec<T>>);

/// Spawn producer lalu consumer di belakang satu start gate.
///
/// Kalau consumer gagal di-spawn, gate di-abort dan producer di-join sebelum
/// error dikembalikan, jadi storage tidak pernah disentuh.
fn start_tasks<T: Copy + Send + 'static>(
    storage: &Arc<RingStorage<T>>,
    input: Vec<T>,
    len: usize,
    placement: Placement,
    config: &SessionConfig,
) -> Result<Tasks<T>, CreationError> {
    let gate = Arc::new(StartGate::new(2));

    let producer = {
        let task = ProducerTask::new(storage.clone(), input, config.wait);
        launch(Role::Producer, placement.producer, &gate, config, move || {
            task.run()
        })?
    };

    let consumer = {
        let task = ConsumerTask::new(storage.clone(), len, config.wait);
        match launch(Role::Consumer, placement.consumer, &gate, config, move || {
            task.run()
        }) {
            Ok(handle) => handle,
            Err(err) => {
                gate.abort();
                drop(producer);
                return Err(err);
            }
        }
    };

    Ok((gate, producer, consumer))
}

/// Spawn satu thread task: pin, lapor ke gate, lalu jalankan `task`.
fn launch<R, F>(
    role: Role,
    core: Option<usize>,
    gate: &Arc<StartGate>,
    config: &SessionConfig,
    task: F,
) -> Result<TaskHandle<R>, CreationError>
where
    F: FnOnce() -> R + Send + 'static,
    R: Default + Send + 'static,
{
    #[cfg(test)]
    {
        if config.inject_spawn_failure == Some(role) {
            return Err(CreationError::Spawn {
                role,
                source: std::io::Error::new(std::io::ErrorKind::Other, "injected spawn failure"),
            });
        }
    }

    let gate = gate.clone();
    let wait = config.wait;

    thread::Builder::new()
        .name(role.thread_name().to_string())
        .spawn(move || {
            if let Some(core) = core {
                if pin_current_thread(core) {
                    trace!(%role, core, "thread pinned");
                } else {
                    warn!(%role, core, "could not pin thread, running unpinned");
                }
            }

            if !gate.arrive_and_wait(wait) {
                trace!(%role, "start aborted");
                return R::default();
            }

            trace!(%role, "task started");
            let result = task();
            trace!(%role, "task finished");
            result
        })
        .map(|handle| TaskHandle::new(role, handle))
        .map_err(|source| CreationError::Spawn { role, source })
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;
    use crate::topology::PinningStrategy;
    use std::time::Duration;

    fn config(capacity: usize) -> SessionConfig {
        SessionConfig::new(capacity)
            .with_pinning(PinningStrategy::Disabled)
            .with_wait_policy(WaitPolicy::SpinThenYield { spin_limit: 64 })
    }

    #[test]
    fn test_create_destroy_roundtrip() {
        let input: Vec<i32> = (0..1000).collect();
        let mut session = Session::with_config(&input, config(4)).unwrap();

        assert_eq!(session.state(), SessionState::Running);
        assert_eq!(session.capacity(), 4);
        assert_eq!(session.len(), 1000);

        assert_eq!(session.destroy().unwrap(), input);
        assert_eq!(session.state(), SessionState::Destroyed);
    }

    #[test]
    fn test_parked_session_does_not_touch_storage() {
        let mut session = Session::spawn(&[1u8, 2, 3], config(2)).unwrap();
        assert_eq!(session.state(), SessionState::Created);

        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(session.occupancy(), Some(0));

        assert_eq!(
            session.destroy(),
            Err(SessionError::Reuse(ReuseError::NotRunning(
                SessionState::Created
            )))
        );

        session.start().unwrap();
        assert_eq!(session.destroy().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_double_destroy_is_reuse_error() {
        let mut session = Session::with_config(&[9u64; 10], config(3)).unwrap();
        session.destroy().unwrap();

        assert_eq!(
            session.destroy(),
            Err(SessionError::Reuse(ReuseError::AlreadyDestroyed))
        );
        assert_eq!(session.occupancy(), None);
        assert_eq!(session.capacity(), 3);
    }

    #[test]
    fn test_start_twice_is_reuse_error() {
        let mut session = Session::with_config(&[1i32], config(1)).unwrap();
        assert_eq!(
            session.start(),
            Err(SessionError::Reuse(ReuseError::NotRunning(
                SessionState::Running
            )))
        );
        session.destroy().unwrap();
        assert_eq!(
            session.start(),
            Err(SessionError::Reuse(ReuseError::AlreadyDestroyed))
        );
    }

    #[test]
    fn test_drop_before_start_aborts_tasks() {
        let session = Session::spawn(&[5i32; 100], config(1)).unwrap();
        drop(session); // Tidak boleh hang
    }

    #[test]
    fn test_drop_running_session_joins() {
        let session = Session::with_config(&(0..10_000).collect::<Vec<u32>>(), config(2)).unwrap();
        drop(session);
    }

    #[test]
    fn test_consumer_spawn_failure_unwinds_producer() {
        let mut config = config(4);
        config.inject_spawn_failure = Some(Role::Consumer);

        let err = Session::with_config(&[1i32, 2, 3], config.clone()).unwrap_err();
        assert!(matches!(
            err,
            CreationError::Spawn {
                role: Role::Consumer,
                ..
            }
        ));

        let storage = Arc::new(RingStorage::with_capacity(4));
        let result = start_tasks(&storage, vec![1i32, 2, 3], 3, Placement::unpinned(), &config);
        assert!(result.is_err());

        // Producer sudah di-join dan tidak pernah menulis ke ring
        assert_eq!(Arc::strong_count(&storage), 1);
        assert_eq!(storage.occupancy(), 0);
    }

    #[test]
    fn test_validation_runs_before_spawn() {
        let mut zero = config(0);
        zero.inject_spawn_failure = Some(Role::Producer);
        assert!(matches!(
            Session::with_config(&[1i32, 2], zero),
            Err(CreationError::ZeroCapacity)
        ));

        let mismatch = config(2)
            .with_expected_len(5)
            .with_pinning(PinningStrategy::Manual {
                producer: 0,
                consumer: 0,
            });
        assert!(matches!(
            Session::with_config(&[1i32, 2], mismatch),
            Err(CreationError::LengthMismatch {
                expected: 5,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_producer_spawn_failure() {
        let mut config = config(4);
        config.inject_spawn_failure = Some(Role::Producer);

        let err = Session::with_config(&[1i32], config).unwrap_err();
        assert!(matches!(
            err,
            CreationError::Spawn {
                role: Role::Producer,
                ..
            }
        ));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            Session::<i32>::create(&[1, 2], 0),
            Err(CreationError::ZeroCapacity)
        ));
    }

    #[test]
    fn test_empty_transfer() {
        let mut session = Session::<i64>::with_config(&[], config(5)).unwrap();
        assert!(session.is_empty());
        assert!(session.destroy().unwrap().is_empty());
    }
}
