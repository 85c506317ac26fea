//! Tandem - Lock-Free SPSC Ring Transfer
//!
//! Arsitektur:
//! - Satu producer thread dan satu consumer thread, masing-masing di-pin ke core berbeda
//! - Ring buffer kapasitas tetap, satu atomic occupancy counter
//! - Sinkronisasi hanya lewat release/acquire fence di sekitar counter, tanpa Mutex
//! - Busy-wait murni (atau spin-then-yield) saat buffer penuh/kosong
//!
//! ```no_run
//! use tandem::Session;
//!
//! let input: Vec<i32> = (1..=1000).collect();
//! let mut session = Session::create(&input, 8).unwrap();
//! let output = session.destroy().unwrap();
//! assert_eq!(output, input);
//! ```

pub mod core;
pub mod error;
pub mod oracle;
pub mod session;
pub(crate) mod sync;
pub mod task;
pub mod topology;

pub use crate::core::RingStorage;
pub use crate::error::{CreationError, Empty, Full, ReuseError, SessionError};
pub use crate::oracle::SequentialRing;
pub use crate::session::{Session, SessionConfig, SessionState};
pub use crate::task::{Role, WaitPolicy};
pub use crate::topology::{CpuTopology, PinningStrategy, Placement};
