//! Core module: storage bersama antara producer dan consumer
//!
//! Prinsip desain:
//! - Lock-Free: Hanya satu atomic counter + fence, tidak ada Mutex/RwLock
//! - No-Allocation: Semua slot pre-allocated saat session dibuat
//! - SPSC: Tiap cursor hanya dimutasi oleh satu task

mod cursor;
mod ring_storage;

pub(crate) use cursor::Cursor;
pub use ring_storage::RingStorage;
