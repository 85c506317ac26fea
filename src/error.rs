//! Error handling untuk session, pinning, dan oracle sekuensial.
//!
//! Spin di dalam task bukan error dan tidak pernah dilaporkan. Kalau panjang
//! input producer tidak cocok dengan jumlah yang dibaca consumer, salah satu
//! task akan spin selamanya; itu pelanggaran kontrak caller, bukan fault.

use std::io;

use thiserror::Error;

use crate::session::SessionState;
use crate::task::Role;

/// Kegagalan saat membuat session. Tidak ada thread atau storage yang tersisa
/// setelah error ini dikembalikan.
#[derive(Error, Debug)]
pub enum CreationError {
    /// Kapasitas ring harus minimal 1
    #[error("ring capacity must be at least 1")]
    ZeroCapacity,

    /// Panjang yang diharapkan > 0 tapi input kosong
    #[error("expected {expected} elements but the input sequence is empty")]
    EmptyInput { expected: usize },

    /// Panjang yang diharapkan tidak sama dengan panjang input
    #[error("expected {expected} elements but the input sequence has {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Tidak cukup execution unit untuk strategi pinning yang diminta
    #[error("pinning needs {required} cores but only {available} are usable")]
    InsufficientCores { required: usize, available: usize },

    /// Penempatan manual tidak valid (core sama, atau tidak boleh dipakai)
    #[error("invalid placement: producer core {producer}, consumer core {consumer}")]
    InvalidPlacement { producer: usize, consumer: usize },

    /// OS menolak membuat thread
    #[error("failed to spawn {role} thread: {source}")]
    Spawn {
        role: Role,
        #[source]
        source: io::Error,
    },
}

/// `destroy()` atau `start()` dipanggil pada state yang salah.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReuseError {
    #[error("session has already been destroyed")]
    AlreadyDestroyed,

    #[error("operation not valid while the session is {0}")]
    NotRunning(SessionState),
}

/// Error dari operasi pada session yang sudah berjalan.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Reuse(#[from] ReuseError),

    #[error("{role} task panicked before completing")]
    TaskPanicked { role: Role },
}

/// Write ke oracle sekuensial yang sudah penuh.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("ring is full")]
pub struct Full;

/// Read dari oracle sekuensial yang kosong.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("ring is empty")]
pub struct Empty;
