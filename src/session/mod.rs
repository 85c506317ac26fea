//! Session module: orkestrasi producer + consumer
//!
//! - Alokasi RingStorage, spawn dua thread, pin ke core berbeda
//! - Start barrier dua fase: kedua task lapor siap, baru dilepas bersamaan
//! - Thread handle selalu di-join, termasuk di jalur error

mod config;
mod gate;
mod handle;
mod orchestrator;

pub use config::{SessionConfig, DEFAULT_CAPACITY};
pub use orchestrator::{Session, SessionState};
