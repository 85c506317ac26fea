//! Task module: dua peran tetap yang berbagi satu RingStorage
//!
//! - Producer: memegang write cursor + input sequence (read-only)
//! - Consumer: memegang read cursor + output sequence
//! - Menunggu selalu lewat `WaitPolicy`, bukan blocking primitive

mod consumer;
mod producer;
mod wait;

pub(crate) use consumer::ConsumerTask;
pub(crate) use producer::ProducerTask;
pub use wait::WaitPolicy;

use std::fmt;

/// Peran sebuah task di dalam session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Producer,
    Consumer,
}

impl Role {
    /// Nama thread OS untuk peran ini
    pub fn thread_name(self) -> &'static str {
        match self {
            Self::Producer => "tandem-producer",
            Self::Consumer => "tandem-consumer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Producer => write!(f, "producer"),
            Self::Consumer => write!(f, "consumer"),
        }
    }
}
