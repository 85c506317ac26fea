use std::fmt;

use crate::sync::{spin_loop, thread};

/// Cara task menunggu saat ring penuh (producer) atau kosong (consumer).
///
/// Policy hanya mengatur *bagaimana* menunggu; protokol fence di
/// `RingStorage` tidak berubah apa pun pilihannya.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitPolicy {
    /// Busy-wait murni. Thread tidak pernah melepas core-nya.
    #[default]
    BusySpin,
    /// Spin sampai `spin_limit` kali, setelah itu `yield_now()` tiap iterasi.
    SpinThenYield { spin_limit: u32 },
}

impl WaitPolicy {
    /// Tunggu sampai `ready()` bernilai `true`.
    #[inline(always)]
    pub fn wait_until(&self, mut ready: impl FnMut() -> bool) {
        match *self {
            Self::BusySpin => {
                while !ready() {
                    spin_loop();
                }
            }
            Self::SpinThenYield { spin_limit } => {
                let mut spins = 0u32;
                while !ready() {
                    if spins < spin_limit {
                        spins += 1;
                        spin_loop();
                    } else {
                        thread::yield_now();
                    }
                }
            }
        }
    }
}

impl fmt::Display for WaitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusySpin => write!(f, "spin"),
            Self::SpinThenYield { spin_limit } => write!(f, "yield:{}", spin_limit),
        }
    }
}
