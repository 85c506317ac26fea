//! Deteksi topologi CPU dan pinning thread producer/consumer.
//!
//! Tujuannya memaksa komunikasi lintas core fisik supaya traffic cache
//! coherency benar-benar terjadi. Pinning hanya alat bantu performa dan
//! determinisme; kebenaran transfer tidak bergantung padanya.
//!
//! # Strategi Penempatan
//!
//! Dengan `n` CPU yang boleh dipakai dan `stride = logical / physical`
//! (1 tanpa SMT), producer ditaruh di indeks `(n - 1) / 2` dan consumer di
//! `(producer + stride) mod n`. Heuristik ini mengasumsikan SMT sibling
//! dienumerasi berdampingan, jadi loncat `stride` langkah melewati sibling.
//!
//! Kalau OS menolak affinity, `pin_current_thread` mengembalikan `false` dan
//! penempatan turun menjadi "dipilih scheduler, mungkin core yang sama".

use std::fmt;

#[cfg(not(loom))]
use core_affinity::CoreId;

use crate::error::CreationError;

/// Informasi topologi CPU saat runtime.
#[derive(Debug, Clone)]
pub struct CpuTopology {
    /// Total logical core (termasuk SMT/hyperthread)
    pub logical_cores: usize,
    /// Total physical core
    pub physical_cores: usize,
    /// Apakah SMT aktif
    pub has_smt: bool,
    /// ID core yang boleh dipakai proses ini
    pub available_cores: Vec<usize>,
}

impl CpuTopology {
    /// Deteksi topologi sistem saat ini.
    #[must_use]
    pub fn detect() -> Self {
        let logical_cores = num_cpus::get();
        let physical_cores = num_cpus::get_physical();
        let available_cores = allowed_cores().unwrap_or_else(|| (0..logical_cores).collect());

        Self {
            logical_cores,
            physical_cores,
            has_smt: logical_cores > physical_cores,
            available_cores,
        }
    }

    /// Jumlah logical core per physical core, minimal 1.
    pub fn smt_stride(&self) -> usize {
        if self.has_smt && self.physical_cores > 0 {
            (self.logical_cores / self.physical_cores).max(1)
        } else {
            1
        }
    }

    /// Pilih dua core berbeda untuk producer dan consumer.
    ///
    /// `None` jika kurang dari dua core yang boleh dipakai.
    #[must_use]
    pub fn select_pair(&self) -> Option<Placement> {
        let n = self.available_cores.len();
        if n < 2 {
            return None;
        }

        let stride = self.smt_stride().min(n - 1);
        let producer = (n - 1) / 2;
        let consumer = (producer + stride) % n;

        Some(Placement {
            producer: Some(self.available_cores[producer]),
            consumer: Some(self.available_cores[consumer]),
        })
    }
}

/// Core tujuan untuk masing-masing task (`None` = tidak di-pin).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Placement {
    pub producer: Option<usize>,
    pub consumer: Option<usize>,
}

impl Placement {
    /// Kedua task tidak di-pin
    pub const fn unpinned() -> Self {
        Self {
            producer: None,
            consumer: None,
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.producer.is_some() || self.consumer.is_some()
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = |c: Option<usize>| c.map_or_else(|| "any".to_string(), |c| c.to_string());
        write!(
            f,
            "producer@{} consumer@{}",
            core(self.producer),
            core(self.consumer)
        )
    }
}

/// Cara memilih core untuk producer dan consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PinningStrategy {
    /// Deteksi topologi; turun ke unpinned jika kurang dari dua core.
    #[default]
    Auto,
    /// Seperti `Auto`, tapi gagal jika CPU yang boleh dipakai tidak mencakup
    /// dua physical core berbeda.
    Strict,
    /// Core eksplisit dari user.
    Manual { producer: usize, consumer: usize },
    /// Tidak ada pinning sama sekali.
    Disabled,
}

impl PinningStrategy {
    /// Tentukan penempatan berdasarkan topologi sistem ini.
    pub fn resolve(&self) -> Result<Placement, CreationError> {
        match *self {
            Self::Disabled => Ok(Placement::unpinned()),
            _ => self.resolve_with(&CpuTopology::detect()),
        }
    }

    /// Tentukan penempatan terhadap topologi yang diberikan.
    pub fn resolve_with(&self, topology: &CpuTopology) -> Result<Placement, CreationError> {
        match *self {
            Self::Disabled => Ok(Placement::unpinned()),
            Self::Auto => Ok(topology.select_pair().unwrap_or_else(|| {
                tracing::warn!(
                    available = topology.available_cores.len(),
                    "fewer than two usable cores, producer and consumer run unpinned"
                );
                Placement::unpinned()
            })),
            Self::Strict => {
                // CPU yang boleh dipakai dihitung per physical core, supaya
                // pasangan tidak pernah jatuh ke satu sibling SMT.
                let available = topology
                    .physical_cores
                    .min(topology.available_cores.len() / topology.smt_stride());
                if available < 2 {
                    return Err(CreationError::InsufficientCores {
                        required: 2,
                        available,
                    });
                }
                topology.select_pair().ok_or(CreationError::InsufficientCores {
                    required: 2,
                    available,
                })
            }
            Self::Manual { producer, consumer } => {
                let allowed = |core: usize| topology.available_cores.contains(&core);
                if producer == consumer || !allowed(producer) || !allowed(consumer) {
                    return Err(CreationError::InvalidPlacement { producer, consumer });
                }
                Ok(Placement {
                    producer: Some(producer),
                    consumer: Some(consumer),
                })
            }
        }
    }
}

impl fmt::Display for PinningStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Strict => write!(f, "strict"),
            Self::Manual { producer, consumer } => write!(f, "{},{}", producer, consumer),
            Self::Disabled => write!(f, "off"),
        }
    }
}

/// Pin thread yang sedang berjalan ke `core`.
///
/// Mengembalikan `false` jika OS menolak atau platform tidak mendukung.
#[cfg(not(loom))]
pub fn pin_current_thread(core: usize) -> bool {
    core_affinity::set_for_current(CoreId { id: core })
}

/// No-op di bawah model checker.
#[cfg(loom)]
pub fn pin_current_thread(_core: usize) -> bool {
    false
}

#[cfg(not(loom))]
fn allowed_cores() -> Option<Vec<usize>> {
    core_affinity::get_core_ids()
        .map(|ids| ids.into_iter().map(|id| id.id).collect::<Vec<_>>())
        .filter(|cores| !cores.is_empty())
}

#[cfg(loom)]
fn allowed_cores() -> Option<Vec<usize>> {
    None
}
