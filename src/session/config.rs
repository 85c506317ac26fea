use crate::error::CreationError;
use crate::task::WaitPolicy;
use crate::topology::PinningStrategy;

/// Kapasitas ring default
pub const DEFAULT_CAPACITY: usize = 16;

/// Konfigurasi session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Jumlah slot di ring, minimal 1
    pub capacity: usize,
    /// Jumlah elemen yang harus dibaca consumer. `None` = panjang input.
    pub expected_len: Option<usize>,
    /// Cara task menunggu saat ring penuh/kosong
    pub wait: WaitPolicy,
    /// Cara memilih core untuk kedua task
    pub pinning: PinningStrategy,
    #[cfg(test)]
    pub(crate) inject_spawn_failure: Option<crate::task::Role>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            expected_len: None,
            wait: WaitPolicy::default(),
            pinning: PinningStrategy::default(),
            #[cfg(test)]
            inject_spawn_failure: None,
        }
    }
}

impl SessionConfig {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    pub fn with_expected_len(mut self, len: usize) -> Self {
        self.expected_len = Some(len);
        self
    }

    pub fn with_wait_policy(mut self, wait: WaitPolicy) -> Self {
        self.wait = wait;
        self
    }

    pub fn with_pinning(mut self, pinning: PinningStrategy) -> Self {
        self.pinning = pinning;
        self
    }

    /// Validasi sebelum alokasi apa pun. Mengembalikan jumlah elemen yang
    /// akan dibaca consumer.
    pub fn validate(&self, input_len: usize) -> Result<usize, CreationError> {
        if self.capacity == 0 {
            return Err(CreationError::ZeroCapacity);
        }

        match self.expected_len {
            None => Ok(input_len),
            Some(expected) if expected == input_len => Ok(expected),
            Some(expected) if input_len == 0 => Err(CreationError::EmptyInput { expected }),
            Some(expected) => Err(CreationError::LengthMismatch {
                expected,
                actual: input_len,
            }),
        }
    }
}
