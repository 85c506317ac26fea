use crate::sync::{AtomicUsize, Ordering};
use crate::task::WaitPolicy;

const PENDING: usize = 0;
const OPEN: usize = 1;
const ABORTED: usize = 2;

/// Start barrier dua fase.
///
/// Fase 1: tiap task memanggil `arrive()` setelah pinning selesai.
/// Fase 2: session menunggu semua `parties` tiba, lalu `open()` melepas
/// semuanya sekaligus. `abort()` melepas task tanpa menjalankan transfer,
/// dipakai saat spawn gagal atau session di-drop sebelum start.
#[derive(Debug)]
pub(crate) struct StartGate {
    parties: usize,
    arrived: AtomicUsize,
    state: AtomicUsize,
}

impl StartGate {
    pub(crate) fn new(parties: usize) -> Self {
        Self {
            parties,
            arrived: AtomicUsize::new(0),
            state: AtomicUsize::new(PENDING),
        }
    }

    /// Task: lapor siap, lalu tunggu dilepas. `true` = jalankan transfer.
    pub(crate) fn arrive_and_wait(&self, wait: WaitPolicy) -> bool {
        self.arrived.fetch_add(1, Ordering::Release);
        wait.wait_until(|| self.state.load(Ordering::Acquire) != PENDING);
        self.state.load(Ordering::Acquire) == OPEN
    }

    /// Session: tunggu sampai semua task tiba.
    pub(crate) fn wait_for_arrivals(&self, wait: WaitPolicy) {
        wait.wait_until(|| self.arrived.load(Ordering::Acquire) >= self.parties);
    }

    pub(crate) fn open(&self) {
        self.state.store(OPEN, Ordering::Release);
    }

    pub(crate) fn abort(&self) {
        self.state.store(ABORTED, Ordering::Release);
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_open_releases_all_parties() {
        let gate = Arc::new(StartGate::new(2));
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let gate = gate.clone();
                thread::spawn(move || gate.arrive_and_wait(WaitPolicy::BusySpin))
            })
            .collect();

        gate.wait_for_arrivals(WaitPolicy::BusySpin);
        gate.open();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }

    #[test]
    fn test_abort_releases_without_running() {
        let gate = Arc::new(StartGate::new(1));
        let handle = {
            let gate = gate.clone();
            thread::spawn(move || gate.arrive_and_wait(WaitPolicy::SpinThenYield { spin_limit: 8 }))
        };

        gate.abort();
        assert!(!handle.join().unwrap());
    }
}
