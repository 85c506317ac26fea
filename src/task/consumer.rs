use crate::core::{Cursor, RingStorage};
use crate::sync::Arc;
use crate::task::WaitPolicy;

/// Consumer: membaca tepat `expected` elemen dari ring ke output sequence.
///
/// `expected` harus sama dengan panjang input producer. Task ini tidak
/// memeriksanya; kalau lebih besar, consumer spin selamanya.
pub(crate) struct ConsumerTask<T> {
    storage: Arc<RingStorage<T>>,
    cursor: Cursor,
    expected: usize,
    output: Vec<T>,
    wait: WaitPolicy,
}

impl<T: Copy> ConsumerTask<T> {
    pub(crate) fn new(storage: Arc<RingStorage<T>>, expected: usize, wait: WaitPolicy) -> Self {
        let cursor = Cursor::new(storage.capacity());
        Self {
            storage,
            cursor,
            expected,
            // Pre-allocate supaya tidak ada realokasi di hot loop
            output: Vec::with_capacity(expected),
            wait,
        }
    }

    /// Jalankan sampai `expected` elemen terbaca, lalu serahkan output.
    pub(crate) fn run(mut self) -> Vec<T> {
        let storage = &*self.storage;

        for _ in 0..self.expected {
            self.wait.wait_until(|| storage.can_read());

            // SAFETY: task ini satu-satunya consumer, cursor miliknya sendiri,
            // dan can_read() baru saja terobservasi true.
            let value = unsafe { storage.publish_read(self.cursor.position()) };
            self.cursor.advance();
            self.output.push(value);
        }

        self.output
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;
    use crate::task::ProducerTask;

    const YIELDING: WaitPolicy = WaitPolicy::SpinThenYield { spin_limit: 64 };

    #[test]
    fn test_drains_what_producer_left() {
        let storage = Arc::new(RingStorage::<i32>::with_capacity(8));
        let input = vec![5, 6, 7, 8, 9];

        ProducerTask::new(storage.clone(), input, WaitPolicy::BusySpin).run();
        let output = ConsumerTask::new(storage.clone(), 5, WaitPolicy::BusySpin).run();

        assert_eq!(output, vec![5, 6, 7, 8, 9]);
        assert_eq!(storage.occupancy(), 0);
    }

    #[test]
    fn test_zero_expected_returns_empty() {
        let storage = Arc::new(RingStorage::<i32>::with_capacity(2));
        let output = ConsumerTask::new(storage, 0, WaitPolicy::BusySpin).run();
        assert!(output.is_empty());
    }

    #[test]
    fn test_concurrent_capacity_one() {
        let storage = Arc::new(RingStorage::<u32>::with_capacity(1));
        let input: Vec<u32> = (0..10_000).collect();

        let producer = {
            let storage = storage.clone();
            let input = input.clone();
            std::thread::spawn(move || ProducerTask::new(storage, input, YIELDING).run())
        };
        let output = ConsumerTask::new(storage.clone(), input.len(), YIELDING).run();

        assert_eq!(producer.join().unwrap(), input.len());
        assert_eq!(output, input);
    }
}
