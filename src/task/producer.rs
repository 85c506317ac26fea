use crate::core::{Cursor, RingStorage};
use crate::sync::Arc;
use crate::task::WaitPolicy;

/// Producer: menulis input sequence ke ring secara berurutan.
///
/// Tidak ada error path. Kalau ring penuh selamanya (consumer tidak jalan),
/// task ini spin selamanya.
pub(crate) struct ProducerTask<T> {
    storage: Arc<RingStorage<T>>,
    cursor: Cursor,
    input: Vec<T>,
    wait: WaitPolicy,
}

impl<T: Copy> ProducerTask<T> {
    pub(crate) fn new(
        storage: Arc<RingStorage<T>>,
        input: Vec<T>,
        wait: WaitPolicy,
    ) -> Self {
        let cursor = Cursor::new(storage.capacity());
        Self {
            storage,
            cursor,
            input,
            wait,
        }
    }

    /// Jalankan sampai elemen ke-L dipublish. Mengembalikan jumlah elemen.
    pub(crate) fn run(mut self) -> usize {
        let storage = &*self.storage;

        for &value in self.input.iter() {
            self.wait.wait_until(|| storage.can_write());

            // SAFETY: task ini satu-satunya producer, cursor miliknya sendiri,
            // dan can_write() baru saja terobservasi true.
            unsafe { storage.publish_write(self.cursor.position(), value) };
            self.cursor.advance();
        }

        self.input.len()
    }
}
