//! Ring buffer sekuensial (single-thread) sebagai oracle kebenaran.
//!
//! Tanpa atomic, tanpa fence, hanya bounds check sederhana. Dipakai untuk
//! differential test terhadap `Session`.

use crate::core::Cursor;
use crate::error::{CreationError, Empty, Full};

/// Ring buffer single-thread dengan kapasitas tetap
#[derive(Debug, Clone)]
pub struct SequentialRing<T> {
    slots: Box<[Option<T>]>,
    writer: Cursor,
    reader: Cursor,
    occupancy: usize,
}

impl<T: Copy> SequentialRing<T> {
    /// Membuat ring dengan `capacity` slot
    pub fn new(capacity: usize) -> Result<Self, CreationError> {
        if capacity == 0 {
            return Err(CreationError::ZeroCapacity);
        }

        Ok(Self {
            slots: vec![None; capacity].into_boxed_slice(),
            writer: Cursor::new(capacity),
            reader: Cursor::new(capacity),
            occupancy: 0,
        })
    }

    /// Tulis satu elemen. `Err(Full)` jika ring penuh, isi tidak berubah.
    pub fn write(&mut self, value: T) -> Result<(), Full> {
        if self.is_full() {
            return Err(Full);
        }

        self.slots[self.writer.position()] = Some(value);
        self.writer.advance();
        self.occupancy += 1;
        Ok(())
    }

    /// Baca elemen tertua. `Err(Empty)` jika ring kosong.
    pub fn read(&mut self) -> Result<T, Empty> {
        if self.is_empty() {
            return Err(Empty);
        }

        let value = self.slots[self.reader.position()].take().ok_or(Empty)?;
        self.reader.advance();
        self.occupancy -= 1;
        Ok(value)
    }

    /// Jumlah elemen di ring
    pub fn occupancy(&self) -> usize {
        self.occupancy
    }

    /// Kapasitas ring
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occupancy == 0
    }

    pub fn is_full(&self) -> bool {
        self.occupancy == self.slots.len()
    }
}

/// Lewatkan `input` melalui ring sekuensial berkapasitas `capacity`.
///
/// Saat ring penuh, satu elemen dibaca dulu sebelum menulis; sisanya
/// dikuras di akhir. Hasilnya adalah output yang harus sama dengan milik
/// `Session` untuk input yang sama.
pub fn replay<T: Copy>(input: &[T], capacity: usize) -> Result<Vec<T>, CreationError> {
    let mut ring = SequentialRing::new(capacity)?;
    let mut output = Vec::with_capacity(input.len());

    for &value in input {
        if ring.is_full() {
            output.extend(ring.read().ok());
        }
        // Baru saja ada slot yang dikosongkan, jadi write tidak bisa gagal
        let written = ring.write(value);
        debug_assert!(written.is_ok());
    }

    while let Ok(value) = ring.read() {
        output.push(value);
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_scenario() {
        const SIZE: usize = 5;
        let mut ring = SequentialRing::new(SIZE).unwrap();

        assert_eq!(ring.capacity(), SIZE);
        assert_eq!(ring.occupancy(), 0);

        // Read gagal, belum ada elemen
        assert_eq!(ring.read(), Err(Empty));

        for v in 5..8 {
            assert_eq!(ring.write(v), Ok(()));
        }
        assert_eq!(ring.occupancy(), 3);

        for expected in 5..7 {
            assert_eq!(ring.read(), Ok(expected));
        }
        assert_eq!(ring.occupancy(), 1);

        for v in 8..12 {
            assert_eq!(ring.write(v), Ok(()));
        }
        assert_eq!(ring.occupancy(), SIZE);

        // Write gagal, ring penuh
        assert_eq!(ring.write(11), Err(Full));
        assert_eq!(ring.occupancy(), SIZE);

        for expected in 7..12 {
            assert_eq!(ring.read(), Ok(expected));
        }
        assert!(ring.is_empty());
    }

    #[test]
    fn test_full_ring() {
        let mut ring = SequentialRing::new(4).unwrap();
        for v in 1..=4u64 {
            ring.write(v).unwrap();
        }

        assert!(ring.is_full());
        assert_eq!(ring.write(5), Err(Full)); // Harus gagal - penuh

        assert_eq!(ring.read(), Ok(1));
        assert_eq!(ring.write(5), Ok(())); // Sekarang berhasil
    }

    #[test]
    fn test_wraparound() {
        let mut ring = SequentialRing::new(4).unwrap();

        // Isi dan kosongkan berkali-kali untuk test wraparound
        for round in 0..10u64 {
            for i in 0..4 {
                ring.write(round * 4 + i).unwrap();
            }
            for i in 0..4 {
                assert_eq!(ring.read(), Ok(round * 4 + i));
            }
        }
    }

    #[test]
    fn test_zero_capacity() {
        assert!(matches!(
            SequentialRing::<i32>::new(0),
            Err(CreationError::ZeroCapacity)
        ));
        assert!(matches!(replay::<i32>(&[1], 0), Err(CreationError::ZeroCapacity)));
    }

    #[test]
    fn test_replay_preserves_order() {
        let input: Vec<i32> = (0..37).collect();
        for capacity in 1..=6 {
            assert_eq!(replay(&input, capacity).unwrap(), input);
        }
        assert!(replay::<i32>(&[], 3).unwrap().is_empty());
    }
}
