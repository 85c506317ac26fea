//! Storage bersama untuk SPSC transfer: array slot kapasitas tetap plus satu
//! atomic occupancy counter.
//!
//! Counter ini sekaligus (a) jumlah slot yang berisi data belum dibaca dan
//! (b) satu-satunya titik sinkronisasi antar thread. Ini hanya benar untuk
//! tepat satu producer dan satu consumer; multi-producer butuh sequence
//! number per slot.
//!
//! Urutan fence yang wajib dijaga:
//! - Producer: store slot -> release fence -> increment counter
//! - Consumer: observasi counter > 0 -> acquire fence -> load slot -> decrement (Release)

use std::mem::MaybeUninit;

use crate::sync::{fence, AtomicUsize, Ordering, UnsafeCell};

/// Slot dalam ring - menyimpan satu elemen
#[repr(C, align(64))] // Cache line alignment untuk menghindari false sharing
struct Slot<T> {
    data: UnsafeCell<MaybeUninit<T>>,
}

impl<T> Slot<T> {
    fn new() -> Self {
        Self {
            data: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }
}

/// Padding untuk cache line isolation (64 bytes pada x86-64)
#[repr(C, align(64))]
struct CacheLinePadded<T> {
    value: T,
}

impl<T> CacheLinePadded<T> {
    fn new(value: T) -> Self {
        Self { value }
    }
}

/// Ring storage dengan satu occupancy counter.
///
/// Invariant: `0 <= occupancy <= capacity`, dan occupancy selalu sama dengan
/// jumlah slot yang sudah dipublish producer tapi belum dibaca consumer.
#[repr(C)]
pub struct RingStorage<T> {
    occupancy: CacheLinePadded<AtomicUsize>,
    slots: Box<[Slot<T>]>,
    capacity: usize,
}

// SAFETY: RingStorage aman untuk Send/Sync karena:
// - Hanya satu producer yang menulis slot, hanya di posisi write cursor-nya
// - Hanya satu consumer yang membaca slot, hanya di posisi read cursor-nya
// - Akses slot di-gate oleh occupancy counter + fence (lihat publish_write/publish_read)
unsafe impl<T: Send> Send for RingStorage<T> {}
unsafe impl<T: Send> Sync for RingStorage<T> {}

impl<T: Copy> RingStorage<T> {
    /// Alokasi storage dengan `capacity` slot. Alokasi hanya terjadi di sini.
    ///
    /// # Panics
    /// Panic jika `capacity == 0`. Session memvalidasi ini lebih dulu.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be at least 1");

        let slots: Vec<Slot<T>> = (0..capacity).map(|_| Slot::new()).collect();

        Self {
            occupancy: CacheLinePadded::new(AtomicUsize::new(0)),
            slots: slots.into_boxed_slice(),
            capacity,
        }
    }

    /// `true` jika masih ada slot kosong. Poll biasa, tanpa ordering.
    #[inline(always)]
    pub(crate) fn can_write(&self) -> bool {
        self.occupancy.value.load(Ordering::Relaxed) < self.capacity
    }

    /// `true` jika ada elemen yang belum dibaca. Poll biasa, tanpa ordering.
    #[inline(always)]
    pub(crate) fn can_read(&self) -> bool {
        self.occupancy.value.load(Ordering::Relaxed) > 0
    }

    /// Tulis `value` ke slot `pos` lalu publish ke consumer.
    ///
    /// # Safety
    /// - Hanya boleh dipanggil oleh satu-satunya producer.
    /// - `pos` adalah write cursor producer, dan `can_write()` sudah
    ///   terobservasi `true` sejak publish terakhir di slot ini.
    #[inline(always)]
    pub(crate) unsafe fn publish_write(&self, pos: usize, value: T) {
        // Acquire: pasangan dari decrement (Release) consumer, supaya load
        // consumer atas slot ini selesai sebelum kita menimpanya.
        fence(Ordering::Acquire);

        self.slots[pos].data.with_mut(|slot| {
            // SAFETY: slot sudah di-drain consumer atau belum pernah dipakai
            unsafe { (*slot).write(value) };
        });

        // Release fence: store slot di atas harus visible ke thread mana pun
        // yang nanti melihat counter hasil increment di bawah.
        fence(Ordering::Release);

        let prev = self.occupancy.value.fetch_add(1, Ordering::Relaxed);
        debug_assert!(prev < self.capacity, "occupancy overflow");
    }

    /// Ambil elemen di slot `pos` lalu kembalikan slot ke producer.
    ///
    /// # Safety
    /// - Hanya boleh dipanggil oleh satu-satunya consumer.
    /// - `pos` adalah read cursor consumer, dan `can_read()` sudah
    ///   terobservasi `true` sejak read terakhir di slot ini.
    #[inline(always)]
    pub(crate) unsafe fn publish_read(&self, pos: usize) -> T {
        // Acquire fence harus di antara observasi counter dan load slot.
        // Load slot sebelum fence ini bisa membaca nilai basi.
        fence(Ordering::Acquire);

        let value = self.slots[pos].data.with(|slot| {
            // SAFETY: slot sudah dipublish producer (happens-before via fence)
            unsafe { (*slot).assume_init_read() }
        });

        // Hanya consumer yang decrement. Release supaya load di atas selesai
        // sebelum producer boleh menimpa slot ini.
        let prev = self.occupancy.value.fetch_sub(1, Ordering::Release);
        debug_assert!(prev > 0, "occupancy underflow");

        value
    }
}

impl<T> RingStorage<T> {
    /// Jumlah elemen yang sedang ada di ring. Snapshot, bisa langsung basi.
    #[inline(always)]
    pub fn occupancy(&self) -> usize {
        self.occupancy.value.load(Ordering::Relaxed)
    }

    /// Kapasitas ring
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> std::fmt::Debug for RingStorage<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingStorage")
            .field("capacity", &self.capacity)
            .field("occupancy", &self.occupancy())
            .finish()
    }
}
