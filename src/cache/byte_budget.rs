use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

/// The shared byte accountant for the clean-block tiers.
///
/// Both residency tiers charge their blocks' bytes here. The used
/// counter is serialized by its own mutex, which is only ever taken
/// for the duration of a single arithmetic step; the capacity is an
/// atomic word so it can be read and replaced without any lock.
pub struct ByteBudget {
    used: Mutex<u64>,
    capacity: AtomicU64,
}

impl ByteBudget {
    pub fn new(capacity: u64) -> Self {
        Self {
            used: Mutex::new(0),
            capacity: AtomicU64::new(capacity),
        }
    }

    pub fn capacity(&self) -> u64 {
        self.capacity.load(Ordering::Relaxed)
    }

    pub fn set_capacity(&self, capacity: u64) {
        self.capacity.store(capacity, Ordering::Relaxed);
    }

    pub fn used(&self) -> u64 {
        *self.used.lock()
    }

    /// Charges `size` bytes if they fit under `cap`, returning whether
    /// the charge was made.
    ///
    /// The capacity is passed in rather than re-read so that one
    /// make-room pass works against a single observed value.
    pub fn try_charge(&self, size: u64, cap: u64) -> bool {
        let mut used = self.used.lock();
        if *used + size > cap {
            return false;
        }
        *used += size;
        true
    }

    /// Charges `size` bytes unconditionally. Used for permanent
    /// entries, which are stored even when they overflow the budget.
    pub fn charge(&self, size: u64) {
        *self.used.lock() += size;
    }

    /// Releases `size` bytes, saturating at zero.
    ///
    /// Concurrent put/evict races on one pointer can release a charge
    /// that was never made; saturation keeps the counter sane.
    pub fn release(&self, size: u64) {
        let mut used = self.used.lock();
        if let Some(remaining) = used.checked_sub(size) {
            *used = remaining;
        } else {
            tracing::warn!(
                used = *used,
                released = size,
                "byte budget underflow, clamping to zero"
            );
            *used = 0;
        }
    }
}
