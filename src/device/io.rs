use std::collections::BTreeMap;

/// Sink for 32-bit register writes at absolute addresses.
pub trait RegisterIo {
    fn write32(&mut self, addr: u64, value: u32);
}

impl<T: RegisterIo + ?Sized> RegisterIo for &mut T {
    fn write32(&mut self, addr: u64, value: u32) {
        (**self).write32(addr, value)
    }
}

/// Memory mapped register window.
///
/// The mapping covers bus addresses `addr..addr + len`. Writes are taken at
/// the absolute addresses [`Device`](crate::Device) computes, so `addr` is
/// normally the device's `base_addr`.
pub struct Mmio {
    base: *mut u8,
    addr: u64,
    len: usize,
}

impl Mmio {
    /// # Safety
    ///
    /// `base` must point to a mapping of at least `len` bytes that stays valid,
    /// and writable with 32-bit volatile stores, for the lifetime of the value.
    pub unsafe fn new(base: *mut u8, addr: u64, len: usize) -> Self {
        Mmio { base, addr, len }
    }

    /// Bus address of the first byte of the mapping.
    pub fn addr(&self) -> u64 {
        self.addr
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn window_offset(&self, addr: u64) -> Option<usize> {
        let offset = usize::try_from(addr.checked_sub(self.addr)?).ok()?;
        let last = self.len.checked_sub(4)?;

        (offset % 4 == 0 && offset <= last).then_some(offset)
    }
}

impl RegisterIo for Mmio {
    fn write32(&mut self, addr: u64, value: u32) {
        let Some(offset) = self.window_offset(addr) else {
            panic!(
                "register write to {addr:#x} outside of the {:#x} byte window at {:#x}",
                self.len, self.addr
            );
        };

        // Safety: bounds and alignment checked above, validity of the mapping is
        // the contract of `Mmio::new`.
        unsafe { std::ptr::write_volatile(self.base.add(offset) as *mut u32, value) }
    }
}

/// In-memory register model: records every write in order and the last value
/// written to each address.
#[derive(Clone, Debug, Default)]
pub struct RegisterLog {
    writes: Vec<(u64, u32)>,
    values: BTreeMap<u64, u32>,
}

impl RegisterLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> &[(u64, u32)] {
        &self.writes
    }

    /// Last value written to `addr`, if any.
    pub fn get(&self, addr: u64) -> Option<u32> {
        self.values.get(&addr).copied()
    }

    /// Value at `addr` assuming registers not yet written hold zero.
    pub fn read32(&self, addr: u64) -> u32 {
        self.get(addr).unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.writes.clear();
        self.values.clear();
    }
}

impl RegisterIo for RegisterLog {
    fn write32(&mut self, addr: u64, value: u32) {
        self.writes.push((addr, value));
        self.values.insert(addr, value);
    }
}
