//! Register access used by the drivers.
//!
//! Drivers never dereference device addresses themselves; they go through a
//! [`RegisterBus`], so the same driver runs against real MMIO ([`Mmio`]) or
//! the emulated SoC in [`crate::sim`].

use memory_addr::PhysAddr;

pub trait RegisterBus {
    fn read32(&self, addr: PhysAddr) -> u32;
    fn write32(&self, addr: PhysAddr, val: u32);

    fn read64(&self, addr: PhysAddr) -> u64 {
        let lo = self.read32(addr) as u64;
        let hi = self.read32(addr + 4) as u64;
        hi << 32 | lo
    }

    fn write64(&self, addr: PhysAddr, val: u64) {
        self.write32(addr, val as u32);
        self.write32(addr + 4, (val >> 32) as u32);
    }
}

impl<B: RegisterBus + ?Sized> RegisterBus for &B {
    fn read32(&self, addr: PhysAddr) -> u32 {
        (**self).read32(addr)
    }

    fn write32(&self, addr: PhysAddr, val: u32) {
        (**self).write32(addr, val)
    }

    fn read64(&self, addr: PhysAddr) -> u64 {
        (**self).read64(addr)
    }

    fn write64(&self, addr: PhysAddr, val: u64) {
        (**self).write64(addr, val)
    }
}

/// Volatile accesses to identity-mapped device memory.
#[derive(Debug, Clone, Copy)]
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// # Safety
    /// Every address handed to this bus must be a mapped device register.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl RegisterBus for Mmio {
    fn read32(&self, addr: PhysAddr) -> u32 {
        unsafe { core::ptr::read_volatile(addr.as_usize() as *const u32) }
    }

    fn write32(&self, addr: PhysAddr, val: u32) {
        unsafe { core::ptr::write_volatile(addr.as_usize() as *mut u32, val) }
    }

    fn read64(&self, addr: PhysAddr) -> u64 {
        unsafe { core::ptr::read_volatile(addr.as_usize() as *const u64) }
    }

    fn write64(&self, addr: PhysAddr, val: u64) {
        unsafe { core::ptr::write_volatile(addr.as_usize() as *mut u64, val) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volatile_bus_hits_memory() {
        let mut reg = 0u64;
        let base = PhysAddr::from_usize(&raw mut reg as usize);
        let bus = unsafe { Mmio::new() };
        bus.write64(base, 0xaaaa_bbbb_cccc_dddd);
        assert_eq!(bus.read32(base), 0xcccc_dddd);
        bus.write32(base + 4, 0x1234);
        assert_eq!(bus.read64(base), 0x1234_cccc_dddd);
        assert_eq!(reg, 0x1234_cccc_dddd);
    }
}
