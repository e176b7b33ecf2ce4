//! ACLINT MSWI (software interrupts) and MTIMER drivers. The legacy CLINT
//! is driven through the same two, see [`crate::resource::ClintData`].

use axerrno::{AxError, AxResult};
use log::trace;
use memory_addr::PhysAddr;
use spin::Once;

use crate::driver::SubsystemDriver;
use crate::hart::HartId;
use crate::mmio::RegisterBus;
use crate::resource::{AclintMswiData, AclintMtimerData};

pub struct AclintMswi<B> {
    bus: B,
    data: Once<AclintMswiData>,
}

impl<B: RegisterBus> AclintMswi<B> {
    pub const fn new(bus: B) -> Self {
        Self {
            bus,
            data: Once::new(),
        }
    }

    fn msip(&self, hart: HartId) -> AxResult<PhysAddr> {
        let data = self.data.get().ok_or(AxError::BadState)?;
        if !data.serves(hart) {
            return Err(AxError::InvalidInput);
        }
        Ok(data.addr + (hart - data.first_hartid) * 4)
    }

    pub fn send_ipi(&self, hart: HartId) -> AxResult {
        self.bus.write32(self.msip(hart)?, 1);
        Ok(())
    }

    pub fn clear_ipi(&self, hart: HartId) -> AxResult {
        self.bus.write32(self.msip(hart)?, 0);
        Ok(())
    }

    pub fn pending(&self, hart: HartId) -> AxResult<bool> {
        Ok(self.bus.read32(self.msip(hart)?) & 1 != 0)
    }
}

impl<B: RegisterBus> SubsystemDriver for AclintMswi<B> {
    type Descriptor = AclintMswiData;
    type Target = HartId;

    fn cold_init(&self, desc: &AclintMswiData) -> AxResult {
        desc.check().map_err(|_| AxError::InvalidInput)?;
        let data = self.data.call_once(|| *desc);
        trace!(
            "mswi@{:#x}: harts {}..{}",
            data.addr.as_usize(),
            data.first_hartid,
            data.first_hartid + data.hart_count
        );
        Ok(())
    }

    /// Drops any IPI left pending from before reset.
    fn warm_init(&self, hart: HartId) -> AxResult {
        self.clear_ipi(hart)
    }
}

pub struct AclintMtimer<B> {
    bus: B,
    data: Once<AclintMtimerData>,
}

impl<B: RegisterBus> AclintMtimer<B> {
    pub const fn new(bus: B) -> Self {
        Self {
            bus,
            data: Once::new(),
        }
    }

    fn data(&self) -> AxResult<&AclintMtimerData> {
        self.data.get().ok_or(AxError::BadState)
    }

    pub fn freq(&self) -> AxResult<u64> {
        Ok(self.data()?.mtime_freq)
    }

    pub fn mtime(&self) -> AxResult<u64> {
        let data = self.data()?;
        let addr = data.mtime_addr;
        if data.has_64bit_mmio {
            return Ok(self.bus.read64(addr));
        }
        // the low half may carry into the high one between the two reads
        loop {
            let hi = self.bus.read32(addr + 4);
            let lo = self.bus.read32(addr);
            if self.bus.read32(addr + 4) == hi {
                return Ok((hi as u64) << 32 | lo as u64);
            }
        }
    }

    /// Programs `hart`'s compare register.
    pub fn set_timer(&self, hart: HartId, value: u64) -> AxResult {
        let data = self.data()?;
        if !data.serves(hart) {
            return Err(AxError::InvalidInput);
        }
        let addr = data.mtimecmp_addr + (hart - data.first_hartid) * 8;
        if data.has_64bit_mmio {
            self.bus.write64(addr, value);
        } else {
            // park the low half high so no intermediate value fires
            self.bus.write32(addr, u32::MAX);
            self.bus.write32(addr + 4, (value >> 32) as u32);
            self.bus.write32(addr, value as u32);
        }
        Ok(())
    }

    pub fn mtimecmp(&self, hart: HartId) -> AxResult<u64> {
        let data = self.data()?;
        if !data.serves(hart) {
            return Err(AxError::InvalidInput);
        }
        let addr = data.mtimecmp_addr + (hart - data.first_hartid) * 8;
        if data.has_64bit_mmio {
            Ok(self.bus.read64(addr))
        } else {
            let lo = self.bus.read32(addr) as u64;
            Ok((self.bus.read32(addr + 4) as u64) << 32 | lo)
        }
    }
}

impl<B: RegisterBus> SubsystemDriver for AclintMtimer<B> {
    type Descriptor = AclintMtimerData;
    type Target = HartId;

    fn cold_init(&self, desc: &AclintMtimerData) -> AxResult {
        desc.check().map_err(|_| AxError::InvalidInput)?;
        let data = self.data.call_once(|| *desc);
        trace!(
            "mtimer: mtime@{:#x} mtimecmp@{:#x} {} Hz",
            data.mtime_addr.as_usize(),
            data.mtimecmp_addr.as_usize(),
            data.mtime_freq
        );
        Ok(())
    }

    /// Pushes the hart's compare value out of reach.
    fn warm_init(&self, hart: HartId) -> AxResult {
        self.set_timer(hart, u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use spin::Mutex;

    use super::*;
    use crate::board::{VEX_CLINT, VEX_RESOURCES};
    use crate::sim::SimSoc;

    /// Bus that only records writes, in order.
    #[derive(Default)]
    struct WriteLog(Mutex<Vec<(usize, u32)>>);

    impl RegisterBus for WriteLog {
        fn read32(&self, _addr: PhysAddr) -> u32 {
            0
        }

        fn write32(&self, addr: PhysAddr, val: u32) {
            self.0.lock().push((addr.as_usize(), val));
        }
    }

    #[test]
    fn mswi_warm_clears_only_own_msip() {
        let soc = SimSoc::new();
        let mswi = AclintMswi::new(&soc);
        mswi.cold_init(&VEX_RESOURCES.mswi).unwrap();
        mswi.send_ipi(1).unwrap();
        mswi.send_ipi(2).unwrap();
        mswi.warm_init(1).unwrap();
        assert!(!mswi.pending(1).unwrap());
        assert!(mswi.pending(2).unwrap());
        assert!(soc.aclint.msip(2));
    }

    #[test]
    fn mswi_before_cold_is_bad_state() {
        let soc = SimSoc::new();
        let mswi = AclintMswi::new(&soc);
        assert_eq!(mswi.warm_init(0), Err(AxError::BadState));
    }

    #[test]
    fn mtimer_warm_parks_compare() {
        let soc = SimSoc::new();
        let mtimer = AclintMtimer::new(&soc);
        mtimer.cold_init(&VEX_RESOURCES.mtimer).unwrap();
        mtimer.set_timer(3, 1234).unwrap();
        mtimer.warm_init(2).unwrap();
        assert_eq!(soc.aclint.mtimecmp(2), u64::MAX);
        assert_eq!(soc.aclint.mtimecmp(3), 1234);
        assert_eq!(mtimer.freq(), Ok(VEX_RESOURCES.mtimer.mtime_freq));
    }

    #[test]
    fn narrow_mmio_splits_accesses() {
        let soc = SimSoc::new();
        let mtimer = AclintMtimer::new(&soc);
        mtimer.cold_init(&VEX_CLINT.mtimer()).unwrap();
        mtimer.set_timer(0, 0x1_0000_0002).unwrap();
        assert_eq!(soc.aclint.mtimecmp(0), 0x1_0000_0002);
        assert_eq!(mtimer.mtimecmp(0), Ok(0x1_0000_0002));
        soc.aclint.set_mtime(0x2_ffff_fff0);
        assert_eq!(mtimer.mtime(), Ok(0x2_ffff_fff0));
    }

    #[test]
    fn mtimer_rejects_foreign_hart() {
        let soc = SimSoc::new();
        let mtimer = AclintMtimer::new(&soc);
        mtimer.cold_init(&VEX_RESOURCES.mtimer).unwrap();
        assert_eq!(mtimer.warm_init(VEX_RESOURCES.mtimer.hart_count), Err(AxError::InvalidInput));
    }

    #[test]
    fn narrow_compare_write_order() {
        let bus = WriteLog::default();
        let mtimer = AclintMtimer::new(&bus);
        let desc = VEX_CLINT.mtimer();
        mtimer.cold_init(&desc).unwrap();
        mtimer.set_timer(2, 0x0000_0007_0000_0009).unwrap();
        let lo = desc.mtimecmp_addr.as_usize() + 2 * 8;
        // the low half is parked high first so no half-written value is
        // ever below mtime
        assert_eq!(*bus.0.lock(), [(lo, u32::MAX), (lo + 4, 7), (lo, 9)]);
    }

    #[test]
    fn cold_rejects_bad_descriptors() {
        let soc = SimSoc::new();
        let mswi = AclintMswi::new(&soc);
        let bad_mswi = AclintMswiData {
            size: 4,
            ..VEX_RESOURCES.mswi
        };
        assert_eq!(mswi.cold_init(&bad_mswi), Err(AxError::InvalidInput));
        assert_eq!(mswi.send_ipi(0), Err(AxError::BadState));

        let mtimer = AclintMtimer::new(&soc);
        let bad_mtimer = AclintMtimerData {
            mtime_freq: 0,
            ..VEX_RESOURCES.mtimer
        };
        assert_eq!(mtimer.cold_init(&bad_mtimer), Err(AxError::InvalidInput));
        assert_eq!(mtimer.freq(), Err(AxError::BadState));
    }
}
