//! Resource descriptors: where each subsystem lives and which harts it
//! serves. Built from constants, never mutated.

use memory_addr::{MemoryAddr, PhysAddr};

use crate::consts::*;
use crate::error::{BootError, BootResult};
use crate::hart::HartId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlicData {
    pub addr: PhysAddr,
    pub num_src: usize,
    pub first_hartid: HartId,
    pub hart_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AclintMswiData {
    pub addr: PhysAddr,
    pub size: usize,
    pub first_hartid: HartId,
    pub hart_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AclintMtimerData {
    pub mtime_freq: u64,
    pub mtime_addr: PhysAddr,
    pub mtime_size: usize,
    pub mtimecmp_addr: PhysAddr,
    pub mtimecmp_size: usize,
    pub first_hartid: HartId,
    pub hart_count: usize,
    /// `mtime`/`mtimecmp` accept 64-bit accesses. When false every access is
    /// split into two 32-bit halves.
    pub has_64bit_mmio: bool,
}

/// Legacy CLINT: MSIP and MTIMER banks in one fixed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClintData {
    pub addr: PhysAddr,
    pub freq: u64,
    pub first_hartid: HartId,
    pub hart_count: usize,
    pub has_64bit_mmio: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartData {
    pub addr: PhysAddr,
}

/// Every device the coordinator brings up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSet {
    pub plic: PlicData,
    pub mswi: AclintMswiData,
    pub mtimer: AclintMtimerData,
    pub uart: UartData,
}

fn check_span(resource: &'static str, first_hartid: HartId, hart_count: usize) -> BootResult {
    if hart_count == 0 {
        return Err(BootError::config(resource, "serves no harts"));
    }
    match first_hartid.checked_add(hart_count) {
        Some(_) => Ok(()),
        None => Err(BootError::config(resource, "hart range overflows")),
    }
}

fn check_within(
    resource: &'static str,
    first_hartid: HartId,
    hart_count: usize,
    platform_harts: usize,
) -> BootResult {
    match first_hartid.checked_add(hart_count) {
        Some(end) if end <= platform_harts => Ok(()),
        _ => Err(BootError::config(resource, "hart range exceeds platform hart count")),
    }
}

fn check_aligned(resource: &'static str, addr: PhysAddr) -> BootResult {
    if addr.is_aligned(4usize) {
        Ok(())
    } else {
        Err(BootError::config(resource, "base address is not word aligned"))
    }
}

impl PlicData {
    /// Checks that need nothing but the descriptor itself.
    pub fn check(&self) -> BootResult {
        check_span("plic", self.first_hartid, self.hart_count)?;
        check_aligned("plic", self.addr)?;
        if self.num_src == 0 || self.num_src > PLIC_MAX_IRQ {
            return Err(BootError::config("plic", "source count out of range"));
        }
        let contexts = (self.first_hartid + self.hart_count).checked_mul(CONTEXT_PER_HART);
        if contexts.is_none_or(|n| n > PLIC_MAX_CONTEXTS) {
            return Err(BootError::config("plic", "too many contexts"));
        }
        Ok(())
    }

    pub fn validate(&self, platform_harts: usize) -> BootResult {
        self.check()?;
        check_within("plic", self.first_hartid, self.hart_count, platform_harts)
    }

    /// 32-bit enable words needed to cover every source.
    pub const fn ie_words(&self) -> usize {
        self.num_src / 32 + 1
    }
}

impl AclintMswiData {
    pub fn check(&self) -> BootResult {
        check_span("mswi", self.first_hartid, self.hart_count)?;
        check_aligned("mswi", self.addr)?;
        if self.hart_count.checked_mul(4).is_none_or(|n| n > self.size) {
            return Err(BootError::config("mswi", "window too small for hart count"));
        }
        Ok(())
    }

    pub fn validate(&self, platform_harts: usize) -> BootResult {
        self.check()?;
        check_within("mswi", self.first_hartid, self.hart_count, platform_harts)
    }

    pub fn serves(&self, hart: HartId) -> bool {
        (self.first_hartid..self.first_hartid + self.hart_count).contains(&hart)
    }
}

impl AclintMtimerData {
    pub fn check(&self) -> BootResult {
        check_span("mtimer", self.first_hartid, self.hart_count)?;
        check_aligned("mtimer", self.mtime_addr)?;
        check_aligned("mtimer", self.mtimecmp_addr)?;
        if self.mtime_freq == 0 {
            return Err(BootError::config("mtimer", "zero timebase frequency"));
        }
        if self.mtime_size != 8 {
            return Err(BootError::config("mtimer", "mtime must be 8 bytes"));
        }
        if self.hart_count.checked_mul(8).is_none_or(|n| n > self.mtimecmp_size) {
            return Err(BootError::config("mtimer", "mtimecmp bank too small for hart count"));
        }
        Ok(())
    }

    pub fn validate(&self, platform_harts: usize) -> BootResult {
        self.check()?;
        check_within("mtimer", self.first_hartid, self.hart_count, platform_harts)
    }

    pub fn serves(&self, hart: HartId) -> bool {
        (self.first_hartid..self.first_hartid + self.hart_count).contains(&hart)
    }
}

impl ClintData {
    /// The MSIP bank, seen as an ACLINT MSWI device.
    pub const fn mswi(&self) -> AclintMswiData {
        AclintMswiData {
            addr: PhysAddr::from_usize(self.addr.as_usize() + CLINT_MSWI_OFFSET),
            size: ACLINT_MSWI_SIZE,
            first_hartid: self.first_hartid,
            hart_count: self.hart_count,
        }
    }

    /// The mtime/mtimecmp bank, seen as an ACLINT MTIMER device.
    pub const fn mtimer(&self) -> AclintMtimerData {
        let base = self.addr.as_usize() + CLINT_MTIMER_OFFSET;
        AclintMtimerData {
            mtime_freq: self.freq,
            mtime_addr: PhysAddr::from_usize(base + ACLINT_DEFAULT_MTIME_OFFSET),
            mtime_size: ACLINT_DEFAULT_MTIME_SIZE,
            mtimecmp_addr: PhysAddr::from_usize(base + ACLINT_DEFAULT_MTIMECMP_OFFSET),
            mtimecmp_size: ACLINT_DEFAULT_MTIMECMP_SIZE,
            first_hartid: self.first_hartid,
            hart_count: self.hart_count,
            has_64bit_mmio: self.has_64bit_mmio,
        }
    }
}

impl ResourceSet {
    /// Checks every descriptor against the platform's hart count.
    pub fn validate(&self, platform_harts: usize) -> BootResult {
        self.plic.validate(platform_harts)?;
        self.mswi.validate(platform_harts)?;
        self.mtimer.validate(platform_harts)?;
        check_aligned("uart", self.uart.addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::VEX_RESOURCES;

    #[test]
    fn vex_defaults_validate() {
        assert_eq!(VEX_RESOURCES.validate(VEX_HART_COUNT), Ok(()));
    }

    #[test]
    fn hart_range_past_platform_is_rejected() {
        let mut res = VEX_RESOURCES;
        res.mswi.first_hartid = 4;
        assert!(matches!(
            res.validate(VEX_HART_COUNT),
            Err(BootError::Configuration { resource: "mswi", .. })
        ));
        // fits once the range shrinks
        res.mswi.hart_count = 4;
        assert_eq!(res.validate(VEX_HART_COUNT), Ok(()));
    }

    #[test]
    fn fewer_platform_harts_than_devices_is_rejected() {
        assert!(VEX_RESOURCES.validate(VEX_HART_COUNT - 1).is_err());
    }

    #[test]
    fn plic_source_bounds() {
        let mut plic = VEX_RESOURCES.plic;
        plic.num_src = 0;
        assert!(plic.validate(VEX_HART_COUNT).is_err());
        plic.num_src = PLIC_MAX_IRQ + 1;
        assert!(plic.validate(VEX_HART_COUNT).is_err());
        plic.num_src = 31;
        assert_eq!(plic.ie_words(), 1);
        plic.num_src = 32;
        assert_eq!(plic.ie_words(), 2);
    }

    #[test]
    fn mtimer_shape_checks() {
        let mut mt = VEX_RESOURCES.mtimer;
        mt.mtime_size = 4;
        assert!(mt.validate(VEX_HART_COUNT).is_err());
        let mut mt = VEX_RESOURCES.mtimer;
        mt.mtimecmp_size = 8 * (VEX_HART_COUNT - 1);
        assert!(mt.validate(VEX_HART_COUNT).is_err());
        let mut mt = VEX_RESOURCES.mtimer;
        mt.mtime_freq = 0;
        assert!(mt.validate(VEX_HART_COUNT).is_err());
    }

    #[test]
    fn clint_splits_into_aclint_banks() {
        let clint = ClintData {
            addr: PhysAddr::from_usize(VEX_CLINT_ADDR),
            freq: VEX_MTIMER_FREQ,
            first_hartid: 0,
            hart_count: VEX_HART_COUNT,
            has_64bit_mmio: false,
        };
        assert_eq!(clint.mswi().addr.as_usize(), VEX_CLINT_ADDR);
        assert_eq!(clint.mtimer().mtimecmp_addr.as_usize(), VEX_CLINT_ADDR + 0x4000);
        assert_eq!(clint.mtimer().mtime_addr.as_usize(), VEX_CLINT_ADDR + 0xbff8);
        assert!(!clint.mtimer().has_64bit_mmio);
        assert_eq!(clint.mswi().validate(VEX_HART_COUNT), Ok(()));
        assert_eq!(clint.mtimer().validate(VEX_HART_COUNT), Ok(()));
    }

    #[test]
    fn shape_checks_ignore_platform_size() {
        let mut mswi = VEX_RESOURCES.mswi;
        mswi.first_hartid = 4;
        assert_eq!(mswi.check(), Ok(()));
        assert!(mswi.validate(VEX_HART_COUNT).is_err());
        mswi.first_hartid = usize::MAX;
        assert!(mswi.check().is_err());
        let mut plic = VEX_RESOURCES.plic;
        plic.hart_count = PLIC_MAX_CONTEXTS;
        assert!(matches!(
            plic.check(),
            Err(BootError::Configuration { resource: "plic", reason: "too many contexts" })
        ));
    }

    #[test]
    fn misaligned_base_is_rejected() {
        let mut res = VEX_RESOURCES;
        res.uart.addr = PhysAddr::from_usize(VEX_UART_ADDR + 2);
        assert!(res.validate(VEX_HART_COUNT).is_err());
    }
}
