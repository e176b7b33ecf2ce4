//! PLIC driver: the cold path resets every source priority, the warm path
//! masks a hart's two delivery contexts.

use axerrno::{AxError, AxResult};
use log::trace;
use memory_addr::PhysAddr;
use spin::Once;

use crate::consts::{
    CONTEXT_ENABLE_STRIDE, CONTEXT_PER_HART, CONTEXT_STRIDE, PLIC_ENABLE_BEGIN, PLIC_PRIO_BEGIN,
    PLIC_THRESHOLD_CLAIM_BEGIN, PLIC_THRESHOLD_MASK_ALL,
};
use crate::driver::SubsystemDriver;
use crate::hart::PlicContexts;
use crate::mmio::RegisterBus;
use crate::resource::PlicData;

pub struct Plic<B> {
    bus: B,
    data: Once<PlicData>,
}

impl<B: RegisterBus> Plic<B> {
    pub const fn new(bus: B) -> Self {
        Self {
            bus,
            data: Once::new(),
        }
    }

    fn data(&self) -> AxResult<&PlicData> {
        self.data.get().ok_or(AxError::BadState)
    }

    fn prio_addr(base: PhysAddr, src: usize) -> PhysAddr {
        base + PLIC_PRIO_BEGIN + src * 4
    }

    fn enable_addr(base: PhysAddr, ctx: usize, word: usize) -> PhysAddr {
        base + PLIC_ENABLE_BEGIN + ctx * CONTEXT_ENABLE_STRIDE + word * 4
    }

    fn threshold_addr(base: PhysAddr, ctx: usize) -> PhysAddr {
        base + PLIC_THRESHOLD_CLAIM_BEGIN + ctx * CONTEXT_STRIDE
    }

    pub fn set_priority(&self, src: usize, prio: u32) -> AxResult {
        let data = self.data()?;
        if src == 0 || src > data.num_src {
            return Err(AxError::InvalidInput);
        }
        self.bus.write32(Self::prio_addr(data.addr, src), prio);
        Ok(())
    }

    fn clear_enables(&self, data: &PlicData, ctx: usize) {
        for word in 0..data.ie_words() {
            self.bus.write32(Self::enable_addr(data.addr, ctx, word), 0);
        }
    }
}

impl<B: RegisterBus> SubsystemDriver for Plic<B> {
    type Descriptor = PlicData;
    type Target = PlicContexts;

    fn cold_init(&self, desc: &PlicData) -> AxResult {
        desc.check().map_err(|_| AxError::InvalidInput)?;
        let data = self.data.call_once(|| *desc);
        for src in 1..=data.num_src {
            self.bus.write32(Self::prio_addr(data.addr, src), 0);
        }
        trace!("plic@{:#x}: {} sources at priority 0", data.addr.as_usize(), data.num_src);
        Ok(())
    }

    fn warm_init(&self, ctx: PlicContexts) -> AxResult {
        let data = self.data()?;
        let hart = ctx.m / CONTEXT_PER_HART;
        if !(data.first_hartid..data.first_hartid + data.hart_count).contains(&hart) {
            return Err(AxError::InvalidInput);
        }
        self.clear_enables(data, ctx.m);
        self.clear_enables(data, ctx.s);
        // M-mode stays masked, S-mode takes every priority
        self.bus.write32(Self::threshold_addr(data.addr, ctx.m), PLIC_THRESHOLD_MASK_ALL);
        self.bus.write32(Self::threshold_addr(data.addr, ctx.s), 0);
        trace!("plic: contexts ({}, {}) armed", ctx.m, ctx.s);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::VEX_RESOURCES;
    use crate::hart::plic_contexts;
    use crate::sim::SimSoc;

    #[test]
    fn warm_before_cold_is_bad_state() {
        let soc = SimSoc::new();
        let plic = Plic::new(&soc);
        assert_eq!(plic.warm_init(plic_contexts(0)), Err(AxError::BadState));
    }

    #[test]
    fn cold_zeroes_priorities() {
        let soc = SimSoc::new();
        for src in 1..=VEX_RESOURCES.plic.num_src {
            soc.plic.set_prio(src, 5);
        }
        let plic = Plic::new(&soc);
        plic.cold_init(&VEX_RESOURCES.plic).unwrap();
        for src in 1..=VEX_RESOURCES.plic.num_src {
            assert_eq!(soc.plic.get_prio(src), 0);
        }
    }

    #[test]
    fn warm_masks_m_and_opens_s() {
        let soc = SimSoc::new();
        soc.plic.set_enable_word(4, 0, 0xff);
        soc.plic.set_enable_word(5, 0, 0xff);
        let plic = Plic::new(&soc);
        plic.cold_init(&VEX_RESOURCES.plic).unwrap();
        plic.warm_init(plic_contexts(2)).unwrap();
        assert_eq!(soc.plic.get_enable_word(4, 0), 0);
        assert_eq!(soc.plic.get_enable_word(5, 0), 0);
        assert_eq!(soc.plic.get_threshold(4), PLIC_THRESHOLD_MASK_ALL);
        assert_eq!(soc.plic.get_threshold(5), 0);
    }

    #[test]
    fn hart_outside_descriptor_is_rejected() {
        let soc = SimSoc::new();
        let plic = Plic::new(&soc);
        plic.cold_init(&VEX_RESOURCES.plic).unwrap();
        let past_end = VEX_RESOURCES.plic.first_hartid + VEX_RESOURCES.plic.hart_count;
        assert_eq!(plic.warm_init(plic_contexts(past_end)), Err(AxError::InvalidInput));
    }

    #[test]
    fn cold_rejects_bad_descriptor_untouched() {
        let soc = SimSoc::new();
        soc.plic.set_prio(1, 5);
        let plic = Plic::new(&soc);
        let bad = PlicData {
            num_src: 4096,
            ..VEX_RESOURCES.plic
        };
        assert_eq!(plic.cold_init(&bad), Err(AxError::InvalidInput));
        assert_eq!(soc.plic.get_prio(1), 5);
        // nothing recorded, so the warm path still refuses
        assert_eq!(plic.warm_init(plic_contexts(0)), Err(AxError::BadState));
    }

    #[test]
    fn priority_bounds() {
        let soc = SimSoc::new();
        let plic = Plic::new(&soc);
        plic.cold_init(&VEX_RESOURCES.plic).unwrap();
        plic.set_priority(2, 3).unwrap();
        assert_eq!(soc.plic.get_prio(2), 3);
        assert_eq!(plic.set_priority(0, 1), Err(AxError::InvalidInput));
        assert_eq!(plic.set_priority(VEX_RESOURCES.plic.num_src + 1, 1), Err(AxError::InvalidInput));
    }
}
