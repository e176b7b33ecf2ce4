//! Boot coordinator: the ordered entry points every hart runs during
//! bring-up.
//!
//! The firmware runtime picks exactly one cold-boot hart and guarantees that
//! hart's cold path for a subsystem finishes before any hart issues the warm
//! path for it. Within one hart the entry points run in [`Stage`] order.
//! Nothing here locks: cold paths touch global registers under the
//! runtime's temporal guarantee, warm paths touch per-hart registers only.

use core::convert::Infallible;

use log::{debug, error, info};

use crate::driver::{Board, Bound, ConsoleDevice, FdtFixup, SubsystemDriver, SystemReset};
use crate::error::{BootError, BootResult, InitPhase, Subsystem};
use crate::hart::{HartContext, HartId, Stage, plic_contexts};
use crate::platform::PlatformDescriptor;
use crate::pmp::PmpRegion;
use crate::reset::{self, ResetKind, ResetReason};

/// The operations table handed to the firmware runtime.
pub trait PlatformOps {
    fn early_init(&self, cold_boot: bool, hart: HartId) -> BootResult;
    fn irqchip_init(&self, cold_boot: bool, hart: HartId) -> BootResult;
    fn ipi_init(&self, cold_boot: bool, hart: HartId) -> BootResult;
    fn timer_init(&self, cold_boot: bool, hart: HartId) -> BootResult;
    fn console_init(&self) -> BootResult;
    fn final_init(&self, cold_boot: bool) -> BootResult;
    fn system_reset(&self, kind: ResetKind, reason: ResetReason) -> BootResult;
    fn pmp_region_count(&self, hart: HartId) -> u32;
    fn pmp_region_info(&self, hart: HartId, index: u32) -> BootResult<PmpRegion>;
}

pub struct Coordinator<B: Board> {
    board: B,
}

/// Cold path once (when asked), then the warm path for `target`.
fn two_phase<D: SubsystemDriver>(
    subsystem: Subsystem,
    cold_boot: bool,
    bound: Bound<'_, D>,
    target: D::Target,
) -> BootResult {
    if cold_boot {
        bound.driver.cold_init(bound.desc).map_err(|e| {
            error!("{subsystem} cold init failed: {e:?}");
            BootError::init(subsystem, InitPhase::Cold, e)
        })?;
        info!("{subsystem} cold init done");
    }
    bound.driver.warm_init(target).map_err(|e| {
        error!("{subsystem} warm init failed: {e:?}");
        BootError::init(subsystem, InitPhase::Warm, e)
    })
}

impl<B: Board> Coordinator<B> {
    /// Wraps `board` after checking its descriptors.
    pub fn new(board: B) -> BootResult<Self> {
        board.validate()?;
        Ok(Self { board })
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn platform(&self) -> &PlatformDescriptor {
        self.board.descriptor()
    }

    fn check_hart(&self, hart: HartId) -> BootResult {
        if hart < self.platform().hart_count {
            Ok(())
        } else {
            Err(BootError::UnknownHart(hart))
        }
    }

    pub fn early_init(&self, cold_boot: bool, hart: HartId) -> BootResult {
        self.check_hart(hart)?;
        let phase = if cold_boot { InitPhase::Cold } else { InitPhase::Warm };
        self.board
            .early_init(cold_boot, hart)
            .map_err(|e| BootError::init(Subsystem::Platform, phase, e))
    }

    pub fn irqchip_init(&self, cold_boot: bool, hart: HartId) -> BootResult {
        self.check_hart(hart)?;
        let ctx = plic_contexts(hart);
        debug!("[HART#{hart}] irqchip init, contexts ({}, {})", ctx.m, ctx.s);
        two_phase(Subsystem::IrqChip, cold_boot, self.board.irqchip(), ctx)
    }

    pub fn ipi_init(&self, cold_boot: bool, hart: HartId) -> BootResult {
        self.check_hart(hart)?;
        debug!("[HART#{hart}] ipi init");
        two_phase(Subsystem::Ipi, cold_boot, self.board.ipi(), hart)
    }

    /// The timer is self-timed: its cold path gets no external reference.
    pub fn timer_init(&self, cold_boot: bool, hart: HartId) -> BootResult {
        self.check_hart(hart)?;
        debug!("[HART#{hart}] timer init");
        two_phase(Subsystem::Timer, cold_boot, self.board.timer(), hart)
    }

    pub fn console_init(&self) -> BootResult {
        self.board
            .console()
            .init()
            .map_err(|e| BootError::init(Subsystem::Console, InitPhase::Cold, e))
    }

    /// Fixes up the device tree on the cold-boot hart; nothing elsewhere.
    pub fn final_init(&self, cold_boot: bool) -> BootResult {
        if !cold_boot {
            return Ok(());
        }
        let fdt = self.board.fdt();
        let addr = fdt.fdt_address();
        debug!("fdt fixup at {addr:#x}");
        fdt.fixup(addr);
        Ok(())
    }

    /// Safe on any hart at any time; needs no other subsystem.
    pub fn system_reset(&self, kind: ResetKind, reason: ResetReason) -> BootResult {
        let dev = self.board.reset();
        if !dev.supported(kind) {
            return Err(BootError::UnsupportedReset(kind));
        }
        info!("system reset: {kind:?} ({reason:?})");
        dev.reset(kind, reason).map_err(|cause| {
            error!("system reset {kind:?} refused: {cause:?}");
            BootError::ResetFailed { kind, cause }
        })
    }

    /// [`system_reset`](Self::system_reset), then parks the hart. Returns
    /// only if the request was refused.
    pub fn reset_and_halt(&self, kind: ResetKind, reason: ResetReason) -> BootResult<Infallible> {
        reset::reset_and_halt(|| self.system_reset(kind, reason))
    }

    pub fn pmp_region_count(&self, hart: HartId) -> u32 {
        self.board.pmp_regions(hart).len() as u32
    }

    pub fn pmp_region_info(&self, hart: HartId, index: u32) -> BootResult<PmpRegion> {
        self.board
            .pmp_regions(hart)
            .get(index as usize)
            .copied()
            .ok_or(BootError::UnsupportedResource { hart, index })
    }

    /// Runs the next stage of `ctx`. A failed stage is not recorded, so the
    /// hart's boot stops there. The console is shared and has no per-hart
    /// state, so warm harts pass its stage without touching it.
    pub fn step(&self, ctx: &mut HartContext, cold_boot: bool) -> BootResult<Option<Stage>> {
        let Some(stage) = ctx.next_stage() else {
            return Ok(None);
        };
        let hart = ctx.hart;
        match stage {
            Stage::Early => self.early_init(cold_boot, hart),
            Stage::IrqChip => self.irqchip_init(cold_boot, hart),
            Stage::Ipi => self.ipi_init(cold_boot, hart),
            Stage::Timer => self.timer_init(cold_boot, hart),
            Stage::Console if cold_boot => self.console_init(),
            Stage::Console => Ok(()),
            Stage::Final => self.final_init(cold_boot),
        }?;
        ctx.complete(stage, cold_boot);
        Ok(Some(stage))
    }

    /// Runs every stage for `hart`, stopping at the first failure.
    pub fn bring_up(&self, cold_boot: bool, hart: HartId) -> BootResult<HartContext> {
        let mut ctx = HartContext::new(hart);
        while self.step(&mut ctx, cold_boot)?.is_some() {}
        info!("[HART#{hart}] ready");
        Ok(ctx)
    }
}

impl<B: Board> PlatformOps for Coordinator<B> {
    fn early_init(&self, cold_boot: bool, hart: HartId) -> BootResult {
        Coordinator::early_init(self, cold_boot, hart)
    }

    fn irqchip_init(&self, cold_boot: bool, hart: HartId) -> BootResult {
        Coordinator::irqchip_init(self, cold_boot, hart)
    }

    fn ipi_init(&self, cold_boot: bool, hart: HartId) -> BootResult {
        Coordinator::ipi_init(self, cold_boot, hart)
    }

    fn timer_init(&self, cold_boot: bool, hart: HartId) -> BootResult {
        Coordinator::timer_init(self, cold_boot, hart)
    }

    fn console_init(&self) -> BootResult {
        Coordinator::console_init(self)
    }

    fn final_init(&self, cold_boot: bool) -> BootResult {
        Coordinator::final_init(self, cold_boot)
    }

    fn system_reset(&self, kind: ResetKind, reason: ResetReason) -> BootResult {
        Coordinator::system_reset(self, kind, reason)
    }

    fn pmp_region_count(&self, hart: HartId) -> u32 {
        Coordinator::pmp_region_count(self, hart)
    }

    fn pmp_region_info(&self, hart: HartId, index: u32) -> BootResult<PmpRegion> {
        Coordinator::pmp_region_info(self, hart, index)
    }
}

#[cfg(test)]
mod tests {
    use axerrno::AxError;

    use super::*;
    use crate::board::{VEX_PLATFORM, VEX_RESOURCES, VexRiscvSmp};
    use crate::driver::NoFixup;
    use crate::resource::ResourceSet;
    use crate::sim::SimSoc;

    fn cold_failure(subsystem: Subsystem) -> BootError {
        BootError::init(subsystem, InitPhase::Cold, AxError::InvalidInput)
    }

    /// A board whose descriptors skipped `Coordinator::new` validation.
    fn unchecked(soc: &SimSoc, resources: ResourceSet) -> VexRiscvSmp<&SimSoc> {
        VexRiscvSmp::with_resources(soc, VEX_PLATFORM, resources, NoFixup)
    }

    #[test]
    fn bad_descriptor_fails_cold_without_warm_writes() {
        let soc = SimSoc::new();
        soc.plic.set_threshold(0, 1);
        soc.aclint.set_msip(0, 1);
        let mut resources = VEX_RESOURCES;
        resources.plic.num_src = 4096;
        resources.mswi.size = 0;
        resources.mtimer.mtime_freq = 0;
        let board = unchecked(&soc, resources);

        assert_eq!(
            two_phase(Subsystem::IrqChip, true, board.irqchip(), plic_contexts(0)),
            Err(cold_failure(Subsystem::IrqChip))
        );
        assert_eq!(
            two_phase(Subsystem::Ipi, true, board.ipi(), 0),
            Err(cold_failure(Subsystem::Ipi))
        );
        assert_eq!(
            two_phase(Subsystem::Timer, true, board.timer(), 0),
            Err(cold_failure(Subsystem::Timer))
        );
        assert_eq!(soc.plic.get_threshold(0), 1);
        assert!(soc.aclint.msip(0));
        assert_eq!(soc.aclint.mtimecmp(0), 0);
        assert_eq!(soc.ctrl.bus_errors(), 0);
    }

    #[test]
    fn foreign_hart_is_rejected_before_any_driver() {
        let soc = SimSoc::new();
        let coord = Coordinator::new(VexRiscvSmp::new(&soc)).unwrap();
        let huge = usize::MAX / 2 + 1;
        for hart in [VEX_PLATFORM.hart_count, huge] {
            assert_eq!(coord.early_init(true, hart), Err(BootError::UnknownHart(hart)));
            assert_eq!(coord.irqchip_init(true, hart), Err(BootError::UnknownHart(hart)));
            assert_eq!(coord.ipi_init(true, hart), Err(BootError::UnknownHart(hart)));
            assert_eq!(coord.timer_init(true, hart), Err(BootError::UnknownHart(hart)));
        }
        // the cold paths never ran
        assert_eq!(coord.board().mtimer().freq(), Err(AxError::BadState));
        assert!(coord.bring_up(false, huge).is_err());
    }

    #[test]
    fn warm_bring_up_leaves_console_alone() {
        let soc = SimSoc::new();
        let coord = Coordinator::new(VexRiscvSmp::new(&soc)).unwrap();
        coord.bring_up(true, 0).unwrap();
        // input arrives and the cold hart turns rx events back on
        soc.uart.push_input(b"k");
        soc.uart.set_ev_enable(0b10);
        let ctx = coord.bring_up(false, 3).unwrap();
        assert!(ctx.is_ready());
        assert_eq!(soc.uart.ev_enable(), 0b10);
        assert_eq!(soc.uart.ev_pending(), 0b10);
        assert_eq!(coord.board().console().getc(), Some(b'k'));
    }
}
