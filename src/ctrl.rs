//! LiteX control block as the reset device. The scratch register carries a
//! pass/fail code for a simulation harness before the SoC reset is pulled.

use axerrno::AxResult;
use memory_addr::PhysAddr;

use crate::consts::{CTRL_CODE_FAIL, CTRL_CODE_PASS, CTRL_RESET, CTRL_SCRATCH};
use crate::driver::SystemReset;
use crate::mmio::RegisterBus;
use crate::reset::{ResetKind, ResetReason};

pub struct LitexCtrl<B> {
    bus: B,
    addr: PhysAddr,
}

impl<B: RegisterBus> LitexCtrl<B> {
    pub const fn new(bus: B, addr: PhysAddr) -> Self {
        Self { bus, addr }
    }
}

impl<B: RegisterBus> SystemReset for LitexCtrl<B> {
    fn supported(&self, kind: ResetKind) -> bool {
        matches!(
            kind,
            ResetKind::Shutdown | ResetKind::ColdReboot | ResetKind::WarmReboot
        )
    }

    fn reset(&self, kind: ResetKind, reason: ResetReason) -> AxResult {
        let code = match reason {
            ResetReason::NoReason => CTRL_CODE_PASS,
            ResetReason::SystemFailure => CTRL_CODE_FAIL,
        };
        self.bus.write32(self.addr + CTRL_SCRATCH, code);
        log::trace!("ctrl: {kind:?}, scratch {code:#x}");
        self.bus.write32(self.addr + CTRL_RESET, 1);
        Ok(())
    }
}
