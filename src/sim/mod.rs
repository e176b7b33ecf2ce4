//! Emulated VexRiscv SoC for running the bring-up sequence on a host.
//!
//! [`SimSoc`] is a [`RegisterBus`]: each access is routed by address to the
//! emulated device whose window contains it, through the same
//! `BaseDeviceOps` interface a hypervisor would use.

mod devops_impl;
pub mod vaclint;
pub mod vctrl;
pub mod vplic;
pub mod vuart;

use axaddrspace::device::AccessWidth;
use axaddrspace::{GuestPhysAddr, GuestPhysAddrRange};
use axdevice_base::BaseDeviceOps;
use log::warn;
use memory_addr::PhysAddr;

use crate::consts::{VEX_CLINT_ADDR, VEX_CTRL_ADDR, VEX_PLIC_ADDR, VEX_UART_ADDR};
use crate::mmio::RegisterBus;

pub use vaclint::VAclint;
pub use vctrl::VCtrl;
pub use vplic::VPlic;
pub use vuart::VUart;

pub struct SimSoc {
    pub plic: VPlic,
    pub aclint: VAclint,
    pub uart: VUart,
    pub ctrl: VCtrl,
}

impl SimSoc {
    /// Devices at the VexRiscv-SMP default addresses.
    pub fn new() -> Self {
        Self {
            plic: VPlic::new(VEX_PLIC_ADDR),
            aclint: VAclint::new(VEX_CLINT_ADDR),
            uart: VUart::new(VEX_UART_ADDR),
            ctrl: VCtrl::new(VEX_CTRL_ADDR),
        }
    }

    fn devices(&self) -> [&dyn BaseDeviceOps<GuestPhysAddrRange>; 4] {
        [&self.plic, &self.aclint, &self.uart, &self.ctrl]
    }

    fn device_at(&self, addr: GuestPhysAddr) -> Option<&dyn BaseDeviceOps<GuestPhysAddrRange>> {
        self.devices()
            .into_iter()
            .find(|dev| dev.address_range().contains(addr))
    }

    fn read(&self, addr: PhysAddr, width: AccessWidth) -> usize {
        let gpa = GuestPhysAddr::from(addr.as_usize());
        let val = self.device_at(gpa).map(|dev| dev.handle_read(gpa, width));
        match val {
            Some(Ok(val)) => val,
            _ => {
                warn!("sim: unclaimed read at {:#x}", addr.as_usize());
                self.ctrl.bus_error();
                0
            }
        }
    }

    fn write(&self, addr: PhysAddr, width: AccessWidth, val: usize) {
        let gpa = GuestPhysAddr::from(addr.as_usize());
        let res = self.device_at(gpa).map(|dev| dev.handle_write(gpa, width, val));
        if !matches!(res, Some(Ok(()))) {
            warn!("sim: unclaimed write at {:#x}", addr.as_usize());
            self.ctrl.bus_error();
        }
    }
}

impl Default for SimSoc {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterBus for SimSoc {
    fn read32(&self, addr: PhysAddr) -> u32 {
        self.read(addr, AccessWidth::Dword) as u32
    }

    fn write32(&self, addr: PhysAddr, val: u32) {
        self.write(addr, AccessWidth::Dword, val as usize)
    }

    fn read64(&self, addr: PhysAddr) -> u64 {
        self.read(addr, AccessWidth::Qword) as u64
    }

    fn write64(&self, addr: PhysAddr, val: u64) {
        self.write(addr, AccessWidth::Qword, val as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{CTRL_SCRATCH, UART_RXTX};

    #[test]
    fn accesses_route_by_window() {
        let soc = SimSoc::new();
        soc.write32(PhysAddr::from_usize(VEX_CTRL_ADDR + CTRL_SCRATCH), 0xabcd);
        assert_eq!(soc.read32(PhysAddr::from_usize(VEX_CTRL_ADDR + CTRL_SCRATCH)), 0xabcd);
        soc.write32(PhysAddr::from_usize(VEX_UART_ADDR + UART_RXTX), b'x' as u32);
        assert_eq!(soc.uart.take_output(), b"x");
        assert_eq!(soc.ctrl.bus_errors(), 0);
    }

    #[test]
    fn unclaimed_access_counts_bus_error() {
        let soc = SimSoc::new();
        assert_eq!(soc.read32(PhysAddr::from_usize(0x8000_0000)), 0);
        soc.write32(PhysAddr::from_usize(0x8000_0000), 1);
        assert_eq!(soc.ctrl.bus_errors(), 2);
    }

    #[test]
    fn wide_mtimecmp_access() {
        let soc = SimSoc::new();
        let cmp1 = PhysAddr::from_usize(VEX_CLINT_ADDR + vaclint::MTIMECMP_BEGIN + 8);
        soc.write64(cmp1, 0xdead_beef_0000_0001);
        assert_eq!(soc.aclint.mtimecmp(1), 0xdead_beef_0000_0001);
        assert_eq!(soc.read64(cmp1), 0xdead_beef_0000_0001);
    }
}
