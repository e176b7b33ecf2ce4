use axaddrspace::device::AccessWidth;
use axaddrspace::{GuestPhysAddr, GuestPhysAddrRange};
use axdevice_base::{BaseDeviceOps, EmuDeviceType};
use axerrno::AxResult;
use log::trace;

use crate::consts::{
    CLINT_SIZE, CONTEXT_ENABLE_STRIDE, CONTEXT_STRIDE, CTRL_WINDOW_SIZE, PLIC_ENABLE_BEGIN, PLIC_ENABLE_END,
    PLIC_PENDING_BEGIN, PLIC_PENDING_END, PLIC_PRIO_BEGIN, PLIC_PRIO_END, PLIC_THRESHOLD_CLAIM_BEGIN,
    PLIC_THRESHOLD_CLAIM_END, UART_WINDOW_SIZE,
};
use crate::sim::vaclint::VAclint;
use crate::sim::vctrl::VCtrl;
use crate::sim::vplic::VPlic;
use crate::sim::vuart::VUart;

impl BaseDeviceOps<GuestPhysAddrRange> for VPlic {
    fn emu_type(&self) -> EmuDeviceType {
        EmuDeviceType::EmuDeviceTInterruptController
    }

    fn address_range(&self) -> GuestPhysAddrRange {
        GuestPhysAddrRange::from_start_size(
            self.emulated_base_addr.into(),
            PLIC_THRESHOLD_CLAIM_END + 1 - PLIC_PRIO_BEGIN,
        )
    }

    fn handle_read(&self, addr: GuestPhysAddr, width: AccessWidth) -> AxResult<usize> {
        let offset = addr.as_usize() - self.emulated_base_addr;
        let val = match width {
            AccessWidth::Dword => {
                if (PLIC_PRIO_BEGIN..=PLIC_PRIO_END).contains(&offset) {
                    self.get_prio(offset / 4) as usize
                } else if (PLIC_PENDING_BEGIN..=PLIC_PENDING_END).contains(&offset) {
                    let word = (offset - PLIC_PENDING_BEGIN) / 4;
                    self.get_pending_word(word) as usize
                } else if (PLIC_ENABLE_BEGIN..=PLIC_ENABLE_END).contains(&offset) {
                    let ctx = (offset - PLIC_ENABLE_BEGIN) / CONTEXT_ENABLE_STRIDE;
                    let word = ((offset - PLIC_ENABLE_BEGIN) % CONTEXT_ENABLE_STRIDE) / 4;
                    self.get_enable_word(ctx, word) as usize
                } else if (PLIC_THRESHOLD_CLAIM_BEGIN..=PLIC_THRESHOLD_CLAIM_END).contains(&offset) {
                    let ctx = (offset - PLIC_THRESHOLD_CLAIM_BEGIN) / CONTEXT_STRIDE;
                    match (offset - PLIC_THRESHOLD_CLAIM_BEGIN) % CONTEXT_STRIDE {
                        0 => self.get_threshold(ctx) as usize,
                        4 => self.claim_irq(ctx).unwrap_or(0),
                        _ => 0,
                    }
                } else {
                    0
                }
            }
            _ => 0,
        };
        trace!("vplic read: offset={offset:#x}, width={width:?} -> {val:#x}");
        Ok(val)
    }

    fn handle_write(&self, addr: GuestPhysAddr, width: AccessWidth, val: usize) -> AxResult {
        let offset = addr.as_usize() - self.emulated_base_addr;
        trace!("vplic write: offset={offset:#x}, width={width:?}, val={val:#x}");
        if width != AccessWidth::Dword {
            return Ok(());
        }
        if (PLIC_PRIO_BEGIN..=PLIC_PRIO_END).contains(&offset) {
            self.set_prio(offset / 4, val as u32);
        } else if (PLIC_ENABLE_BEGIN..=PLIC_ENABLE_END).contains(&offset) {
            let ctx = (offset - PLIC_ENABLE_BEGIN) / CONTEXT_ENABLE_STRIDE;
            let word = ((offset - PLIC_ENABLE_BEGIN) % CONTEXT_ENABLE_STRIDE) / 4;
            self.set_enable_word(ctx, word, val as u32);
        } else if (PLIC_THRESHOLD_CLAIM_BEGIN..=PLIC_THRESHOLD_CLAIM_END).contains(&offset) {
            let ctx = (offset - PLIC_THRESHOLD_CLAIM_BEGIN) / CONTEXT_STRIDE;
            match (offset - PLIC_THRESHOLD_CLAIM_BEGIN) % CONTEXT_STRIDE {
                0 => self.set_threshold(ctx, val as u32),
                4 => self.complete_irq(ctx, val),
                _ => {}
            }
        }
        Ok(())
    }
}

impl BaseDeviceOps<GuestPhysAddrRange> for VAclint {
    fn emu_type(&self) -> EmuDeviceType {
        EmuDeviceType::EmuDeviceTInterruptController
    }

    fn address_range(&self) -> GuestPhysAddrRange {
        GuestPhysAddrRange::from_start_size(self.emulated_base_addr.into(), CLINT_SIZE)
    }

    fn handle_read(&self, addr: GuestPhysAddr, width: AccessWidth) -> AxResult<usize> {
        let offset = addr.as_usize() - self.emulated_base_addr;
        let val = match width {
            AccessWidth::Dword => self.read32(offset) as usize,
            AccessWidth::Qword => self.read64(offset) as usize,
            _ => 0,
        };
        trace!("vaclint read: offset={offset:#x}, width={width:?} -> {val:#x}");
        Ok(val)
    }

    fn handle_write(&self, addr: GuestPhysAddr, width: AccessWidth, val: usize) -> AxResult {
        let offset = addr.as_usize() - self.emulated_base_addr;
        trace!("vaclint write: offset={offset:#x}, width={width:?}, val={val:#x}");
        match width {
            AccessWidth::Dword => self.write32(offset, val as u32),
            AccessWidth::Qword => self.write64(offset, val as u64),
            _ => {}
        }
        Ok(())
    }
}

impl BaseDeviceOps<GuestPhysAddrRange> for VUart {
    fn emu_type(&self) -> EmuDeviceType {
        EmuDeviceType::EmuDeviceTConsole
    }

    fn address_range(&self) -> GuestPhysAddrRange {
        GuestPhysAddrRange::from_start_size(self.emulated_base_addr.into(), UART_WINDOW_SIZE)
    }

    fn handle_read(&self, addr: GuestPhysAddr, width: AccessWidth) -> AxResult<usize> {
        let offset = addr.as_usize() - self.emulated_base_addr;
        match width {
            AccessWidth::Dword => Ok(self.read32(offset) as usize),
            _ => Ok(0),
        }
    }

    fn handle_write(&self, addr: GuestPhysAddr, width: AccessWidth, val: usize) -> AxResult {
        let offset = addr.as_usize() - self.emulated_base_addr;
        if width == AccessWidth::Dword {
            self.write32(offset, val as u32);
        }
        Ok(())
    }
}

impl BaseDeviceOps<GuestPhysAddrRange> for VCtrl {
    fn emu_type(&self) -> EmuDeviceType {
        EmuDeviceType::EmuDeviceTMeta
    }

    fn address_range(&self) -> GuestPhysAddrRange {
        GuestPhysAddrRange::from_start_size(self.emulated_base_addr.into(), CTRL_WINDOW_SIZE)
    }

    fn handle_read(&self, addr: GuestPhysAddr, width: AccessWidth) -> AxResult<usize> {
        let offset = addr.as_usize() - self.emulated_base_addr;
        match width {
            AccessWidth::Dword => Ok(self.read32(offset) as usize),
            _ => Ok(0),
        }
    }

    fn handle_write(&self, addr: GuestPhysAddr, width: AccessWidth, val: usize) -> AxResult {
        let offset = addr.as_usize() - self.emulated_base_addr;
        trace!("vctrl write: offset={offset:#x}, val={val:#x}");
        if width == AccessWidth::Dword {
            self.write32(offset, val as u32);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{PLIC_MAX_IRQ, VEX_PLIC_ADDR};

    #[test]
    fn handle_read_write_prio_happy_path() {
        let vplic = VPlic::new(VEX_PLIC_ADDR);
        let addr = GuestPhysAddr::from(VEX_PLIC_ADDR + PLIC_PRIO_BEGIN + 3 * 4);
        vplic.handle_write(addr, AccessWidth::Dword, 0x5).unwrap();
        assert_eq!(vplic.handle_read(addr, AccessWidth::Dword).unwrap(), 0x5);
    }

    #[test]
    fn handle_read_write_threshold_claim_happy_path() {
        let vplic = VPlic::new(VEX_PLIC_ADDR);
        let ctx = 1;
        let threshold = GuestPhysAddr::from(VEX_PLIC_ADDR + PLIC_THRESHOLD_CLAIM_BEGIN + ctx * CONTEXT_STRIDE);
        let claim = GuestPhysAddr::from(VEX_PLIC_ADDR + PLIC_THRESHOLD_CLAIM_BEGIN + ctx * CONTEXT_STRIDE + 4);
        vplic.handle_write(threshold, AccessWidth::Dword, 0x7).unwrap();
        assert_eq!(vplic.handle_read(threshold, AccessWidth::Dword).unwrap(), 0x7);
        vplic.handle_write(claim, AccessWidth::Dword, 0x2).unwrap();
        assert_eq!(vplic.handle_read(claim, AccessWidth::Dword).unwrap(), 0);
    }

    #[test]
    fn handle_read_pending_word_out_of_bounds() {
        let vplic = VPlic::new(VEX_PLIC_ADDR);
        let word = (PLIC_MAX_IRQ + 32) / 32;
        let addr = GuestPhysAddr::from(VEX_PLIC_ADDR + PLIC_PENDING_BEGIN + word * 4);
        assert_eq!(vplic.handle_read(addr, AccessWidth::Dword).unwrap(), 0);
    }

    #[test]
    fn non_dword_plic_access_is_dropped() {
        let vplic = VPlic::new(VEX_PLIC_ADDR);
        let addr = GuestPhysAddr::from(VEX_PLIC_ADDR + PLIC_PRIO_BEGIN + 4);
        vplic.handle_write(addr, AccessWidth::Word, 0x1234).unwrap();
        assert_eq!(vplic.handle_read(addr, AccessWidth::Dword).unwrap(), 0);
        assert_eq!(vplic.handle_read(addr, AccessWidth::Byte).unwrap(), 0);
    }

    #[test]
    fn ranges_cover_register_windows() {
        let vplic = VPlic::new(VEX_PLIC_ADDR);
        let range = vplic.address_range();
        assert!(range.contains(GuestPhysAddr::from(VEX_PLIC_ADDR + PLIC_THRESHOLD_CLAIM_END)));
        assert!(!range.contains(GuestPhysAddr::from(VEX_PLIC_ADDR + PLIC_THRESHOLD_CLAIM_END + 1)));
    }
}
