use spin::Mutex;

use crate::consts::{ACLINT_DEFAULT_MTIME_OFFSET, CLINT_MSWI_OFFSET, CLINT_MTIMER_OFFSET, VEX_HART_COUNT};

pub const MSIP_BEGIN: usize = CLINT_MSWI_OFFSET;
pub const MSIP_END: usize = MSIP_BEGIN + VEX_HART_COUNT * 4;
pub const MTIMECMP_BEGIN: usize = CLINT_MTIMER_OFFSET;
pub const MTIMECMP_END: usize = MTIMECMP_BEGIN + VEX_HART_COUNT * 8;
pub const MTIME: usize = CLINT_MTIMER_OFFSET + ACLINT_DEFAULT_MTIME_OFFSET;

/// Emulated CLINT-layout ACLINT: one MSIP word and one mtimecmp per hart,
/// one shared mtime.
pub struct VAclint {
    pub emulated_base_addr: usize,
    pub inner: Mutex<VAclintInner>,
}

pub struct VAclintInner {
    pub msip: [u32; VEX_HART_COUNT],
    pub mtimecmp: [u64; VEX_HART_COUNT],
    pub mtime: u64,
}

impl VAclint {
    pub fn new(emulated_base_addr: usize) -> Self {
        Self {
            emulated_base_addr,
            inner: Mutex::new(VAclintInner {
                msip: [0; VEX_HART_COUNT],
                // reset value of mtimecmp is unspecified; model stale state
                mtimecmp: [0; VEX_HART_COUNT],
                mtime: 0,
            }),
        }
    }

    pub fn msip(&self, hart: usize) -> bool {
        self.inner.lock().msip.get(hart).is_some_and(|v| v & 1 != 0)
    }

    pub fn set_msip(&self, hart: usize, val: u32) {
        if let Some(slot) = self.inner.lock().msip.get_mut(hart) {
            *slot = val & 1;
        }
    }

    pub fn mtimecmp(&self, hart: usize) -> u64 {
        self.inner.lock().mtimecmp.get(hart).copied().unwrap_or(0)
    }

    pub fn set_mtime(&self, val: u64) {
        self.inner.lock().mtime = val;
    }

    /// Reads 32 bits at `offset`, either half of a 64-bit register.
    pub(crate) fn read32(&self, offset: usize) -> u32 {
        let inner = self.inner.lock();
        if (MSIP_BEGIN..MSIP_END).contains(&offset) {
            inner.msip[(offset - MSIP_BEGIN) / 4]
        } else if (MTIMECMP_BEGIN..MTIMECMP_END).contains(&offset) {
            let rel = offset - MTIMECMP_BEGIN;
            half(inner.mtimecmp[rel / 8], rel % 8)
        } else if (MTIME..MTIME + 8).contains(&offset) {
            half(inner.mtime, offset - MTIME)
        } else {
            0
        }
    }

    pub(crate) fn write32(&self, offset: usize, val: u32) {
        let mut inner = self.inner.lock();
        if (MSIP_BEGIN..MSIP_END).contains(&offset) {
            inner.msip[(offset - MSIP_BEGIN) / 4] = val & 1;
        } else if (MTIMECMP_BEGIN..MTIMECMP_END).contains(&offset) {
            let rel = offset - MTIMECMP_BEGIN;
            let reg = &mut inner.mtimecmp[rel / 8];
            *reg = set_half(*reg, rel % 8, val);
        } else if (MTIME..MTIME + 8).contains(&offset) {
            inner.mtime = set_half(inner.mtime, offset - MTIME, val);
        }
    }

    pub(crate) fn read64(&self, offset: usize) -> u64 {
        let inner = self.inner.lock();
        if (MTIMECMP_BEGIN..MTIMECMP_END).contains(&offset) && offset % 8 == 0 {
            inner.mtimecmp[(offset - MTIMECMP_BEGIN) / 8]
        } else if offset == MTIME {
            inner.mtime
        } else {
            0
        }
    }

    pub(crate) fn write64(&self, offset: usize, val: u64) {
        let mut inner = self.inner.lock();
        if (MTIMECMP_BEGIN..MTIMECMP_END).contains(&offset) && offset % 8 == 0 {
            inner.mtimecmp[(offset - MTIMECMP_BEGIN) / 8] = val;
        } else if offset == MTIME {
            inner.mtime = val;
        }
    }
}

fn half(reg: u64, byte: usize) -> u32 {
    if byte < 4 { reg as u32 } else { (reg >> 32) as u32 }
}

fn set_half(reg: u64, byte: usize, val: u32) -> u64 {
    if byte < 4 {
        (reg & !0xffff_ffff) | val as u64
    } else {
        (reg & 0xffff_ffff) | (val as u64) << 32
    }
}
