use spin::Mutex;

use crate::consts::{CTRL_BUS_ERRORS, CTRL_RESET, CTRL_SCRATCH};

/// Emulated LiteX control block. Records reset requests instead of
/// resetting, so a test can read back the harness code.
pub struct VCtrl {
    pub emulated_base_addr: usize,
    inner: Mutex<VCtrlInner>,
}

#[derive(Default)]
struct VCtrlInner {
    scratch: u32,
    resets: usize,
    bus_errors: u32,
}

impl VCtrl {
    pub fn new(emulated_base_addr: usize) -> Self {
        Self {
            emulated_base_addr,
            inner: Mutex::new(VCtrlInner::default()),
        }
    }

    /// Scratch code, once a reset has been pulled.
    pub fn finished(&self) -> Option<u32> {
        let inner = self.inner.lock();
        (inner.resets > 0).then_some(inner.scratch)
    }

    pub fn resets(&self) -> usize {
        self.inner.lock().resets
    }

    pub fn bus_errors(&self) -> u32 {
        self.inner.lock().bus_errors
    }

    pub(crate) fn bus_error(&self) {
        self.inner.lock().bus_errors += 1;
    }

    pub(crate) fn read32(&self, offset: usize) -> u32 {
        let inner = self.inner.lock();
        match offset {
            CTRL_SCRATCH => inner.scratch,
            CTRL_BUS_ERRORS => inner.bus_errors,
            _ => 0,
        }
    }

    pub(crate) fn write32(&self, offset: usize, val: u32) {
        let mut inner = self.inner.lock();
        match offset {
            CTRL_RESET if val & 1 != 0 => inner.resets += 1,
            CTRL_SCRATCH => inner.scratch = val,
            _ => {}
        }
    }
}
