use alloc::collections::VecDeque;
use alloc::vec::Vec;

use spin::Mutex;

use crate::consts::{UART_EV_ENABLE, UART_EV_PENDING, UART_EV_STATUS, UART_RXEMPTY, UART_RXTX, UART_TXFULL};

/// Emulated LiteX UART. The tx fifo never fills; rx is fed by the test.
pub struct VUart {
    pub emulated_base_addr: usize,
    inner: Mutex<VUartInner>,
}

#[derive(Default)]
struct VUartInner {
    tx: Vec<u8>,
    rx: VecDeque<u8>,
    ev_enable: u32,
    ev_pending: u32,
}

impl VUart {
    pub fn new(emulated_base_addr: usize) -> Self {
        Self {
            emulated_base_addr,
            inner: Mutex::new(VUartInner::default()),
        }
    }

    pub fn take_output(&self) -> Vec<u8> {
        core::mem::take(&mut self.inner.lock().tx)
    }

    /// Queues input and latches the rx event, as the fifo does.
    pub fn push_input(&self, bytes: &[u8]) {
        let mut inner = self.inner.lock();
        inner.rx.extend(bytes.iter().copied());
        if !inner.rx.is_empty() {
            inner.ev_pending |= 0b10;
        }
    }

    pub fn ev_pending(&self) -> u32 {
        self.inner.lock().ev_pending
    }

    pub fn ev_enable(&self) -> u32 {
        self.inner.lock().ev_enable
    }

    pub fn set_ev_enable(&self, val: u32) {
        self.inner.lock().ev_enable = val;
    }

    pub(crate) fn read32(&self, offset: usize) -> u32 {
        let inner = self.inner.lock();
        match offset {
            UART_RXTX => inner.rx.front().copied().unwrap_or(0) as u32,
            UART_TXFULL => 0,
            UART_RXEMPTY => inner.rx.is_empty() as u32,
            UART_EV_STATUS => ((!inner.rx.is_empty()) as u32) << 1 | 1,
            UART_EV_PENDING => inner.ev_pending,
            UART_EV_ENABLE => inner.ev_enable,
            _ => 0,
        }
    }

    pub(crate) fn write32(&self, offset: usize, val: u32) {
        let mut inner = self.inner.lock();
        match offset {
            UART_RXTX => inner.tx.push(val as u8),
            UART_EV_PENDING => {
                inner.ev_pending &= !val;
                // acking the rx event consumes the byte at the fifo head
                if val & 0b10 != 0 {
                    inner.rx.pop_front();
                }
                if !inner.rx.is_empty() {
                    inner.ev_pending |= 0b10;
                }
            }
            UART_EV_ENABLE => inner.ev_enable = val & 0b11,
            _ => {}
        }
    }
}
