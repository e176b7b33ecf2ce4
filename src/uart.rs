//! LiteX UART, polled. Events stay masked so console output never depends
//! on the interrupt controller being up.

use axerrno::AxResult;

use crate::consts::{UART_EV_ENABLE, UART_EV_PENDING, UART_RXEMPTY, UART_RXTX, UART_TXFULL};
use crate::driver::ConsoleDevice;
use crate::mmio::RegisterBus;
use crate::resource::UartData;

pub struct LitexUart<B> {
    bus: B,
    data: UartData,
}

impl<B: RegisterBus> LitexUart<B> {
    pub const fn new(bus: B, data: UartData) -> Self {
        Self { bus, data }
    }

    fn reg(&self, offset: usize) -> memory_addr::PhysAddr {
        self.data.addr + offset
    }
}

impl<B: RegisterBus> ConsoleDevice for LitexUart<B> {
    fn init(&self) -> AxResult {
        self.bus.write32(self.reg(UART_EV_ENABLE), 0);
        // acknowledge anything latched before reset
        let pending = self.bus.read32(self.reg(UART_EV_PENDING));
        self.bus.write32(self.reg(UART_EV_PENDING), pending);
        Ok(())
    }

    fn putc(&self, byte: u8) {
        while self.bus.read32(self.reg(UART_TXFULL)) != 0 {
            core::hint::spin_loop();
        }
        self.bus.write32(self.reg(UART_RXTX), byte as u32);
    }

    fn getc(&self) -> Option<u8> {
        if self.bus.read32(self.reg(UART_RXEMPTY)) != 0 {
            return None;
        }
        let byte = self.bus.read32(self.reg(UART_RXTX)) as u8;
        // pop the byte off the rx fifo
        self.bus.write32(self.reg(UART_EV_PENDING), 0b10);
        Some(byte)
    }
}
