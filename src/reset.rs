//! System reset requests.

use core::convert::Infallible;

/// Reset types, numbered as in the SBI SRST extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ResetKind {
    Shutdown = 0,
    ColdReboot = 1,
    WarmReboot = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ResetReason {
    NoReason = 0,
    SystemFailure = 1,
}

/// Parks the calling hart for good.
pub fn halt() -> ! {
    loop {
        #[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
        #[allow(unused_unsafe)]
        unsafe {
            riscv::asm::wfi()
        };
        #[cfg(not(any(target_arch = "riscv32", target_arch = "riscv64")))]
        core::hint::spin_loop();
    }
}

/// Requests the reset through `request` and halts. Returns only when the
/// request was refused.
pub fn reset_and_halt<E>(request: impl FnOnce() -> Result<(), E>) -> Result<Infallible, E> {
    request()?;
    halt()
}
