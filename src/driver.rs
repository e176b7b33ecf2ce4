//! The facade the coordinator drives. Each subsystem exposes a cold path
//! (global state, once per boot) and a warm path (per-hart state, once per
//! hart); the coordinator never touches a device except through these.

use axerrno::AxResult;

use crate::error::BootResult;
use crate::hart::{HartId, PlicContexts};
use crate::platform::PlatformDescriptor;
use crate::pmp::PmpRegion;
use crate::reset::{ResetKind, ResetReason};
use crate::resource::ResourceSet;

pub trait SubsystemDriver {
    /// Resource descriptor the cold path programs the device from.
    type Descriptor;
    /// Per-hart resource the warm path arms.
    type Target: Copy;

    fn cold_init(&self, desc: &Self::Descriptor) -> AxResult;
    fn warm_init(&self, target: Self::Target) -> AxResult;
}

/// Polled byte console. Must not depend on interrupts being set up.
pub trait ConsoleDevice {
    fn init(&self) -> AxResult;
    fn putc(&self, byte: u8);
    fn getc(&self) -> Option<u8>;

    fn puts(&self, s: &str) {
        s.bytes().for_each(|b| self.putc(b));
    }
}

/// Patches the live device tree handed to the next stage.
pub trait FdtFixup {
    fn fdt_address(&self) -> usize;
    fn fixup(&self, fdt: usize);
}

pub trait SystemReset {
    fn supported(&self, kind: ResetKind) -> bool;
    /// Delivers the request. Real hardware usually never returns from this.
    fn reset(&self, kind: ResetKind, reason: ResetReason) -> AxResult;
}

/// A driver bound to the descriptor it is brought up from.
pub struct Bound<'a, D: SubsystemDriver> {
    pub driver: &'a D,
    pub desc: &'a D::Descriptor,
}

impl<'a, D: SubsystemDriver> Bound<'a, D> {
    pub fn new(driver: &'a D, desc: &'a D::Descriptor) -> Self {
        Self { driver, desc }
    }
}

/// The capability set of one concrete platform configuration.
pub trait Board {
    type IrqChip: SubsystemDriver<Target = PlicContexts>;
    type Ipi: SubsystemDriver<Target = HartId>;
    type Timer: SubsystemDriver<Target = HartId>;
    type Console: ConsoleDevice;
    type Fdt: FdtFixup;
    type Reset: SystemReset;

    fn descriptor(&self) -> &PlatformDescriptor;
    fn resources(&self) -> &ResourceSet;

    fn irqchip(&self) -> Bound<'_, Self::IrqChip>;
    fn ipi(&self) -> Bound<'_, Self::Ipi>;
    fn timer(&self) -> Bound<'_, Self::Timer>;
    fn console(&self) -> &Self::Console;
    fn fdt(&self) -> &Self::Fdt;
    fn reset(&self) -> &Self::Reset;

    fn early_init(&self, _cold_boot: bool, _hart: HartId) -> AxResult {
        Ok(())
    }

    fn pmp_regions(&self, _hart: HartId) -> &[PmpRegion] {
        &[]
    }

    /// Descriptor and resources, checked together.
    fn validate(&self) -> BootResult {
        let desc = self.descriptor();
        desc.validate()?;
        self.resources().validate(desc.hart_count)
    }
}

/// Device tree left untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFixup;

impl FdtFixup for NoFixup {
    fn fdt_address(&self) -> usize {
        0
    }

    fn fixup(&self, _fdt: usize) {}
}

/// Console whose byte I/O is supplied by routines linked in from outside.
/// There is nothing to initialize.
#[derive(Clone, Copy)]
pub struct ExternConsole {
    putc: fn(u8),
    getc: fn() -> Option<u8>,
}

impl ExternConsole {
    pub const fn new(putc: fn(u8), getc: fn() -> Option<u8>) -> Self {
        Self { putc, getc }
    }
}

impl ConsoleDevice for ExternConsole {
    fn init(&self) -> AxResult {
        Ok(())
    }

    fn putc(&self, byte: u8) {
        (self.putc)(byte)
    }

    fn getc(&self) -> Option<u8> {
        (self.getc)()
    }
}

impl core::fmt::Debug for ExternConsole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("ExternConsole")
    }
}
