//! Concrete VexRiscv-SMP configurations. Both drive the same coordinator and
//! differ in the IPI/timer device, the console and the feature set.

use memory_addr::PhysAddr;

use crate::aclint::{AclintMswi, AclintMtimer};
use crate::consts::*;
use crate::ctrl::LitexCtrl;
use crate::driver::{Board, Bound, ExternConsole, FdtFixup, NoFixup};
use crate::mmio::RegisterBus;
use crate::platform::{PlatformDescriptor, PlatformFeatures, PlatformVersion, default_heap_size};
use crate::plic::Plic;
use crate::resource::{AclintMswiData, AclintMtimerData, ClintData, PlicData, ResourceSet, UartData};
use crate::uart::LitexUart;

pub const VEX_RESOURCES: ResourceSet = ResourceSet {
    plic: PlicData {
        addr: PhysAddr::from_usize(VEX_PLIC_ADDR),
        num_src: VEX_PLIC_NUM_SOURCES,
        first_hartid: 0,
        hart_count: VEX_HART_COUNT,
    },
    mswi: AclintMswiData {
        addr: PhysAddr::from_usize(VEX_MSWI_ADDR),
        size: ACLINT_MSWI_SIZE,
        first_hartid: 0,
        hart_count: VEX_HART_COUNT,
    },
    mtimer: AclintMtimerData {
        mtime_freq: VEX_MTIMER_FREQ,
        mtime_addr: PhysAddr::from_usize(VEX_MTIMER_ADDR + ACLINT_DEFAULT_MTIME_OFFSET),
        mtime_size: ACLINT_DEFAULT_MTIME_SIZE,
        mtimecmp_addr: PhysAddr::from_usize(VEX_MTIMER_ADDR + ACLINT_DEFAULT_MTIMECMP_OFFSET),
        mtimecmp_size: ACLINT_DEFAULT_MTIMECMP_SIZE,
        first_hartid: 0,
        hart_count: VEX_HART_COUNT,
        has_64bit_mmio: true,
    },
    uart: UartData {
        addr: PhysAddr::from_usize(VEX_UART_ADDR),
    },
};

pub const VEX_CLINT: ClintData = ClintData {
    addr: PhysAddr::from_usize(VEX_CLINT_ADDR),
    freq: VEX_MTIMER_FREQ,
    first_hartid: 0,
    hart_count: VEX_HART_COUNT,
    has_64bit_mmio: false,
};

pub const VEX_LEGACY_RESOURCES: ResourceSet = ResourceSet {
    mswi: VEX_CLINT.mswi(),
    mtimer: VEX_CLINT.mtimer(),
    ..VEX_RESOURCES
};

pub const VEX_PLATFORM: PlatformDescriptor = PlatformDescriptor {
    name: "LiteX / VexRiscv-SMP",
    version: PlatformVersion::new(0, 1),
    features: PlatformFeatures::MFAULTS_DELEGATION,
    hart_count: VEX_HART_COUNT,
    hart_stack_size: VEX_HART_STACK_SIZE,
    heap_size: default_heap_size(VEX_HART_COUNT),
};

pub const VEX_LEGACY_PLATFORM: PlatformDescriptor = PlatformDescriptor {
    features: PlatformFeatures::TIMER_VALUE.union(PlatformFeatures::MFAULTS_DELEGATION),
    ..VEX_PLATFORM
};

/// ACLINT MSWI + MTIMER, LiteX UART console.
pub struct VexRiscvSmp<B, F = NoFixup> {
    platform: PlatformDescriptor,
    resources: ResourceSet,
    plic: Plic<B>,
    mswi: AclintMswi<B>,
    mtimer: AclintMtimer<B>,
    uart: LitexUart<B>,
    ctrl: LitexCtrl<B>,
    fdt: F,
}

impl<B: RegisterBus + Copy> VexRiscvSmp<B, NoFixup> {
    pub const fn new(bus: B) -> Self {
        Self::with_fdt(bus, NoFixup)
    }
}

impl<B: RegisterBus + Copy, F: FdtFixup> VexRiscvSmp<B, F> {
    pub const fn with_fdt(bus: B, fdt: F) -> Self {
        Self::with_resources(bus, VEX_PLATFORM, VEX_RESOURCES, fdt)
    }

    pub const fn with_resources(bus: B, platform: PlatformDescriptor, resources: ResourceSet, fdt: F) -> Self {
        Self {
            platform,
            resources,
            plic: Plic::new(bus),
            mswi: AclintMswi::new(bus),
            mtimer: AclintMtimer::new(bus),
            uart: LitexUart::new(bus, resources.uart),
            ctrl: LitexCtrl::new(bus, PhysAddr::from_usize(VEX_CTRL_ADDR)),
            fdt,
        }
    }

    pub fn mswi(&self) -> &AclintMswi<B> {
        &self.mswi
    }

    pub fn mtimer(&self) -> &AclintMtimer<B> {
        &self.mtimer
    }
}

impl<B: RegisterBus + Copy, F: FdtFixup> Board for VexRiscvSmp<B, F> {
    type IrqChip = Plic<B>;
    type Ipi = AclintMswi<B>;
    type Timer = AclintMtimer<B>;
    type Console = LitexUart<B>;
    type Fdt = F;
    type Reset = LitexCtrl<B>;

    fn descriptor(&self) -> &PlatformDescriptor {
        &self.platform
    }

    fn resources(&self) -> &ResourceSet {
        &self.resources
    }

    fn irqchip(&self) -> Bound<'_, Plic<B>> {
        Bound::new(&self.plic, &self.resources.plic)
    }

    fn ipi(&self) -> Bound<'_, AclintMswi<B>> {
        Bound::new(&self.mswi, &self.resources.mswi)
    }

    fn timer(&self) -> Bound<'_, AclintMtimer<B>> {
        Bound::new(&self.mtimer, &self.resources.mtimer)
    }

    fn console(&self) -> &LitexUart<B> {
        &self.uart
    }

    fn fdt(&self) -> &F {
        &self.fdt
    }

    fn reset(&self) -> &LitexCtrl<B> {
        &self.ctrl
    }
}

/// Combined legacy CLINT; console I/O goes through externally supplied
/// routines, so console init has nothing to do.
pub struct VexRiscvLegacy<B, F = NoFixup> {
    resources: ResourceSet,
    plic: Plic<B>,
    mswi: AclintMswi<B>,
    mtimer: AclintMtimer<B>,
    console: ExternConsole,
    ctrl: LitexCtrl<B>,
    fdt: F,
}

impl<B: RegisterBus + Copy> VexRiscvLegacy<B, NoFixup> {
    pub const fn new(bus: B, console: ExternConsole) -> Self {
        Self::with_fdt(bus, console, NoFixup)
    }
}

impl<B: RegisterBus + Copy, F: FdtFixup> VexRiscvLegacy<B, F> {
    pub const fn with_fdt(bus: B, console: ExternConsole, fdt: F) -> Self {
        Self {
            resources: VEX_LEGACY_RESOURCES,
            plic: Plic::new(bus),
            mswi: AclintMswi::new(bus),
            mtimer: AclintMtimer::new(bus),
            console,
            ctrl: LitexCtrl::new(bus, PhysAddr::from_usize(VEX_CTRL_ADDR)),
            fdt,
        }
    }

    pub fn mtimer(&self) -> &AclintMtimer<B> {
        &self.mtimer
    }
}

impl<B: RegisterBus + Copy, F: FdtFixup> Board for VexRiscvLegacy<B, F> {
    type IrqChip = Plic<B>;
    type Ipi = AclintMswi<B>;
    type Timer = AclintMtimer<B>;
    type Console = ExternConsole;
    type Fdt = F;
    type Reset = LitexCtrl<B>;

    fn descriptor(&self) -> &PlatformDescriptor {
        &VEX_LEGACY_PLATFORM
    }

    fn resources(&self) -> &ResourceSet {
        &self.resources
    }

    fn irqchip(&self) -> Bound<'_, Plic<B>> {
        Bound::new(&self.plic, &self.resources.plic)
    }

    fn ipi(&self) -> Bound<'_, AclintMswi<B>> {
        Bound::new(&self.mswi, &self.resources.mswi)
    }

    fn timer(&self) -> Bound<'_, AclintMtimer<B>> {
        Bound::new(&self.mtimer, &self.resources.mtimer)
    }

    fn console(&self) -> &ExternConsole {
        &self.console
    }

    fn fdt(&self) -> &F {
        &self.fdt
    }

    fn reset(&self) -> &LitexCtrl<B> {
        &self.ctrl
    }
}
