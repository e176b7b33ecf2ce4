//! Platform descriptor the firmware runtime reads to size stacks and heap
//! and to decide which entry points to call.

use bitflags::bitflags;

use crate::error::{BootError, BootResult};

bitflags! {
    /// Optional capabilities of a platform.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PlatformFeatures: u32 {
        const TIMER_VALUE = 1 << 0;
        const HART_HOTPLUG = 1 << 1;
        const PMP = 1 << 2;
        const SCOUNTEREN = 1 << 3;
        const MCOUNTEREN = 1 << 4;
        const MFAULTS_DELEGATION = 1 << 5;
        const HART_SECONDARY_BOOT = 1 << 6;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PlatformVersion {
    pub major: u16,
    pub minor: u16,
}

impl PlatformVersion {
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// Packed `major << 16 | minor`.
    pub const fn raw(self) -> u32 {
        (self.major as u32) << 16 | self.minor as u32
    }
}

/// Default firmware heap for `harts` harts.
pub const fn default_heap_size(harts: usize) -> usize {
    0x8000 + 0x800 * harts
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformDescriptor {
    pub name: &'static str,
    pub version: PlatformVersion,
    pub features: PlatformFeatures,
    pub hart_count: usize,
    pub hart_stack_size: usize,
    pub heap_size: usize,
}

impl PlatformDescriptor {
    pub fn validate(&self) -> BootResult {
        if self.hart_count == 0 {
            return Err(BootError::config("platform", "no harts"));
        }
        if self.hart_stack_size == 0 || self.hart_stack_size % 16 != 0 {
            return Err(BootError::config("platform", "hart stack size must be a non-zero multiple of 16"));
        }
        Ok(())
    }

    pub fn has(&self, feature: PlatformFeatures) -> bool {
        self.features.contains(feature)
    }
}
