use core::fmt;

use axerrno::AxError;

use crate::hart::HartId;
use crate::reset::ResetKind;

pub type BootResult<T = ()> = Result<T, BootError>;

/// Subsystem an init failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subsystem {
    Platform,
    IrqChip,
    Ipi,
    Timer,
    Console,
}

/// Which half of a two-phase init failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitPhase {
    /// Global state, programmed once by the cold-boot hart.
    Cold,
    /// Per-hart state, programmed by every hart for itself.
    Warm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BootError {
    #[error("invalid {resource} configuration: {reason}")]
    Configuration {
        resource: &'static str,
        reason: &'static str,
    },
    #[error("{subsystem} {phase} init failed: {cause:?}")]
    SubsystemInit {
        subsystem: Subsystem,
        phase: InitPhase,
        cause: AxError,
    },
    #[error("PMP region {index} is not available on hart {hart}")]
    UnsupportedResource { hart: HartId, index: u32 },
    #[error("reset type {0:?} is not supported")]
    UnsupportedReset(ResetKind),
    #[error("reset {kind:?} was refused: {cause:?}")]
    ResetFailed { kind: ResetKind, cause: AxError },
    #[error("hart {0} is not part of this platform")]
    UnknownHart(HartId),
}

impl BootError {
    pub(crate) const fn config(resource: &'static str, reason: &'static str) -> Self {
        Self::Configuration { resource, reason }
    }

    pub(crate) const fn init(subsystem: Subsystem, phase: InitPhase, cause: AxError) -> Self {
        Self::SubsystemInit {
            subsystem,
            phase,
            cause,
        }
    }

    /// Cold failures take the whole platform down, warm ones only the hart.
    pub fn is_platform_fatal(&self) -> bool {
        match self {
            Self::Configuration { .. } => true,
            Self::SubsystemInit { phase, .. } => *phase == InitPhase::Cold,
            Self::UnsupportedResource { .. }
            | Self::UnsupportedReset(_)
            | Self::ResetFailed { .. }
            | Self::UnknownHart(_) => false,
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Platform => "platform",
            Self::IrqChip => "irqchip",
            Self::Ipi => "ipi",
            Self::Timer => "timer",
            Self::Console => "console",
        };
        f.write_str(name)
    }
}

impl fmt::Display for InitPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cold => f.write_str("cold"),
            Self::Warm => f.write_str("warm"),
        }
    }
}
