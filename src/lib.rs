//! Multi-hart bring-up sequencing for RISC-V supervisor firmware.
//!
//! Every hart runs the same [`Coordinator`] entry points in [`Stage`] order.
//! The one hart the runtime designates as cold-boot hart also programs the
//! global state of each device before any hart arms its own per-hart state.

#![no_std]

#[cfg(any(test, feature = "sim"))]
extern crate alloc;

pub mod aclint;
pub mod board;
pub mod consts;
pub mod coordinator;
pub mod ctrl;
pub mod driver;
pub mod error;
pub mod hart;
pub mod logger;
pub mod lottery;
pub mod mmio;
pub mod platform;
pub mod plic;
pub mod pmp;
pub mod reset;
pub mod resource;
#[cfg(any(test, feature = "sim"))]
pub mod sim;
pub mod uart;

pub use coordinator::{Coordinator, PlatformOps};
pub use driver::{Board, SubsystemDriver};
pub use error::{BootError, BootResult, InitPhase, Subsystem};
pub use hart::{BootPhase, HartContext, HartId, Stage};
pub use reset::{ResetKind, ResetReason};
