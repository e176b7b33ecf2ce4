//! Hart identity and the boot progress each hart carries through the
//! sequencer.

use crate::consts::CONTEXT_PER_HART;

pub type HartId = usize;

/// The two PLIC contexts a hart receives external interrupts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlicContexts {
    /// Machine-mode delivery context, `2 * hart`.
    pub m: usize,
    /// Supervisor-mode delivery context, `2 * hart + 1`.
    pub s: usize,
}

pub const fn plic_contexts(hart: HartId) -> PlicContexts {
    PlicContexts {
        m: hart * CONTEXT_PER_HART,
        s: hart * CONTEXT_PER_HART + 1,
    }
}

/// Id of the hart executing this code.
#[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
pub fn current() -> HartId {
    riscv::register::mhartid::read()
}

/// Init stages in the order every hart runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Early,
    IrqChip,
    Ipi,
    Timer,
    Console,
    Final,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Early,
        Stage::IrqChip,
        Stage::Ipi,
        Stage::Timer,
        Stage::Console,
        Stage::Final,
    ];

    pub const fn next(self) -> Option<Stage> {
        match self {
            Stage::Early => Some(Stage::IrqChip),
            Stage::IrqChip => Some(Stage::Ipi),
            Stage::Ipi => Some(Stage::Timer),
            Stage::Timer => Some(Stage::Console),
            Stage::Console => Some(Stage::Final),
            Stage::Final => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BootPhase {
    NotStarted,
    /// Cold-boot hart only: every global device has been programmed. The
    /// hart passes through here on its way to `WarmPhaseComplete`.
    ColdPhaseComplete,
    /// The hart's own interrupt, IPI and timer state is armed.
    WarmPhaseComplete,
    Ready,
}

/// Boot progress of one hart. Owned by the hart running it, never shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HartContext {
    pub hart: HartId,
    next: Option<Stage>,
    phase: BootPhase,
    cold: bool,
}

impl HartContext {
    pub const fn new(hart: HartId) -> Self {
        Self {
            hart,
            next: Some(Stage::Early),
            phase: BootPhase::NotStarted,
            cold: false,
        }
    }

    /// Stage the hart runs next, `None` once it is ready.
    pub const fn next_stage(&self) -> Option<Stage> {
        self.next
    }

    pub const fn phase(&self) -> BootPhase {
        self.phase
    }

    /// Whether this hart ran the cold paths and they all completed.
    pub fn cold_phase_complete(&self) -> bool {
        self.cold && self.phase >= BootPhase::ColdPhaseComplete
    }

    pub fn is_ready(&self) -> bool {
        self.phase == BootPhase::Ready
    }

    /// Records that `stage` completed successfully.
    pub(crate) fn complete(&mut self, stage: Stage, cold_boot: bool) {
        debug_assert_eq!(self.next, Some(stage));
        self.next = stage.next();
        match stage {
            // the timer is the last cold path, and its warm path runs in the
            // same stage right after it
            Stage::Timer => {
                if cold_boot {
                    self.cold = true;
                    self.advance(BootPhase::ColdPhaseComplete);
                }
                self.advance(BootPhase::WarmPhaseComplete);
            }
            Stage::Final => self.advance(BootPhase::Ready),
            _ => {}
        }
    }

    fn advance(&mut self, phase: BootPhase) {
        debug_assert!(phase > self.phase);
        log::trace!("[HART#{}] {:?} -> {:?}", self.hart, self.phase, phase);
        self.phase = phase;
    }
}
