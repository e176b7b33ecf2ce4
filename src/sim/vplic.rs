use crate::consts::{PLIC_MAX_CONTEXTS, PLIC_MAX_IRQ};
use spin::Mutex;

const BITS_PER_WORD: usize = 32;
const IRQ_WORDS: usize = (PLIC_MAX_IRQ + BITS_PER_WORD) / BITS_PER_WORD;

/// Emulated PLIC. Out-of-range accesses are dropped and read as zero, like
/// unimplemented registers on the real device.
pub struct VPlic {
    pub emulated_base_addr: usize,
    pub inner: Mutex<VPlicInner>,
}

pub struct VPlicInner {
    pub prio: [u32; PLIC_MAX_IRQ + 1],
    pub pending: [u32; IRQ_WORDS],
    pub enable: [[u32; IRQ_WORDS]; PLIC_MAX_CONTEXTS],
    pub threshold: [u32; PLIC_MAX_CONTEXTS],
    pub claim: [u32; PLIC_MAX_CONTEXTS],
}

impl VPlic {
    pub fn new(emulated_base_addr: usize) -> Self {
        Self {
            emulated_base_addr,
            inner: Mutex::new(VPlicInner {
                prio: [0; PLIC_MAX_IRQ + 1],
                pending: [0; IRQ_WORDS],
                enable: [[0; IRQ_WORDS]; PLIC_MAX_CONTEXTS],
                threshold: [0; PLIC_MAX_CONTEXTS],
                claim: [0; PLIC_MAX_CONTEXTS],
            }),
        }
    }

    fn index_and_bit(irq: usize) -> (usize, usize) {
        (irq / BITS_PER_WORD, irq % BITS_PER_WORD)
    }

    pub fn get_prio(&self, irq: usize) -> u32 {
        let inner = self.inner.lock();
        inner.prio.get(irq).copied().unwrap_or(0)
    }

    pub fn set_prio(&self, irq: usize, prio: u32) {
        let mut inner = self.inner.lock();
        if let Some(slot) = inner.prio.get_mut(irq) {
            *slot = prio;
        }
    }

    pub fn get_pending(&self, irq: usize) -> bool {
        let (index, bit) = Self::index_and_bit(irq);
        let inner = self.inner.lock();
        inner.pending.get(index).is_some_and(|w| w & (1 << bit) != 0)
    }

    pub fn set_pending(&self, irq: usize) {
        let (index, bit) = Self::index_and_bit(irq);
        let mut inner = self.inner.lock();
        if let Some(word) = inner.pending.get_mut(index) {
            *word |= 1 << bit;
        }
    }

    pub fn get_pending_word(&self, word: usize) -> u32 {
        let inner = self.inner.lock();
        inner.pending.get(word).copied().unwrap_or(0)
    }

    pub fn clear_pending(&self, irq: usize) {
        let (index, bit) = Self::index_and_bit(irq);
        let mut inner = self.inner.lock();
        if let Some(word) = inner.pending.get_mut(index) {
            *word &= !(1 << bit);
        }
    }

    pub fn get_enable(&self, context: usize, irq: usize) -> bool {
        let (index, bit) = Self::index_and_bit(irq);
        self.get_enable_word(context, index) & (1 << bit) != 0
    }

    pub fn set_enable_word(&self, context: usize, word: usize, val: u32) {
        let mut inner = self.inner.lock();
        if let Some(slot) = inner.enable.get_mut(context).and_then(|ctx| ctx.get_mut(word)) {
            *slot = val;
        }
    }

    pub fn get_enable_word(&self, context: usize, word: usize) -> u32 {
        let inner = self.inner.lock();
        inner
            .enable
            .get(context)
            .and_then(|ctx| ctx.get(word))
            .copied()
            .unwrap_or(0)
    }

    pub fn get_threshold(&self, context: usize) -> u32 {
        let inner = self.inner.lock();
        inner.threshold.get(context).copied().unwrap_or(0)
    }

    pub fn set_threshold(&self, context: usize, threshold: u32) {
        let mut inner = self.inner.lock();
        if let Some(slot) = inner.threshold.get_mut(context) {
            *slot = threshold;
        }
    }

    fn set_claim(&self, context: usize, claim: u32) {
        let mut inner = self.inner.lock();
        if let Some(slot) = inner.claim.get_mut(context) {
            *slot = claim;
        }
    }

    /// Highest-priority pending source enabled on `context` above its
    /// threshold.
    pub fn claim_irq(&self, context: usize) -> Option<usize> {
        let threshold = self.get_threshold(context);
        let mut best_irq = None;
        let mut best_prio = 0;

        for irq in 1..=PLIC_MAX_IRQ {
            let prio = self.get_prio(irq);
            if prio > threshold && prio > best_prio && self.get_pending(irq) && self.get_enable(context, irq) {
                best_irq = Some(irq);
                best_prio = prio;
            }
        }

        if let Some(irq) = best_irq {
            self.clear_pending(irq);
            self.set_claim(context, irq as u32);
        }

        best_irq
    }

    pub fn complete_irq(&self, context: usize, _irq: usize) {
        self.set_claim(context, 0);
    }

    /// Per-context state a hart's warm init programs: enable words and
    /// threshold.
    pub fn context_state(&self, context: usize) -> ([u32; IRQ_WORDS], u32) {
        let inner = self.inner.lock();
        match (inner.enable.get(context), inner.threshold.get(context)) {
            (Some(enable), Some(threshold)) => (*enable, *threshold),
            _ => ([0; IRQ_WORDS], 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_multiple_bits() {
        let vplic = VPlic::new(0x1000);
        vplic.set_pending(1);
        vplic.set_pending(31);
        vplic.set_pending(32);
        assert!(vplic.get_pending(31));
        vplic.clear_pending(31);
        assert!(!vplic.get_pending(31));
        assert!(vplic.get_pending(1));
        assert!(vplic.get_pending(32));
    }

    #[test]
    fn test_threshold_gates_claim() {
        let vplic = VPlic::new(0x1000);
        vplic.set_prio(3, 1);
        vplic.set_pending(3);
        vplic.set_enable_word(1, 0, 1 << 3);
        // masked like an M-mode context after warm init
        vplic.set_threshold(1, 7);
        assert_eq!(vplic.claim_irq(1), None);
        vplic.set_threshold(1, 0);
        assert_eq!(vplic.claim_irq(1), Some(3));
        assert!(!vplic.get_pending(3));
    }

    #[test]
    fn test_out_of_bounds_is_ignored() {
        let vplic = VPlic::new(0x1000);
        vplic.set_enable_word(PLIC_MAX_CONTEXTS, 0, 0xDEAD_BEEF);
        assert_eq!(vplic.get_enable_word(PLIC_MAX_CONTEXTS, 0), 0);
        vplic.set_enable_word(0, IRQ_WORDS, 0xDEAD_BEEF);
        assert_eq!(vplic.get_enable_word(0, IRQ_WORDS), 0);
        assert_eq!(vplic.get_pending_word(IRQ_WORDS), 0);
    }
}
