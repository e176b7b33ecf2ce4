use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PmpFlags: u8 {
        const R = 1 << 0;
        const W = 1 << 1;
        const X = 1 << 2;
        /// Locked, also enforced in M-mode.
        const L = 1 << 7;
    }
}

/// One physical memory protection region of a hart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PmpRegion {
    pub prot: PmpFlags,
    pub addr: usize,
    pub log2size: u32,
}

impl PmpRegion {
    /// Region length in bytes, `None` when it does not fit a `usize`.
    pub const fn size(&self) -> Option<usize> {
        1usize.checked_shl(self.log2size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_saturates_at_address_width() {
        let mut region = PmpRegion {
            prot: PmpFlags::R | PmpFlags::X,
            addr: 0x8000_0000,
            log2size: 12,
        };
        assert_eq!(region.size(), Some(0x1000));
        region.log2size = usize::BITS;
        assert_eq!(region.size(), None);
    }
}
