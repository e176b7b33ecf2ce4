//! Runtime-side helpers for picking the cold-boot hart and holding the
//! others back until it is done. The coordinator never decides this itself;
//! it only ever sees the resulting `cold_boot` flag.

use core::sync::atomic::{AtomicBool, Ordering};

/// First hart to draw wins.
pub struct ColdBootLottery {
    drawn: AtomicBool,
}

impl ColdBootLottery {
    pub const fn new() -> Self {
        Self {
            drawn: AtomicBool::new(false),
        }
    }

    /// `true` for exactly one caller.
    pub fn draw(&self) -> bool {
        self.drawn
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Relaxed)
            .is_ok()
    }
}

impl Default for ColdBootLottery {
    fn default() -> Self {
        Self::new()
    }
}

/// Released by the cold-boot hart once every global device is programmed.
pub struct ColdBootGate {
    done: AtomicBool,
}

impl ColdBootGate {
    pub const fn new() -> Self {
        Self {
            done: AtomicBool::new(false),
        }
    }

    pub fn open(&self) {
        self.done.store(true, Ordering::Release);
    }

    pub fn is_open(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    /// Spins until [`open`](Self::open). There is no timeout: a cold boot
    /// that never finishes hangs every warm hart with it.
    pub fn wait(&self) {
        while !self.is_open() {
            core::hint::spin_loop();
        }
    }
}

impl Default for ColdBootGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::sync::atomic::AtomicUsize;
    use std::thread;

    use super::*;

    #[test]
    fn exactly_one_winner() {
        let lottery = ColdBootLottery::new();
        let winners = AtomicUsize::new(0);
        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    if lottery.draw() {
                        winners.fetch_add(1, Ordering::Relaxed);
                    }
                });
            }
        });
        assert_eq!(winners.load(Ordering::Relaxed), 1);
        assert!(!lottery.draw());
    }

    #[test]
    fn gate_releases_waiters() {
        let gate = ColdBootGate::new();
        assert!(!gate.is_open());
        thread::scope(|s| {
            let waiter = s.spawn(|| gate.wait());
            gate.open();
            waiter.join().unwrap();
        });
        assert!(gate.is_open());
    }
}
