//! Identifiers and simple allocators for engine bookkeeping.

use serde::{Deserialize, Serialize};

/// Playback generation. Bumped by `skip()` and `reset()`; timers captured under
/// an older generation are ignored when they fire.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Generation(pub u64);

/// Token identifying one triggered phase on one element.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct PhaseToken(pub u64);

/// Monotonic allocator for phase tokens and scheduler sequence numbers.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_token: u64,
    next_seq: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_token(&mut self) -> PhaseToken {
        let id = PhaseToken(self.next_token);
        self.next_token = self.next_token.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        seq
    }
}

impl Generation {
    #[inline]
    pub fn next(self) -> Self {
        Generation(self.0.wrapping_add(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc_token(), PhaseToken(0));
        assert_eq!(alloc.alloc_token(), PhaseToken(1));
        assert_eq!(alloc.alloc_seq(), 0);
        assert_eq!(alloc.alloc_seq(), 1);
        assert_eq!(Generation(3).next(), Generation(4));
    }
}
