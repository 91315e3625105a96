//! Per-run cap on editor markers.

/// Default number of editor markers requested per run.
pub const DEFAULT_INDICATOR_CAPACITY: usize = 16;

/// Caps how many diagnostics may request an editor marker in one run.
/// Errors and warnings draw from the same budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorBudget {
    capacity: usize,
    used: usize,
}

impl Default for IndicatorBudget {
    fn default() -> Self {
        Self::new(DEFAULT_INDICATOR_CAPACITY)
    }
}

impl IndicatorBudget {
    pub fn new(capacity: usize) -> Self {
        IndicatorBudget { capacity, used: 0 }
    }

    /// Takes one marker if any is left.
    pub fn try_consume(&mut self) -> bool {
        if self.used < self.capacity {
            self.used += 1;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.used = 0;
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.used
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}
