//! Token budget: consumed tokens against a fixed ceiling.

use crate::error::{Error, Result};

/// Running count of tokens reported by the provider, against a fixed ceiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBudget {
    used: u64,
    ceiling: u64,
}

impl TokenBudget {
    /// Create an empty budget. The ceiling must be positive.
    pub fn new(ceiling: u64) -> Result<Self> {
        if ceiling == 0 {
            return Err(Error::InvalidConfig(
                "token ceiling must be greater than zero".into(),
            ));
        }
        Ok(Self { used: 0, ceiling })
    }

    /// Add `tokens` to the running total.
    ///
    /// Negative amounts fail with [`Error::InvalidUsage`] and leave the
    /// total untouched.
    pub fn record_usage(&mut self, tokens: i64) -> Result<()> {
        if tokens < 0 {
            return Err(Error::InvalidUsage { amount: tokens });
        }
        self.used = self.used.saturating_add(tokens as u64);
        Ok(())
    }

    pub fn is_over_budget(&self) -> bool {
        self.used >= self.ceiling
    }

    pub fn used(&self) -> u64 {
        self.used
    }

    pub fn ceiling(&self) -> u64 {
        self.ceiling
    }

    /// Tokens left before the ceiling is reached
    pub fn remaining(&self) -> u64 {
        self.ceiling.saturating_sub(self.used)
    }

    /// Start counting from zero again (after a successful compaction)
    pub(crate) fn reset(&mut self) {
        self.used = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_ceiling_rejected() {
        assert!(matches!(TokenBudget::new(0), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_record_usage_accumulates() {
        let mut budget = TokenBudget::new(1000).unwrap();
        budget.record_usage(400).unwrap();
        budget.record_usage(0).unwrap();
        budget.record_usage(250).unwrap();
        assert_eq!(budget.used(), 650);
        assert_eq!(budget.remaining(), 350);
    }

    #[test]
    fn test_negative_usage_rejected() {
        let mut budget = TokenBudget::new(1000).unwrap();
        budget.record_usage(120).unwrap();

        let err = budget.record_usage(-5).unwrap_err();
        assert!(matches!(err, Error::InvalidUsage { amount: -5 }));
        assert_eq!(budget.used(), 120);
    }

    #[test]
    fn test_over_budget_at_ceiling() {
        let mut budget = TokenBudget::new(1000).unwrap();
        budget.record_usage(999).unwrap();
        assert!(!budget.is_over_budget());
        budget.record_usage(1).unwrap();
        assert!(budget.is_over_budget());
        assert_eq!(budget.remaining(), 0);
    }

    #[test]
    fn test_three_turns_cross_ceiling() {
        let mut budget = TokenBudget::new(1000).unwrap();
        for _ in 0..3 {
            budget.record_usage(400).unwrap();
        }
        assert_eq!(budget.used(), 1200);
        assert!(budget.is_over_budget());
    }

    #[test]
    fn test_over_budget_is_idempotent() {
        let mut budget = TokenBudget::new(10).unwrap();
        budget.record_usage(7).unwrap();
        let first = budget.is_over_budget();
        for _ in 0..5 {
            assert_eq!(budget.is_over_budget(), first);
        }
        assert_eq!(budget.used(), 7);
    }

    #[test]
    fn test_reset() {
        let mut budget = TokenBudget::new(10).unwrap();
        budget.record_usage(15).unwrap();
        budget.reset();
        assert_eq!(budget.used(), 0);
        assert_eq!(budget.ceiling(), 10);
        assert!(!budget.is_over_budget());
    }
}
