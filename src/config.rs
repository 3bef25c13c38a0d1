use crate::error::{Error, Result};

/// Smallest fan-out for which splitting a full sphere yields two legal halves.
pub const MIN_FAN_OUT: usize = 2;

/// How an overflowing sphere is divided in two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitPolicy {
    /// Pick two far-apart pivots and cut at the median of
    /// `d(x, a) - d(x, b)`, so both halves get the same number of members.
    #[default]
    Balanced,
    /// Send every member to the nearer of the two pivots. Halves can be
    /// lopsided but overlap less.
    Hyperplane,
}

/// Tuning knobs for an [`MTree`](crate::MTree).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MTreeConfig {
    /// Maximum entries in a leaf sphere, or children in an internal one.
    pub fan_out: usize,
    pub split_policy: SplitPolicy,
    /// Seeds the pivot sampling used by splits and rebalancing.
    pub seed: u64,
}

impl Default for MTreeConfig {
    fn default() -> Self {
        MTreeConfig {
            fan_out: 32,
            split_policy: SplitPolicy::Balanced,
            seed: 0x6d74_7265_6521,
        }
    }
}

impl MTreeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fan_out(mut self, fan_out: usize) -> Self {
        self.fan_out = fan_out;
        self
    }

    pub fn split_policy(mut self, policy: SplitPolicy) -> Self {
        self.split_policy = policy;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.fan_out < MIN_FAN_OUT {
            return Err(Error::InvalidFanOut {
                fan_out: self.fan_out,
                min: MIN_FAN_OUT,
            });
        }
        Ok(())
    }
}
