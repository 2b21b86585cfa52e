//! Run configuration shared by every property unless overridden.

use crate::seed::Seed;

/// How many trials to run and where the pseudorandom stream starts.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Config {
    /// Trials per property.
    pub trials: usize,
    /// Seed of the root pseudorandom stream.
    pub seed: u64,
}

impl Config {
    /// Number of trials a property runs when not told otherwise.
    pub const DEFAULT_TRIALS: usize = 100;

    /// The defaults: 100 trials from the default seed.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            trials: Self::DEFAULT_TRIALS,
            seed: Seed::DEFAULT,
        }
    }

    /// Replace the trial count.
    #[inline]
    #[must_use]
    pub const fn with_trials(self, trials: usize) -> Self {
        Self { trials, ..self }
    }

    /// Replace the seed.
    #[inline]
    #[must_use]
    pub const fn with_seed(self, seed: u64) -> Self {
        Self { seed, ..self }
    }
}

impl Default for Config {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builder_overrides_only_what_it_names() {
        let config = Config::default().with_trials(7);
        let () = pretty_assertions::assert_eq!(config.trials, 7);
        let () = pretty_assertions::assert_eq!(config.seed, Seed::DEFAULT);
    }
}
