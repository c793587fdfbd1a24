use std::time::Duration;

/// Backoff parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffConfig {
    /// Delay after the first rate-limit hit.
    pub base: Duration,
    /// Growth factor per consecutive hit.
    pub multiplier: f64,
    /// Upper bound on any delay.
    pub max: Duration,
    /// When false every hit waits `base`.
    pub enabled: bool,
}

/// Delay for the `count`-th consecutive hit (1-based).
///
/// `min(base * multiplier^(count-1), max)` when enabled, otherwise `base`.
pub fn delay_for(config: &BackoffConfig, count: u32) -> Duration {
    if !config.enabled {
        return config.base;
    }

    let exponent = count.saturating_sub(1).min(i32::MAX as u32) as i32;
    let secs = config.base.as_secs_f64() * config.multiplier.powi(exponent);
    let max = config.max.as_secs_f64();

    if !secs.is_finite() || secs >= max {
        return config.max;
    }
    Duration::from_secs(secs.floor() as u64)
}

/// Consecutive rate-limit counter.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffState {
    config: BackoffConfig,
    count: u32,
}

impl BackoffState {
    pub fn new(config: BackoffConfig) -> Self {
        Self { config, count: 0 }
    }

    /// Consecutive hits so far.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Whether no hit is outstanding.
    pub fn is_idle(&self) -> bool {
        self.count == 0
    }

    /// Delay the current count maps to. An idle state reports `base`.
    pub fn delay(&self) -> Duration {
        if self.is_idle() {
            self.config.base
        } else {
            delay_for(&self.config, self.count)
        }
    }

    /// Records a rate-limit hit. Returns the next state and how long to wait.
    pub fn on_failure(&self) -> (Self, Duration) {
        let next = Self {
            config: self.config,
            count: self.count.saturating_add(1),
        };
        let delay = delay_for(&self.config, next.count);
        (next, delay)
    }

    /// Records a success. The flag is true when a pending backoff was cleared.
    pub fn on_success(&self) -> (Self, bool) {
        let reset = !self.is_idle();
        (
            Self {
                config: self.config,
                count: 0,
            },
            reset,
        )
    }
}
