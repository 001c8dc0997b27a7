use chrono::Duration;

/// Thresholds and durations driving the brute-force guard.
///
/// Loaded once at process start and read-only thereafter. A policy with a
/// zero threshold effectively disables login for the affected key, which is
/// accepted as an explicit operator choice; [`LockoutPolicy::validate`] logs
/// a warning so it never happens silently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockoutPolicy {
    /// Failed attempts per identifier within the window at which the guard
    /// denies further attempts and locks the account.
    pub max_failures_per_identifier: u32,
    /// Failed attempts per source address within the window at which the
    /// guard denies further attempts.
    pub max_failures_per_address: u32,
    /// Trailing duration over which failures are counted.
    pub window: Duration,
    /// Minimum elapsed time after locking before auto-unlock is eligible.
    pub lock_duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_failures_per_identifier: 3,
            max_failures_per_address: 20,
            window: Duration::minutes(10),
            lock_duration: Duration::minutes(30),
        }
    }
}

impl LockoutPolicy {
    pub fn builder() -> LockoutPolicyBuilder {
        LockoutPolicyBuilder::default()
    }

    /// Check the policy at load time.
    ///
    /// Non-positive values are accepted but logged: a zero threshold denies
    /// every attempt for that key, and a non-positive window means no failure
    /// is ever inside it.
    pub fn validate(&self) {
        if self.max_failures_per_identifier == 0 {
            tracing::warn!(
                "max_failures_per_identifier is 0, every identifier-scoped check will deny"
            );
        }
        if self.max_failures_per_address == 0 {
            tracing::warn!("max_failures_per_address is 0, every address-scoped check will deny");
        }
        if self.window <= Duration::zero() {
            tracing::warn!(window = %self.window, "window is not positive, no failures will be counted");
        }
        if self.lock_duration <= Duration::zero() {
            tracing::warn!(lock_duration = %self.lock_duration, "lock_duration is not positive, locks expire immediately");
        }
    }
}

#[derive(Debug, Default)]
pub struct LockoutPolicyBuilder {
    max_failures_per_identifier: Option<u32>,
    max_failures_per_address: Option<u32>,
    window: Option<Duration>,
    lock_duration: Option<Duration>,
}

impl LockoutPolicyBuilder {
    pub fn max_failures_per_identifier(mut self, max: u32) -> Self {
        self.max_failures_per_identifier = Some(max);
        self
    }

    pub fn max_failures_per_address(mut self, max: u32) -> Self {
        self.max_failures_per_address = Some(max);
        self
    }

    pub fn window(mut self, window: Duration) -> Self {
        self.window = Some(window);
        self
    }

    pub fn lock_duration(mut self, lock_duration: Duration) -> Self {
        self.lock_duration = Some(lock_duration);
        self
    }

    pub fn build(self) -> LockoutPolicy {
        let defaults = LockoutPolicy::default();
        let policy = LockoutPolicy {
            max_failures_per_identifier: self
                .max_failures_per_identifier
                .unwrap_or(defaults.max_failures_per_identifier),
            max_failures_per_address: self
                .max_failures_per_address
                .unwrap_or(defaults.max_failures_per_address),
            window: self.window.unwrap_or(defaults.window),
            lock_duration: self.lock_duration.unwrap_or(defaults.lock_duration),
        };
        policy.validate();
        policy
    }
}
