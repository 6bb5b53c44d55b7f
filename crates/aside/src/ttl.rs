// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! TTL resolution: per-call overrides over process-wide defaults.

use std::time::Duration;

use crate::directive::CacheDirective;

/// Marker for "no per-call override"; the process-wide default applies.
pub const TTL_UNSET: i64 = -1;

/// Resolves an effective TTL in seconds.
///
/// The override wins unless it is negative (unset), in which case the default
/// applies. Applied independently for normal and empty-marker TTLs.
///
/// # Examples
///
/// ```
/// use aside::ttl;
///
/// assert_eq!(ttl::resolve(ttl::TTL_UNSET, 1800), 1800);
/// assert_eq!(ttl::resolve(60, 1800), 60);
/// ```
#[must_use]
pub fn resolve(override_seconds: i64, default_seconds: u64) -> u64 {
    u64::try_from(override_seconds).unwrap_or(default_seconds)
}

/// Process-wide default TTLs, set once at engine construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TtlConfig {
    /// Default TTL for normal values, in seconds.
    pub expire_seconds: u64,
    /// Default TTL for empty-marker sentinels, in seconds.
    pub empty_expire_seconds: u64,
}

impl Default for TtlConfig {
    fn default() -> Self {
        Self {
            expire_seconds: 1800,
            empty_expire_seconds: 300,
        }
    }
}

impl TtlConfig {
    /// Creates a config with explicit defaults.
    #[must_use]
    pub fn new(expire_seconds: u64, empty_expire_seconds: u64) -> Self {
        Self {
            expire_seconds,
            empty_expire_seconds,
        }
    }

    /// The effective normal-value TTL for a directive.
    #[must_use]
    pub fn expire_for(&self, directive: &CacheDirective) -> Duration {
        Duration::from_secs(resolve(directive.expire_seconds, self.expire_seconds))
    }

    /// The effective empty-marker TTL for a directive.
    #[must_use]
    pub fn empty_expire_for(&self, directive: &CacheDirective) -> Duration {
        Duration::from_secs(resolve(directive.empty_expire_seconds, self.empty_expire_seconds))
    }
}
