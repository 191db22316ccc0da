use serde::{Deserialize, Serialize};

/// Server sessions stay valid for a long window, so a generous TTL avoids a
/// credentialed round trip on every request while still recovering from
/// server-side expiry within a bounded time.
pub const CACHE_DURATION_MS: u64 = 180 * 60 * 1000;

/// Memo of the last login outcome, persisted under the `loginCache` storage
/// key so it survives restarts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginCache {
    pub is_logged_in: bool,
    /// Unix epoch milliseconds of the last recorded attempt.
    pub timestamp: u64,
    pub cache_duration: u64,
}

impl Default for LoginCache {
    fn default() -> Self {
        Self {
            is_logged_in: false,
            timestamp: 0,
            cache_duration: CACHE_DURATION_MS,
        }
    }
}

impl LoginCache {
    pub fn is_valid(&self, now_ms: u64) -> bool {
        self.is_logged_in && now_ms.saturating_sub(self.timestamp) < self.cache_duration
    }

    pub fn record(&mut self, success: bool, now_ms: u64) {
        self.is_logged_in = success;
        self.timestamp = now_ms;
    }

    pub fn invalidate(&mut self) {
        self.is_logged_in = false;
        self.timestamp = 0;
    }
}
