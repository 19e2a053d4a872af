// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Cadence.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use cadence_core::RequestCategory;
use serde::{Deserialize, Serialize};

/// Top-level Cadence configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CadenceConfig {
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,

    /// Inter-request delay shaping.
    #[serde(default)]
    pub pacer: PacerConfig,

    /// Per-category sliding-window request caps.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Location update smoothing.
    #[serde(default)]
    pub location: LocationConfig,

    /// Keep-alive interval jitter.
    #[serde(default)]
    pub heartbeat: HeartbeatConfig,

    /// Simulated typing speed.
    #[serde(default)]
    pub typing: TypingConfig,

    /// User-Agent header variation.
    #[serde(default)]
    pub user_agent: UserAgentConfig,

    /// Event store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Recording, reporting and retention settings.
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Request pacing configuration.
///
/// Each request waits until `base_delay_ms + jitter` has elapsed since the
/// previous one. Repeating the same category draws jitter from the wider
/// `repeat_extra_ms` band.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PacerConfig {
    /// Minimum spacing between requests, in milliseconds.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Upper bound of the extra jitter when the category repeats.
    #[serde(default = "default_repeat_extra_ms")]
    pub repeat_extra_ms: u64,

    /// Upper bound of the extra jitter when the category changes.
    #[serde(default = "default_switch_extra_ms")]
    pub switch_extra_ms: u64,
}

impl Default for PacerConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay_ms(),
            repeat_extra_ms: default_repeat_extra_ms(),
            switch_extra_ms: default_switch_extra_ms(),
        }
    }
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_repeat_extra_ms() -> u64 {
    2000
}

fn default_switch_extra_ms() -> u64 {
    1500
}

/// Sliding-window rate limit configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitConfig {
    /// Length of the trailing window, in seconds.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Admissions allowed per window, per category.
    #[serde(default)]
    pub caps: CategoryCaps,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            caps: CategoryCaps::default(),
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

fn default_window_secs() -> u64 {
    60
}

/// Admissions allowed per window for each request category.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryCaps {
    #[serde(default = "default_profile_fetch_cap")]
    pub profile_fetch: u32,
    #[serde(default = "default_chat_cap")]
    pub chat: u32,
    #[serde(default = "default_media_cap")]
    pub media: u32,
    #[serde(default = "default_location_cap")]
    pub location: u32,
    #[serde(default = "default_search_cap")]
    pub search: u32,
    #[serde(default = "default_generic_cap")]
    pub favorites: u32,
    #[serde(default = "default_generic_cap")]
    pub blocks: u32,
    #[serde(default = "default_generic_cap")]
    pub other: u32,
}

impl Default for CategoryCaps {
    fn default() -> Self {
        Self {
            profile_fetch: default_profile_fetch_cap(),
            chat: default_chat_cap(),
            media: default_media_cap(),
            location: default_location_cap(),
            search: default_search_cap(),
            favorites: default_generic_cap(),
            blocks: default_generic_cap(),
            other: default_generic_cap(),
        }
    }
}

impl CategoryCaps {
    /// Cap configured for `category`.
    pub fn cap(&self, category: RequestCategory) -> u32 {
        match category {
            RequestCategory::ProfileFetch => self.profile_fetch,
            RequestCategory::Chat => self.chat,
            RequestCategory::Media => self.media,
            RequestCategory::Location => self.location,
            RequestCategory::Search => self.search,
            RequestCategory::Favorites => self.favorites,
            RequestCategory::Blocks => self.blocks,
            RequestCategory::Other => self.other,
        }
    }

    /// Override the cap for a single category.
    pub fn with(mut self, category: RequestCategory, cap: u32) -> Self {
        let slot = match category {
            RequestCategory::ProfileFetch => &mut self.profile_fetch,
            RequestCategory::Chat => &mut self.chat,
            RequestCategory::Media => &mut self.media,
            RequestCategory::Location => &mut self.location,
            RequestCategory::Search => &mut self.search,
            RequestCategory::Favorites => &mut self.favorites,
            RequestCategory::Blocks => &mut self.blocks,
            RequestCategory::Other => &mut self.other,
        };
        *slot = cap;
        self
    }
}

fn default_profile_fetch_cap() -> u32 {
    60
}

fn default_chat_cap() -> u32 {
    100
}

fn default_media_cap() -> u32 {
    50
}

fn default_location_cap() -> u32 {
    30
}

fn default_search_cap() -> u32 {
    40
}

fn default_generic_cap() -> u32 {
    100
}

/// Location smoothing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LocationConfig {
    /// Shortest gap required between accepted updates, in seconds.
    #[serde(default = "default_location_min_interval_secs")]
    pub min_interval_secs: u64,

    /// Longest gap that may be required between accepted updates, in seconds.
    #[serde(default = "default_location_max_interval_secs")]
    pub max_interval_secs: u64,

    /// Smallest fraction of the remaining distance covered per accepted update.
    #[serde(default = "default_min_step_fraction")]
    pub min_step_fraction: f64,

    /// Largest fraction of the remaining distance covered per accepted update.
    #[serde(default = "default_max_step_fraction")]
    pub max_step_fraction: f64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            min_interval_secs: default_location_min_interval_secs(),
            max_interval_secs: default_location_max_interval_secs(),
            min_step_fraction: default_min_step_fraction(),
            max_step_fraction: default_max_step_fraction(),
        }
    }
}

fn default_location_min_interval_secs() -> u64 {
    30
}

fn default_location_max_interval_secs() -> u64 {
    180
}

fn default_min_step_fraction() -> f64 {
    0.3
}

fn default_max_step_fraction() -> f64 {
    0.7
}

/// Keep-alive heartbeat configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HeartbeatConfig {
    #[serde(default = "default_heartbeat_min_secs")]
    pub min_interval_secs: u64,

    #[serde(default = "default_heartbeat_max_secs")]
    pub max_interval_secs: u64,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            min_interval_secs: default_heartbeat_min_secs(),
            max_interval_secs: default_heartbeat_max_secs(),
        }
    }
}

fn default_heartbeat_min_secs() -> u64 {
    45
}

fn default_heartbeat_max_secs() -> u64 {
    90
}

/// Simulated typing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TypingConfig {
    /// Mean time per typed character (200 ms is roughly 40 WPM).
    #[serde(default = "default_ms_per_char")]
    pub ms_per_char: u64,

    /// Symmetric jitter applied to the total, as a fraction (0.2 = ±20%).
    #[serde(default = "default_typing_jitter")]
    pub jitter_fraction: f64,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            ms_per_char: default_ms_per_char(),
            jitter_fraction: default_typing_jitter(),
        }
    }
}

fn default_ms_per_char() -> u64 {
    200
}

fn default_typing_jitter() -> f64 {
    0.2
}

/// User-Agent variation configuration.
///
/// Each outgoing request keeps the client's own User-Agent, except that with
/// probability `variant_probability` the `variant_suffix` is appended.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UserAgentConfig {
    /// Text appended to produce the variant.
    #[serde(default = "default_variant_suffix")]
    pub variant_suffix: String,

    /// Chance, within [0, 1], that a request carries the variant.
    #[serde(default = "default_variant_probability")]
    pub variant_probability: f64,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            variant_suffix: default_variant_suffix(),
            variant_probability: default_variant_probability(),
        }
    }
}

fn default_variant_suffix() -> String {
    " (slight variant)".to_string()
}

fn default_variant_probability() -> f64 {
    1.0 / 3.0
}

/// Event store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("cadence").join("cadence.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("cadence.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Analytics configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnalyticsConfig {
    /// Events older than this many days are removed by the retention sweep.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Seconds between scheduled retention sweeps.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Best-effort time budget for a single report query.
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,

    /// Pending writes the recorder buffers before dropping new events.
    #[serde(default = "default_recorder_queue_capacity")]
    pub recorder_queue_capacity: usize,

    /// Number of recent views included in a views report.
    #[serde(default = "default_recent_sample_size")]
    pub recent_sample_size: usize,

    /// Fixed UTC offset for day boundaries. `None` uses the host time zone.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
            sweep_interval_secs: default_sweep_interval_secs(),
            query_timeout_secs: default_query_timeout_secs(),
            recorder_queue_capacity: default_recorder_queue_capacity(),
            recent_sample_size: default_recent_sample_size(),
            utc_offset_minutes: None,
        }
    }
}

impl AnalyticsConfig {
    pub fn retention(&self) -> Duration {
        Duration::from_secs(u64::from(self.retention_days) * 86_400)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

fn default_retention_days() -> u32 {
    90
}

fn default_sweep_interval_secs() -> u64 {
    3600
}

fn default_query_timeout_secs() -> u64 {
    10
}

fn default_recorder_queue_capacity() -> usize {
    1024
}

fn default_recent_sample_size() -> usize {
    20
}
