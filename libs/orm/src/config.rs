//! Mapper configuration.

use serde::{Deserialize, Serialize};

use crate::row::LATEST_TIMESTAMP;

/// Timestamp given to single-version cells when a record becomes a [`Row`].
///
/// Mutations leave single-version cells unstamped regardless of this policy.
///
/// [`Row`]: crate::row::Row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampPolicy {
    /// Wall clock, milliseconds since the Unix epoch.
    #[default]
    Now,
    /// [`LATEST_TIMESTAMP`], the newest possible version.
    Latest,
    /// A caller-chosen timestamp, useful for reproducible output.
    Fixed(i64),
}

impl TimestampPolicy {
    pub fn resolve(&self) -> i64 {
        match self {
            TimestampPolicy::Now => now_millis(),
            TimestampPolicy::Latest => LATEST_TIMESTAMP,
            TimestampPolicy::Fixed(ts) => *ts,
        }
    }
}

fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Configuration of a [`Mapper`](crate::Mapper).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// How single-version cells are stamped by `to_row`.
    /// Default: `Now`
    pub single_version_timestamp: TimestampPolicy,
}

impl MapperConfig {
    pub fn with_single_version_timestamp(mut self, policy: TimestampPolicy) -> Self {
        self.single_version_timestamp = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stamps_with_wall_clock() {
        let config = MapperConfig::default();
        assert_eq!(config.single_version_timestamp, TimestampPolicy::Now);
        assert!(config.single_version_timestamp.resolve() > 0);
    }

    #[test]
    fn test_fixed_and_latest() {
        assert_eq!(TimestampPolicy::Fixed(42).resolve(), 42);
        assert_eq!(TimestampPolicy::Latest.resolve(), LATEST_TIMESTAMP);
        let config = MapperConfig::default().with_single_version_timestamp(TimestampPolicy::Fixed(7));
        assert_eq!(config.single_version_timestamp, TimestampPolicy::Fixed(7));
    }

    #[test]
    fn test_serde_defaults_missing_fields() {
        let config: MapperConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, MapperConfig::default());

        let config: MapperConfig =
            serde_json::from_str(r#"{"single_version_timestamp":{"fixed":1000}}"#).unwrap();
        assert_eq!(config.single_version_timestamp, TimestampPolicy::Fixed(1000));

        let json = serde_json::to_string(&MapperConfig::default().with_single_version_timestamp(TimestampPolicy::Latest))
            .unwrap();
        assert_eq!(json, r#"{"single_version_timestamp":"latest"}"#);
    }
}
