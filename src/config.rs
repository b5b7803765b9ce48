//! Engine configuration
//!
//! Tuning knobs with sensible defaults, deserializable from whatever
//! config source the host application uses.

use serde::Deserialize;

use crate::costing::Cost;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IsochroneConfig {
    /// Number of main buckets in the priority queue.
    pub bucket_count: u32,
    /// Label store capacity reserved up front.
    pub initial_label_count: usize,
    /// Weighted-cost penalty for switching transit operators at a
    /// transfer.
    pub operator_change_penalty: f32,
    /// Cost applied when the travel mode changes (boarding, alighting).
    /// Zero by default: the wait for the departure is the cost.
    pub mode_change_cost: Cost,
    /// Cap on cumulative walking meters between transit boardings.
    pub max_transfer_distance: f32,
    /// In-station transfer slack: if the pending departure leaves within
    /// this many seconds, the lookup retries this much later.
    pub in_station_retry_secs: u32,
}

impl Default for IsochroneConfig {
    fn default() -> Self {
        Self {
            bucket_count: 20_000,
            initial_label_count: 500_000,
            operator_change_penalty: 300.0,
            mode_change_cost: Cost::default(),
            max_transfer_distance: 99_999.0,
            in_station_retry_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IsochroneConfig::default();
        assert_eq!(config.bucket_count, 20_000);
        assert_eq!(config.operator_change_penalty, 300.0);
        assert_eq!(config.max_transfer_distance, 99_999.0);
        assert_eq!(config.mode_change_cost, Cost::default());
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let config: IsochroneConfig =
            serde_json::from_str(r#"{"operator_change_penalty": 120.0}"#).unwrap();
        assert_eq!(config.operator_change_penalty, 120.0);
        assert_eq!(config.bucket_count, 20_000);
    }
}
