//! Background frequency recomputation
//!
//! Periodically re-runs the watering estimator over every stored plant so that
//! stored intervals follow catalog edits and plant aging (the age adjustment
//! kicks in without any user action once a plant passes two years).

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info};

use crate::state::AppState;

/// Periodic sweeper over all plants
pub struct FrequencySweeper {
    /// Seconds between sweeps
    interval_secs: u64,
}

impl FrequencySweeper {
    pub fn new(interval_secs: u64) -> Self {
        info!(interval_secs, "Initializing frequency sweeper");
        Self { interval_secs }
    }

    /// Run one sweep; returns how many plants changed
    pub async fn sweep(&self, state: &Arc<RwLock<AppState>>) -> usize {
        let mut app_state = state.write().await;
        let changed = app_state.recompute_all(Utc::now());

        if changed > 0 {
            info!(
                changed,
                plants = app_state.plant_count(),
                "Watering frequencies refreshed"
            );
        } else {
            debug!(plants = app_state.plant_count(), "Sweep found no changes");
        }

        changed
    }

    /// Run the sweeper continuously
    pub async fn run(self, state: Arc<RwLock<AppState>>) {
        info!("Starting frequency recomputation loop");

        let mut ticker = interval(Duration::from_secs(self.interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.sweep(&state).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BaseNeed, CatalogEntryInput, PlantInput};

    #[test]
    fn test_sweeper_creation() {
        let sweeper = FrequencySweeper::new(60);
        assert_eq!(sweeper.interval_secs, 60);
    }

    #[tokio::test]
    async fn test_sweep_refreshes_stale_frequency() {
        let state = Arc::new(RwLock::new(AppState::new()));
        let plant_id = {
            let mut s = state.write().await;
            let entry = s.add_catalog_entry(CatalogEntryInput {
                common_name: "Peace lily".to_string(),
                scientific_name: None,
                water_needed: BaseNeed::High,
            });
            let input = PlantInput {
                name: "Lily".to_string(),
                catalog_id: Some(entry.id),
                ..Default::default()
            };
            s.add_plant(input, Utc::now()).unwrap().id
        };

        let sweeper = FrequencySweeper::new(3600);
        assert_eq!(sweeper.sweep(&state).await, 0);

        let s = state.read().await;
        assert_eq!(s.get_plant(plant_id).unwrap().watering_frequency_days, 3);
    }

    #[tokio::test]
    async fn test_run_loop_sweeps_immediately() {
        use tokio::time::timeout;

        let state = Arc::new(RwLock::new(AppState::new()));
        {
            let mut s = state.write().await;
            s.add_plant(
                PlantInput {
                    name: "Cactus".to_string(),
                    ..Default::default()
                },
                Utc::now(),
            )
            .unwrap();
        }

        let state_clone = state.clone();
        let handle = tokio::spawn(async move {
            FrequencySweeper::new(3600).run(state_clone).await;
        });

        // First tick completes immediately; the lock must become free again
        let result = timeout(std::time::Duration::from_millis(500), async {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            state.read().await.plant_count()
        })
        .await
        .expect("Timeout waiting for sweeper");

        assert_eq!(result, 1);
        handle.abort();
    }
}
