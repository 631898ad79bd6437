//! Per-window orchestration: the nine steps of §4.7 of the dispatch design —
//! snapshot the window, read the roster and intake, run the assignment
//! engine, commit results, credit active-hours, refit the guarantee
//! predictor, and persist the BatchRecord.

use crate::domain::{batch_id_for, BatchRecord};
use crate::error::DispatchError;
use crate::repository::Repository;
use assignment_engine::assign;
use chrono::{DateTime, Duration, Utc};
use cost_calculator::{CourierFacts, OrderFacts};
use guarantee_predictor::GuaranteePredictor;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

pub struct BatchProcessor {
    repository: Arc<dyn Repository>,
    predictor: Arc<Mutex<GuaranteePredictor>>,
    window_minutes: i64,
    agent_speed_kmph: f64,
    prep_time_minutes: f64,
    carry_forward_pending: bool,
}

impl BatchProcessor {
    pub fn new(
        repository: Arc<dyn Repository>,
        predictor: Arc<Mutex<GuaranteePredictor>>,
        window_minutes: u64,
        agent_speed_kmph: f64,
        prep_time_minutes: f64,
        carry_forward_pending: bool,
    ) -> Self {
        Self {
            repository,
            predictor,
            window_minutes: window_minutes as i64,
            agent_speed_kmph,
            prep_time_minutes,
            carry_forward_pending,
        }
    }

    /// Runs one batch tick for the window ending at `now`. Re-invoking with
    /// the same `now` (and thus the same derived `batch_id`) on an
    /// already-persisted window is a no-op: the existing BatchRecord is
    /// returned without re-running assignment.
    pub async fn process_batch(&self, now: DateTime<Utc>) -> Result<BatchRecord, DispatchError> {
        let window_start = now - Duration::minutes(self.window_minutes);
        let batch_id = batch_id_for(window_start);

        if let Some(existing) = self.repository.batch_record(&batch_id).await? {
            info!(batch_id = %batch_id, "batch already processed, returning existing record");
            return Ok(existing);
        }

        let intake_lower_bound = if self.carry_forward_pending {
            None
        } else {
            Some(window_start)
        };
        let pending = self.repository.pending_orders(intake_lower_bound, now).await?;
        let roster = self.repository.available_couriers().await?;

        if roster.is_empty() {
            let record = BatchRecord {
                batch_id: batch_id.clone(),
                window_start,
                window_end: now,
                total_orders: pending.len(),
                assigned_orders: 0,
                omega_used: self.predictor.lock().await.predict(),
            };
            self.repository.add_batch_record(record.clone()).await?;
            return Ok(record);
        }

        let roster_ids: Vec<String> = roster.iter().map(|c| c.id.clone()).collect();
        let window_hours = self.window_minutes as f64 / 60.0;
        self.repository
            .bulk_add_active_hours(&roster_ids, window_hours)
            .await?;

        if pending.is_empty() {
            let omega_used = self.predictor.lock().await.predict();
            let total_active: f64 = self.accumulate_roster_active_hours(&roster_ids).await?;
            let total_work: f64 = roster.iter().map(|c| c.work_hours).sum();
            self.predictor.lock().await.update(total_work, total_active);

            let record = BatchRecord {
                batch_id: batch_id.clone(),
                window_start,
                window_end: now,
                total_orders: 0,
                assigned_orders: 0,
                omega_used,
            };
            self.repository.add_batch_record(record.clone()).await?;
            return Ok(record);
        }

        let omega = self.predictor.lock().await.predict();

        let courier_facts: Vec<CourierFacts> = roster
            .iter()
            .map(|c| CourierFacts {
                location: c.location,
                speed_kmph: c.speed_kmph.unwrap_or(self.agent_speed_kmph),
                work_hours: c.work_hours,
                active_hours: c.active_hours,
            })
            .collect();
        let order_facts: Vec<OrderFacts> = pending
            .iter()
            .map(|o| OrderFacts {
                pickup: o.pickup,
                dropoff: o.dropoff,
            })
            .collect();

        let pairs = assign(&courier_facts, &order_facts, omega, self.prep_time_minutes);

        let mut assigned_orders = 0usize;
        for pair in &pairs {
            let courier = &roster[pair.courier_index];
            let order = &pending[pair.order_index];
            match self
                .repository
                .commit_assignment(
                    &order.id,
                    &courier.id,
                    &batch_id,
                    now,
                    pair.estimated_work_hours,
                    pair.cost,
                )
                .await
            {
                Ok(()) => assigned_orders += 1,
                Err(DispatchError::ConcurrencyConflict { entity, id }) => {
                    warn!(entity, id, batch_id = %batch_id, "skipping conflicted pair in this tick");
                }
                Err(other) => return Err(other),
            }
        }

        let total_active: f64 = self.accumulate_roster_active_hours(&roster_ids).await?;
        let total_work: f64 = {
            let mut sum = 0.0;
            for id in &roster_ids {
                if let Some(c) = self.repository.courier(id).await? {
                    sum += c.work_hours;
                }
            }
            sum
        };
        self.predictor.lock().await.update(total_work, total_active);

        let record = BatchRecord {
            batch_id: batch_id.clone(),
            window_start,
            window_end: now,
            total_orders: pending.len(),
            assigned_orders,
            omega_used: omega,
        };
        self.repository.add_batch_record(record.clone()).await?;
        info!(
            batch_id = %batch_id,
            total_orders = record.total_orders,
            assigned_orders = record.assigned_orders,
            omega_used = record.omega_used,
            "batch tick complete"
        );
        Ok(record)
    }

    async fn accumulate_roster_active_hours(&self, roster_ids: &[String]) -> Result<f64, DispatchError> {
        let mut total = 0.0;
        for id in roster_ids {
            if let Some(c) = self.repository.courier(id).await? {
                total += c.active_hours;
            }
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Courier, Order};
    use crate::repository::InMemoryRepository;
    use geokit::LatLon;
    use guarantee_predictor::PredictorConfig;

    fn processor(repo: Arc<dyn Repository>) -> BatchProcessor {
        let predictor = Arc::new(Mutex::new(GuaranteePredictor::new(PredictorConfig::default()).unwrap()));
        BatchProcessor::new(repo, predictor, 3, 25.0, 8.0, false)
    }

    #[tokio::test]
    async fn empty_roster_produces_zeroed_record_with_no_active_hours_credited() {
        let repo: Arc<dyn Repository> = Arc::new(InMemoryRepository::new());
        let proc = processor(repo.clone());
        let now = Utc::now();
        let record = proc.process_batch(now).await.unwrap();
        assert_eq!(record.total_orders, 0);
        assert_eq!(record.assigned_orders, 0);
    }

    #[tokio::test]
    async fn empty_orders_still_credits_active_hours_and_updates_predictor() {
        let repo: Arc<dyn Repository> = Arc::new(InMemoryRepository::new());
        repo.insert_courier(Courier::new("c1", LatLon::new(0.0, 0.0)))
            .await
            .unwrap();
        let proc = processor(repo.clone());
        let now = Utc::now();
        let record = proc.process_batch(now).await.unwrap();
        assert_eq!(record.assigned_orders, 0);
        let courier = repo.courier("c1").await.unwrap().unwrap();
        assert!(courier.active_hours > 0.0);
    }

    #[tokio::test]
    async fn reprocessing_same_window_returns_existing_record_without_double_assigning() {
        let repo: Arc<dyn Repository> = Arc::new(InMemoryRepository::new());
        repo.insert_courier(Courier::new("c1", LatLon::new(0.0, 0.0)))
            .await
            .unwrap();
        repo.insert_order(Order::new(
            "o1",
            LatLon::new(0.0, 0.0),
            LatLon::new(0.01, 0.01),
            Utc::now() - Duration::minutes(1),
        ))
        .await
        .unwrap();
        let proc = processor(repo.clone());
        let now = Utc::now();
        let first = proc.process_batch(now).await.unwrap();
        let second = proc.process_batch(now).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.assigned_orders, 1);
    }

    #[tokio::test]
    async fn more_orders_than_couriers_assigns_only_up_to_courier_count() {
        let repo: Arc<dyn Repository> = Arc::new(InMemoryRepository::new());
        repo.insert_courier(Courier::new("c1", LatLon::new(0.0, 0.0)))
            .await
            .unwrap();
        let created = Utc::now() - Duration::minutes(1);
        for i in 0..3 {
            repo.insert_order(Order::new(
                format!("o{i}"),
                LatLon::new(0.0, 0.0),
                LatLon::new(0.01, 0.01),
                created,
            ))
            .await
            .unwrap();
        }
        let proc = processor(repo.clone());
        let record = proc.process_batch(Utc::now()).await.unwrap();
        assert_eq!(record.total_orders, 3);
        assert_eq!(record.assigned_orders, 1);
    }
}
