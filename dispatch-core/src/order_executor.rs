//! Courier-facing lifecycle transitions: accept, pickup, deliver.
//!
//! Each operation first reads the order and checks its precondition
//! in-process; a failed precondition is returned as `(false, reason)`
//! without ever reaching the repository's compare-and-swap. If the
//! precondition holds at read time but the repository's CAS write still
//! fails (the order moved on between the read and the write), that is a
//! genuine race and is surfaced as `DispatchError::ConcurrencyConflict`
//! rather than folded into the boolean result.

use crate::domain::{CourierStatus, OrderStatus};
use crate::error::DispatchError;
use crate::repository::{CourierDelta, Repository};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

pub struct OrderExecutor {
    repository: Arc<dyn Repository>,
    pay_per_hour: f64,
}

impl OrderExecutor {
    pub fn new(repository: Arc<dyn Repository>, pay_per_hour: f64) -> Self {
        Self {
            repository,
            pay_per_hour,
        }
    }

    /// Acknowledges an assignment. The order remains `Assigned` until
    /// pickup; this is a precondition check with no further state mutation.
    pub async fn accept(&self, order_id: &str, courier_id: &str) -> Result<(bool, Option<String>), DispatchError> {
        let Some(order) = self.repository.order(order_id).await? else {
            return Ok((false, Some("order not found".into())));
        };
        if order.status != OrderStatus::Assigned {
            return Ok((false, Some(format!("order is {:?}, not assigned", order.status))));
        }
        if order.assigned_courier_id.as_deref() != Some(courier_id) {
            return Ok((false, Some("order assigned to a different courier".into())));
        }
        Ok((true, None))
    }

    pub async fn pickup(
        &self,
        order_id: &str,
        courier_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(bool, Option<String>), DispatchError> {
        let Some(order) = self.repository.order(order_id).await? else {
            return Ok((false, Some("order not found".into())));
        };
        if order.status != OrderStatus::Assigned {
            return Ok((false, Some(format!("order is {:?}, not assigned", order.status))));
        }
        if order.assigned_courier_id.as_deref() != Some(courier_id) {
            return Ok((false, Some("order assigned to a different courier".into())));
        }

        self.repository
            .apply_lifecycle(
                order_id,
                courier_id,
                OrderStatus::Assigned,
                OrderStatus::PickedUp,
                now,
                None,
                Some(CourierDelta {
                    work_hours_delta: 0.0,
                    earnings_delta: 0.0,
                    new_status: CourierStatus::Delivering,
                }),
            )
            .await?;
        info!(order_id, courier_id, "order picked up");
        Ok((true, None))
    }

    pub async fn deliver(
        &self,
        order_id: &str,
        courier_id: &str,
        actual_work_hours: f64,
        now: DateTime<Utc>,
    ) -> Result<(bool, Option<String>), DispatchError> {
        let Some(order) = self.repository.order(order_id).await? else {
            return Ok((false, Some("order not found".into())));
        };
        if order.status != OrderStatus::PickedUp {
            return Ok((false, Some(format!("order is {:?}, not picked up", order.status))));
        }
        if order.assigned_courier_id.as_deref() != Some(courier_id) {
            return Ok((false, Some("order assigned to a different courier".into())));
        }

        self.repository
            .apply_lifecycle(
                order_id,
                courier_id,
                OrderStatus::PickedUp,
                OrderStatus::Delivered,
                now,
                Some(actual_work_hours),
                Some(CourierDelta {
                    work_hours_delta: actual_work_hours,
                    earnings_delta: self.pay_per_hour * actual_work_hours,
                    new_status: CourierStatus::Available,
                }),
            )
            .await?;
        info!(order_id, courier_id, actual_work_hours, "order delivered");
        Ok((true, None))
    }
}
