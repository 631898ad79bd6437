//! The persistence boundary.
//!
//! `Repository` is narrow and entity-grained on purpose: every write names
//! the expected prior state and the repository is responsible for rejecting
//! it with [`DispatchError::ConcurrencyConflict`] if that expectation no
//! longer holds, the same discipline a `sled::Tree::compare_and_swap`-backed
//! store would enforce. [`InMemoryRepository`] is the reference
//! implementation: per-entity `Mutex`-guarded tables good enough for tests
//! and the bundled `cli`, not a production deployment target.

use crate::domain::{BatchRecord, Courier, CourierStatus, Order, OrderStatus};
use crate::error::DispatchError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// The courier-side effect of a lifecycle transition, applied atomically
/// with the order's own status change.
#[derive(Clone, Copy, Debug)]
pub struct CourierDelta {
    pub work_hours_delta: f64,
    pub earnings_delta: f64,
    pub new_status: CourierStatus,
}

#[async_trait]
pub trait Repository: Send + Sync {
    async fn pending_orders(
        &self,
        window_start: Option<DateTime<Utc>>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<Order>, DispatchError>;

    async fn available_couriers(&self) -> Result<Vec<Courier>, DispatchError>;

    /// All couriers regardless of status, used by `payment_finalizer`.
    async fn all_couriers(&self) -> Result<Vec<Courier>, DispatchError>;

    async fn courier(&self, id: &str) -> Result<Option<Courier>, DispatchError>;

    async fn order(&self, id: &str) -> Result<Option<Order>, DispatchError>;

    async fn insert_courier(&self, courier: Courier) -> Result<(), DispatchError>;

    async fn insert_order(&self, order: Order) -> Result<(), DispatchError>;

    /// Commits one (courier, order) assignment pair from a batch tick.
    ///
    /// Idempotent: if the order is already `Assigned` to the same
    /// `batch_id`, this is a no-op success (a re-run of the same tick).
    /// If assigned under a *different* `batch_id`, or in any status other
    /// than `Pending`, returns `ConcurrencyConflict`.
    async fn commit_assignment(
        &self,
        order_id: &str,
        courier_id: &str,
        batch_id: &str,
        now: DateTime<Utc>,
        estimated_work_hours: f64,
        cost: f64,
    ) -> Result<(), DispatchError>;

    /// Applies a courier lifecycle transition (pickup or deliver) to an
    /// order, compare-and-swapping on `expected_status` and the assigned
    /// courier. `actual_work_hours` is set only when `new_status` is
    /// `Delivered`. Returns `ConcurrencyConflict` if the order has moved on
    /// from `expected_status` since the caller last read it.
    #[allow(clippy::too_many_arguments)]
    async fn apply_lifecycle(
        &self,
        order_id: &str,
        courier_id: &str,
        expected_status: OrderStatus,
        new_status: OrderStatus,
        now: DateTime<Utc>,
        actual_work_hours: Option<f64>,
        courier_delta: Option<CourierDelta>,
    ) -> Result<(), DispatchError>;

    /// Inserts a BatchRecord. Returns `Ok(false)` without error if a record
    /// for this `batch_id` already exists (re-invocation of the same tick).
    async fn add_batch_record(&self, record: BatchRecord) -> Result<bool, DispatchError>;

    async fn batch_record(&self, batch_id: &str) -> Result<Option<BatchRecord>, DispatchError>;

    /// Adds `hours_per_courier` to `active_hours` for every named courier.
    async fn bulk_add_active_hours(
        &self,
        courier_ids: &[String],
        hours_per_courier: f64,
    ) -> Result<(), DispatchError>;
}

#[derive(Default)]
struct Tables {
    couriers: HashMap<String, Courier>,
    orders: HashMap<String, Order>,
    batch_records: HashMap<String, BatchRecord>,
}

/// Reference in-memory `Repository`, guarded by a single mutex over all
/// three tables. A production deployment swaps this for a durable
/// implementation (Postgres, sled) behind the same trait; the lock
/// granularity here favors straightforward correctness over throughput.
pub struct InMemoryRepository {
    tables: Mutex<Tables>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn pending_orders(
        &self,
        window_start: Option<DateTime<Utc>>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<Order>, DispatchError> {
        let tables = self.lock();
        Ok(tables
            .orders
            .values()
            .filter(|o| o.status == OrderStatus::Pending)
            .filter(|o| window_start.map_or(true, |start| o.created_at >= start))
            .filter(|o| o.created_at < window_end)
            .cloned()
            .collect())
    }

    async fn available_couriers(&self) -> Result<Vec<Courier>, DispatchError> {
        let tables = self.lock();
        Ok(tables
            .couriers
            .values()
            .filter(|c| c.status == CourierStatus::Available)
            .cloned()
            .collect())
    }

    async fn all_couriers(&self) -> Result<Vec<Courier>, DispatchError> {
        let tables = self.lock();
        Ok(tables.couriers.values().cloned().collect())
    }

    async fn courier(&self, id: &str) -> Result<Option<Courier>, DispatchError> {
        Ok(self.lock().couriers.get(id).cloned())
    }

    async fn order(&self, id: &str) -> Result<Option<Order>, DispatchError> {
        Ok(self.lock().orders.get(id).cloned())
    }

    async fn insert_courier(&self, courier: Courier) -> Result<(), DispatchError> {
        self.lock().couriers.insert(courier.id.clone(), courier);
        Ok(())
    }

    async fn insert_order(&self, order: Order) -> Result<(), DispatchError> {
        self.lock().orders.insert(order.id.clone(), order);
        Ok(())
    }

    async fn commit_assignment(
        &self,
        order_id: &str,
        courier_id: &str,
        batch_id: &str,
        now: DateTime<Utc>,
        estimated_work_hours: f64,
        cost: f64,
    ) -> Result<(), DispatchError> {
        let mut tables = self.lock();
        let order = tables
            .orders
            .get(order_id)
            .ok_or_else(|| DispatchError::ConcurrencyConflict {
                entity: "order",
                id: order_id.to_string(),
            })?
            .clone();

        match (order.status, &order.batch_id) {
            (OrderStatus::Pending, _) => {}
            (OrderStatus::Assigned, Some(existing)) if existing == batch_id => {
                return Ok(());
            }
            _ => {
                return Err(DispatchError::ConcurrencyConflict {
                    entity: "order",
                    id: order_id.to_string(),
                })
            }
        }

        let courier = tables
            .couriers
            .get(courier_id)
            .ok_or_else(|| DispatchError::ConcurrencyConflict {
                entity: "courier",
                id: courier_id.to_string(),
            })?
            .clone();
        if courier.status != CourierStatus::Available {
            return Err(DispatchError::ConcurrencyConflict {
                entity: "courier",
                id: courier_id.to_string(),
            });
        }

        let order = tables.orders.get_mut(order_id).unwrap();
        order.status = OrderStatus::Assigned;
        order.assigned_courier_id = Some(courier_id.to_string());
        order.batch_id = Some(batch_id.to_string());
        order.assigned_at = Some(now);
        order.estimated_work_hours = Some(estimated_work_hours);
        order.assignment_cost = Some(cost);

        let courier = tables.couriers.get_mut(courier_id).unwrap();
        courier.status = CourierStatus::EnRoute;

        Ok(())
    }

    async fn apply_lifecycle(
        &self,
        order_id: &str,
        courier_id: &str,
        expected_status: OrderStatus,
        new_status: OrderStatus,
        now: DateTime<Utc>,
        actual_work_hours: Option<f64>,
        courier_delta: Option<CourierDelta>,
    ) -> Result<(), DispatchError> {
        let mut tables = self.lock();
        let order = tables
            .orders
            .get(order_id)
            .ok_or_else(|| DispatchError::ConcurrencyConflict {
                entity: "order",
                id: order_id.to_string(),
            })?;
        if order.status != expected_status || order.assigned_courier_id.as_deref() != Some(courier_id)
        {
            return Err(DispatchError::ConcurrencyConflict {
                entity: "order",
                id: order_id.to_string(),
            });
        }

        let order = tables.orders.get_mut(order_id).unwrap();
        order.status = new_status;
        match new_status {
            OrderStatus::PickedUp => order.picked_up_at = Some(now),
            OrderStatus::Delivered => {
                order.delivered_at = Some(now);
                order.actual_work_hours = actual_work_hours;
            }
            _ => {}
        }

        if let Some(delta) = courier_delta {
            if let Some(courier) = tables.couriers.get_mut(courier_id) {
                courier.work_hours += delta.work_hours_delta;
                courier.earnings += delta.earnings_delta;
                courier.status = delta.new_status;
            }
        }

        Ok(())
    }

    async fn add_batch_record(&self, record: BatchRecord) -> Result<bool, DispatchError> {
        let mut tables = self.lock();
        if tables.batch_records.contains_key(&record.batch_id) {
            return Ok(false);
        }
        tables.batch_records.insert(record.batch_id.clone(), record);
        Ok(true)
    }

    async fn batch_record(&self, batch_id: &str) -> Result<Option<BatchRecord>, DispatchError> {
        Ok(self.lock().batch_records.get(batch_id).cloned())
    }

    async fn bulk_add_active_hours(
        &self,
        courier_ids: &[String],
        hours_per_courier: f64,
    ) -> Result<(), DispatchError> {
        let mut tables = self.lock();
        for id in courier_ids {
            if let Some(courier) = tables.couriers.get_mut(id) {
                courier.active_hours += hours_per_courier;
            }
        }
        Ok(())
    }
}
