//! Courier, Order and BatchRecord: the plain value structs the rest of the
//! crate reads and mutates through the [`crate::repository::Repository`]
//! trait. None of these types carry logic of their own beyond small status
//! predicates; the state machines live in `batch_processor` and
//! `order_executor`.

use chrono::{DateTime, Utc};
use geokit::LatLon;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum CourierStatus {
    Available,
    EnRoute,
    Delivering,
    Offline,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Courier {
    pub id: String,
    pub location: LatLon,
    pub status: CourierStatus,
    pub work_hours: f64,
    pub active_hours: f64,
    pub earnings: f64,
    pub handout: f64,
    /// Authoritative over `DispatchConfig::agent_speed_kmph` when present.
    pub speed_kmph: Option<f64>,
}

impl Courier {
    pub fn new(id: impl Into<String>, location: LatLon) -> Self {
        Self {
            id: id.into(),
            location,
            status: CourierStatus::Available,
            work_hours: 0.0,
            active_hours: 0.0,
            earnings: 0.0,
            handout: 0.0,
            speed_kmph: None,
        }
    }

    pub fn total_pay(&self) -> f64 {
        self.earnings + self.handout
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Assigned,
    PickedUp,
    Delivered,
    Cancelled,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub pickup: LatLon,
    pub dropoff: LatLon,
    pub status: OrderStatus,
    pub assigned_courier_id: Option<String>,
    pub batch_id: Option<String>,
    pub estimated_work_hours: Option<f64>,
    pub actual_work_hours: Option<f64>,
    pub assignment_cost: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub picked_up_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn new(id: impl Into<String>, pickup: LatLon, dropoff: LatLon, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            pickup,
            dropoff,
            status: OrderStatus::Pending,
            assigned_courier_id: None,
            batch_id: None,
            estimated_work_hours: None,
            actual_work_hours: None,
            assignment_cost: None,
            created_at,
            assigned_at: None,
            picked_up_at: None,
            delivered_at: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchRecord {
    pub batch_id: String,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub total_orders: usize,
    pub assigned_orders: usize,
    pub omega_used: f64,
}

/// Derives the `batch_` + window-start identifier used as a BatchRecord's
/// primary key and as the value stamped on every order it touches.
pub fn batch_id_for(window_start: DateTime<Utc>) -> String {
    format!("batch_{}", window_start.format("%Y%m%dT%H%M%SZ"))
}
