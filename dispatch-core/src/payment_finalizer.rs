//! End-of-period handout and total-pay computation.
//!
//! Idempotent by construction: every field is recomputed from the
//! courier's current `(work_hours, active_hours, earnings)`, never
//! accumulated, so calling `finalize_payments` twice in a row with no
//! intervening lifecycle activity produces identical output.

use crate::error::DispatchError;
use crate::repository::Repository;
use guarantee_predictor::GuaranteePredictor;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CourierPayment {
    pub courier_id: String,
    pub work_hours: f64,
    pub active_hours: f64,
    pub earnings: f64,
    pub handout: f64,
    pub total_pay: f64,
    pub effective_wage: f64,
    pub min_wage_violation: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FinalizationSummary {
    pub omega_final: f64,
    pub couriers: usize,
    pub total_earnings: f64,
    pub total_handouts: f64,
    pub platform_cost: f64,
    pub violations: usize,
    pub payments: Vec<CourierPayment>,
}

pub struct PaymentFinalizer {
    repository: Arc<dyn Repository>,
    predictor: Arc<Mutex<GuaranteePredictor>>,
    pay_per_hour: f64,
    min_wage: f64,
}

impl PaymentFinalizer {
    pub fn new(
        repository: Arc<dyn Repository>,
        predictor: Arc<Mutex<GuaranteePredictor>>,
        pay_per_hour: f64,
        min_wage: f64,
    ) -> Self {
        Self {
            repository,
            predictor,
            pay_per_hour,
            min_wage,
        }
    }

    /// Computes handouts and total pay for every courier with `active_hours > 0`.
    /// Defaults `omega_final` to the predictor's current estimate.
    pub async fn finalize_payments(
        &self,
        omega_final: Option<f64>,
    ) -> Result<FinalizationSummary, DispatchError> {
        let omega = match omega_final {
            Some(o) => o,
            None => self.predictor.lock().await.predict(),
        };

        let couriers = self.repository.all_couriers().await?;
        let mut payments = Vec::new();
        let mut total_earnings = 0.0;
        let mut total_handouts = 0.0;
        let mut violations = 0;

        for courier in couriers.into_iter().filter(|c| c.active_hours > 0.0) {
            let guaranteed = omega * courier.active_hours;
            let shortfall = (guaranteed - courier.work_hours).max(0.0);
            let handout = self.pay_per_hour * shortfall;
            let total_pay = courier.earnings + handout;
            let effective_wage = total_pay / courier.active_hours;
            let min_wage_violation = effective_wage < self.min_wage;

            total_earnings += courier.earnings;
            total_handouts += handout;
            if min_wage_violation {
                violations += 1;
            }

            payments.push(CourierPayment {
                courier_id: courier.id,
                work_hours: courier.work_hours,
                active_hours: courier.active_hours,
                earnings: courier.earnings,
                handout,
                total_pay,
                effective_wage,
                min_wage_violation,
            });
        }

        payments.sort_by(|a, b| a.courier_id.cmp(&b.courier_id));

        Ok(FinalizationSummary {
            omega_final: omega,
            couriers: payments.len(),
            total_earnings,
            total_handouts,
            platform_cost: total_earnings + total_handouts,
            violations,
            payments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Courier;
    use crate::repository::InMemoryRepository;
    use geokit::LatLon;
    use guarantee_predictor::PredictorConfig;

    async fn finalizer_with(couriers: Vec<Courier>) -> PaymentFinalizer {
        let repo = Arc::new(InMemoryRepository::new());
        for c in couriers {
            repo.insert_courier(c).await.unwrap();
        }
        let predictor = Arc::new(Mutex::new(GuaranteePredictor::new(PredictorConfig::default()).unwrap()));
        PaymentFinalizer::new(repo, predictor, 100.0, 80.0)
    }

    fn courier(id: &str, work: f64, active: f64, earnings: f64) -> Courier {
        let mut c = Courier::new(id, LatLon::new(0.0, 0.0));
        c.work_hours = work;
        c.active_hours = active;
        c.earnings = earnings;
        c
    }

    #[tokio::test]
    async fn below_guarantee_courier_receives_a_handout() {
        // G = 0.5 * 10 = 5, W = 2 -> shortfall 3 -> handout 300.
        let finalizer = finalizer_with(vec![courier("c1", 2.0, 10.0, 200.0)]).await;
        let summary = finalizer.finalize_payments(Some(0.5)).await.unwrap();
        assert_eq!(summary.payments[0].handout, 300.0);
        assert_eq!(summary.payments[0].total_pay, 500.0);
    }

    #[tokio::test]
    async fn above_guarantee_courier_receives_no_handout() {
        let finalizer = finalizer_with(vec![courier("c1", 10.0, 10.0, 1000.0)]).await;
        let summary = finalizer.finalize_payments(Some(0.25)).await.unwrap();
        assert_eq!(summary.payments[0].handout, 0.0);
    }

    #[tokio::test]
    async fn zero_active_hours_couriers_are_excluded() {
        let finalizer = finalizer_with(vec![courier("c1", 0.0, 0.0, 0.0)]).await;
        let summary = finalizer.finalize_payments(Some(0.25)).await.unwrap();
        assert_eq!(summary.couriers, 0);
    }

    #[tokio::test]
    async fn calling_twice_is_idempotent() {
        let finalizer = finalizer_with(vec![courier("c1", 2.0, 10.0, 200.0)]).await;
        let first = finalizer.finalize_payments(Some(0.5)).await.unwrap();
        let second = finalizer.finalize_payments(Some(0.5)).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn flags_min_wage_violation() {
        // total_pay=200, active=10 -> effective_wage=20 < min_wage(80).
        let finalizer = finalizer_with(vec![courier("c1", 2.0, 10.0, 200.0)]).await;
        let summary = finalizer.finalize_payments(Some(0.0)).await.unwrap();
        assert!(summary.payments[0].min_wage_violation);
        assert_eq!(summary.violations, 1);
    }
}
