//! The WORK4FOOD dispatch core: batch windowing, guarantee-aware assignment
//! commit, and courier/order lifecycle orchestration.
//!
//! The crate is transport-agnostic: `BatchProcessor`, `OrderExecutor` and
//! `PaymentFinalizer` are plain function-level APIs over an `Arc<dyn
//! Repository>`. The bundled `cli` crate is the only caller in this
//! workspace; a production deployment would instead wire these behind
//! whatever RPC/HTTP transport it already runs.

#![forbid(unsafe_code)]

pub mod batch_processor;
pub mod config;
pub mod domain;
pub mod error;
pub mod order_executor;
pub mod payment_finalizer;
pub mod repository;
pub mod scheduler;

pub use batch_processor::BatchProcessor;
pub use config::DispatchConfig;
pub use domain::{BatchRecord, Courier, CourierStatus, Order, OrderStatus};
pub use error::DispatchError;
pub use order_executor::OrderExecutor;
pub use payment_finalizer::{CourierPayment, FinalizationSummary, PaymentFinalizer};
pub use repository::{InMemoryRepository, Repository};
pub use scheduler::Scheduler;

use guarantee_predictor::GuaranteePredictor;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Wires up a `BatchProcessor` + `OrderExecutor` + `PaymentFinalizer` that
/// all share one repository and one guarantee predictor, the shape every
/// embedder needs. The `Scheduler` and raw repository remain available
/// separately for callers that want to drive ticks manually (tests, the
/// `cli seed`/`process-batch` subcommands).
pub struct DispatchHandle {
    pub repository: Arc<dyn Repository>,
    pub predictor: Arc<Mutex<GuaranteePredictor>>,
    pub batch_processor: Arc<BatchProcessor>,
    pub order_executor: Arc<OrderExecutor>,
    pub payment_finalizer: Arc<PaymentFinalizer>,
    pub config: DispatchConfig,
}

impl DispatchHandle {
    pub fn new(config: DispatchConfig, repository: Arc<dyn Repository>) -> Result<Self, DispatchError> {
        config.validate()?;
        let predictor = Arc::new(Mutex::new(GuaranteePredictor::new(config.predictor_config())?));
        let batch_processor = Arc::new(BatchProcessor::new(
            repository.clone(),
            predictor.clone(),
            config.batch_window_minutes,
            config.agent_speed_kmph,
            config.prep_time_minutes,
            config.carry_forward_pending,
        ));
        let order_executor = Arc::new(OrderExecutor::new(repository.clone(), config.pay_per_hour));
        let payment_finalizer = Arc::new(PaymentFinalizer::new(
            repository.clone(),
            predictor.clone(),
            config.pay_per_hour,
            config.min_wage,
        ));
        Ok(Self {
            repository,
            predictor,
            batch_processor,
            order_executor,
            payment_finalizer,
            config,
        })
    }

    pub fn scheduler(&self) -> Scheduler {
        Scheduler::new(self.batch_processor.clone(), self.config.batch_window_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_handle_construction_validates_config() {
        let repo: Arc<dyn Repository> = Arc::new(InMemoryRepository::new());
        let bad = DispatchConfig {
            batch_window_minutes: 0,
            ..DispatchConfig::default()
        };
        assert!(DispatchHandle::new(bad, repo).is_err());
    }

    #[tokio::test]
    async fn dispatch_handle_wires_a_working_pipeline() {
        let repo: Arc<dyn Repository> = Arc::new(InMemoryRepository::new());
        let handle = DispatchHandle::new(DispatchConfig::default(), repo).unwrap();
        let record = handle.batch_processor.process_batch(chrono::Utc::now()).await.unwrap();
        assert_eq!(record.assigned_orders, 0);
        let summary = handle.payment_finalizer.finalize_payments(None).await.unwrap();
        assert_eq!(summary.couriers, 0);
    }
}
