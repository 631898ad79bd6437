//! Demonstration front-end for the dispatch core.
//!
//! Each subcommand seeds a synthetic roster and order list against a fresh
//! in-process `InMemoryRepository`, then drives it through the requested
//! portion of the order lifecycle. The repository never persists across
//! invocations — that is the reference implementation's explicit tradeoff
//! (see `dispatch-core/src/repository.rs`); this binary exists to exercise
//! the function-level API, not to stand in for a production transport.

use clap::{Parser, Subcommand};
use dispatch_core::repository::{InMemoryRepository, Repository};
use dispatch_core::{domain::{Courier, Order}, DispatchConfig, DispatchHandle};
use geokit::fixtures::{city_center, random_point};
use rand::SeedableRng;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "dispatch-cli",
    about = "Demonstration command-line front-end for the WORK4FOOD dispatch core"
)]
struct Cli {
    /// Emit logs as JSON instead of the default plain formatter.
    #[arg(long, global = true)]
    json: bool,
    /// City to anchor the synthetic fixture around.
    #[arg(long, global = true, default_value = "bangalore")]
    city: String,
    /// Number of synthetic couriers to seed.
    #[arg(long, global = true, default_value_t = 4)]
    couriers: usize,
    /// Number of synthetic orders to seed.
    #[arg(long, global = true, default_value_t = 8)]
    orders: usize,
    /// Random seed for the synthetic fixture generator.
    #[arg(long, global = true, default_value_t = 42)]
    seed: u64,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a freshly generated synthetic roster and order list; no dispatch logic runs.
    Seed,
    /// Seed, then run a single batch tick and print the resulting BatchRecord.
    ProcessBatch,
    /// Seed, process one batch, then accept the first resulting assignment.
    Accept,
    /// Seed, process one batch, then accept and pick up the first assignment.
    Pickup,
    /// Seed, process one batch, then run accept/pickup/deliver on the first assignment.
    Deliver {
        #[arg(long, default_value_t = 0.5)]
        actual_work_hours: f64,
    },
    /// Seed, process one batch, deliver the first assignment, then finalize payments.
    Finalize {
        #[arg(long)]
        omega_final: Option<f64>,
    },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter);
    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

async fn seed_repository(
    repo: &InMemoryRepository,
    city: &str,
    courier_count: usize,
    order_count: usize,
    seed: u64,
) -> anyhow::Result<()> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let center = city_center(city);

    for i in 0..courier_count {
        let location = random_point(&mut rng, center, 5.0);
        repo.insert_courier(Courier::new(format!("courier-{i}"), location)).await?;
    }
    for i in 0..order_count {
        let pickup = random_point(&mut rng, center, 5.0);
        let dropoff = random_point(&mut rng, center, 5.0);
        repo.insert_order(Order::new(
            format!("order-{i}"),
            pickup,
            dropoff,
            chrono::Utc::now() - chrono::Duration::minutes(1),
        ))
        .await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json);

    let repo: Arc<InMemoryRepository> = Arc::new(InMemoryRepository::new());
    seed_repository(&repo, &cli.city, cli.couriers, cli.orders, cli.seed).await?;

    match &cli.command {
        Command::Seed => {
            let couriers = repo.available_couriers().await?;
            let orders = repo.pending_orders(None, chrono::Utc::now()).await?;
            println!("{}", serde_json::to_string_pretty(&couriers)?);
            println!("{}", serde_json::to_string_pretty(&orders)?);
        }
        Command::ProcessBatch => {
            let handle = DispatchHandle::new(DispatchConfig::default(), repo.clone())?;
            let record = handle.batch_processor.process_batch(chrono::Utc::now()).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Accept => {
            let handle = DispatchHandle::new(DispatchConfig::default(), repo.clone())?;
            let record = handle.batch_processor.process_batch(chrono::Utc::now()).await?;
            info!(batch_id = %record.batch_id, assigned = record.assigned_orders, "batch processed");
            if let Some((order_id, courier_id)) = first_assignment(&repo).await? {
                let (ok, reason) = handle.order_executor.accept(&order_id, &courier_id).await?;
                println!(
                    "{}",
                    serde_json::json!({ "order_id": order_id, "courier_id": courier_id, "accepted": ok, "reason": reason })
                );
            } else {
                println!("{{\"error\": \"no assignment produced by this batch\"}}");
            }
        }
        Command::Pickup => {
            let handle = DispatchHandle::new(DispatchConfig::default(), repo.clone())?;
            handle.batch_processor.process_batch(chrono::Utc::now()).await?;
            if let Some((order_id, courier_id)) = first_assignment(&repo).await? {
                handle.order_executor.accept(&order_id, &courier_id).await?;
                let (ok, reason) = handle
                    .order_executor
                    .pickup(&order_id, &courier_id, chrono::Utc::now())
                    .await?;
                println!(
                    "{}",
                    serde_json::json!({ "order_id": order_id, "courier_id": courier_id, "picked_up": ok, "reason": reason })
                );
            } else {
                println!("{{\"error\": \"no assignment produced by this batch\"}}");
            }
        }
        Command::Deliver { actual_work_hours } => {
            let handle = DispatchHandle::new(DispatchConfig::default(), repo.clone())?;
            handle.batch_processor.process_batch(chrono::Utc::now()).await?;
            if let Some((order_id, courier_id)) = first_assignment(&repo).await? {
                handle.order_executor.accept(&order_id, &courier_id).await?;
                handle
                    .order_executor
                    .pickup(&order_id, &courier_id, chrono::Utc::now())
                    .await?;
                let (ok, reason) = handle
                    .order_executor
                    .deliver(&order_id, &courier_id, *actual_work_hours, chrono::Utc::now())
                    .await?;
                println!(
                    "{}",
                    serde_json::json!({ "order_id": order_id, "courier_id": courier_id, "delivered": ok, "reason": reason })
                );
            } else {
                println!("{{\"error\": \"no assignment produced by this batch\"}}");
            }
        }
        Command::Finalize { omega_final } => {
            let handle = DispatchHandle::new(DispatchConfig::default(), repo.clone())?;
            handle.batch_processor.process_batch(chrono::Utc::now()).await?;
            if let Some((order_id, courier_id)) = first_assignment(&repo).await? {
                handle.order_executor.accept(&order_id, &courier_id).await?;
                handle
                    .order_executor
                    .pickup(&order_id, &courier_id, chrono::Utc::now())
                    .await?;
                handle
                    .order_executor
                    .deliver(&order_id, &courier_id, 0.5, chrono::Utc::now())
                    .await?;
            }
            let summary = handle.payment_finalizer.finalize_payments(*omega_final).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

async fn first_assignment(repo: &InMemoryRepository) -> anyhow::Result<Option<(String, String)>> {
    for i in 0.. {
        let id = format!("order-{i}");
        match repo.order(&id).await? {
            Some(order) => {
                if let Some(courier_id) = order.assigned_courier_id {
                    return Ok(Some((order.id, courier_id)));
                }
            }
            None => break,
        }
    }
    Ok(None)
}
