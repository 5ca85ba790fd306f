//! Task-scoped subcontexts
//!
//! Each spawned request handler runs inside its own `scope`, so subcontexts
//! pushed by one task never show up in another even when they share a
//! worker thread.
//!
//! Run with: cargo run --example task_scope --features tokio

use context_logger::core::context_stack::snapshot;
use context_logger::prelude::*;
use context_logger::{scope, scope_with};
use std::sync::Arc;
use std::time::Duration;

async fn handle_request(logger: Arc<ContextLogger>, id: u32) {
    logger.push_sub_context("req", [("id", id)]);
    logger.info("request accepted", ());

    tokio::time::sleep(Duration::from_millis(10 * u64::from(4 - id))).await;

    logger.info("request finished", [("status", 200)]);
    logger.pop_sub_context("req");
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== Context Logger - Task Scope Example ===\n");

    let logger = Arc::new(
        ContextLogger::builder()
            .storage_root(std::env::temp_dir().join("context_logger_task_demo"))
            .appender(ConsoleAppender::new())
            .build()?,
    );

    println!("1. Interleaved request handlers:");
    let handlers: Vec<_> = (1..=3)
        .map(|id| tokio::spawn(scope(handle_request(Arc::clone(&logger), id))))
        .collect();
    for handler in handlers {
        if let Err(e) = handler.await {
            eprintln!("handler failed: {}", e);
        }
    }

    println!("\n2. Seeding a background task with the caller's subcontexts:");
    logger.push_sub_context("deploy", [("release", "2024.10")]);
    let seed = snapshot();
    let background = Arc::clone(&logger);
    let job = tokio::spawn(scope_with(seed, async move {
        background.info("background job running", ());
    }));
    if let Err(e) = job.await {
        eprintln!("background job failed: {}", e);
    }
    logger.pop_sub_context("deploy");

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
