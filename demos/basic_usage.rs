//! Basic context logger usage example
//!
//! Demonstrates subcontexts, appended payloads, prefixes and error payloads
//! with console output.
//!
//! Run with: cargo run --example basic_usage

use context_logger::prelude::*;
use context_logger::{log_info, log_warning};

struct User {
    id: u64,
    name: String,
}

impl LogContextData for User {
    fn log_context_data(&self) -> ContextData {
        ContextData::new()
            .with_field("id", self.id as i64)
            .with_field("name", self.name.as_str())
    }
}

struct CheckoutHandler;

impl CheckoutHandler {
    fn handle(&self, user: &User) {
        push_sub_context("user", LogPayload::capability(user));
        log_info!("checkout started", [("items", 3)]);
        log_warning!("payment slow", [("ms", 1800)], "psp");

        let err = std::io::Error::new(std::io::ErrorKind::TimedOut, "gateway timed out");
        log_error("payment failed", LogPayload::error(&err));

        pop_sub_context("user");
    }
}

fn main() -> Result<()> {
    println!("=== Context Logger - Basic Usage Example ===\n");

    let logger = ContextLogger::builder()
        .storage_root(std::env::temp_dir().join("context_logger_demo"))
        .appender(ConsoleAppender::new())
        .build()?;
    set_global_logger(logger);

    println!("1. Subcontext for the request:");
    push_sub_context("req", [("id", "42"), ("path", "/checkout")]);
    log_info("request received", ());

    println!("\n2. Nested subcontext, macros and an error payload:");
    let user = User {
        id: 7,
        name: "alice".to_string(),
    };
    CheckoutHandler.handle(&user);

    println!("\n3. After popping the request subcontext:");
    pop_sub_context("req");
    log_info("request finished", ());

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
