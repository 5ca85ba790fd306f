//! File logging example
//!
//! Demonstrates logging to console and file appenders at the same time,
//! with oversized values dumped under the storage root.
//!
//! Run with: cargo run --example file_logging

use context_logger::prelude::*;

fn main() -> Result<()> {
    println!("=== Context Logger - File Logging Example ===\n");

    let storage_root = std::env::temp_dir().join("context_logger_file_demo");

    let logger = ContextLogger::builder()
        .storage_root(&storage_root)
        .dump_threshold(64)
        .min_level(LogLevel::Info)
        .appender(ConsoleAppender::new())
        .appender(FileAppender::new("application.log")?)
        .build()?;

    println!("1. Logging to both console and file:");

    logger.push_sub_context("app", [("name", "billing"), ("version", "1.4.2")]);
    logger.info("Application started", ());
    logger.info("Configuration loaded", [("source", "env")]);
    logger.warning("Using default settings for some options", [("missing", 2)]);

    println!("\n2. Processing items inside a subcontext:");

    for i in 1..=5 {
        let _job = logger.scoped_sub_context("job", [("item", i)]);
        logger.info("Processing item", [("of", 5)]);
        if i == 3 {
            logger.warning("Item took longer than expected", [("ms", 950)]);
        }
    }

    println!("\n3. Oversized values are dumped:");

    let response = "<invoice>".to_string() + &"<line amount=\"9.99\"/>".repeat(20) + "</invoice>";
    logger.error("Upstream rejected invoice", [("response", response.as_str())]);

    logger.pop_sub_context("app");
    logger.info("All operations completed", ());

    println!(
        "\nDumps written: {} (failures: {})",
        logger.metrics().dumps_written(),
        logger.metrics().dump_failures()
    );

    // Dropping the logger flushes the file appender
    drop(logger);

    println!("\n=== Example completed successfully! ===");
    println!("Check 'application.log' for the full log output");
    println!("Dumps are under '{}'", storage_root.join("dump").display());

    Ok(())
}
