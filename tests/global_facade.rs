//! Tests for the process-wide facade and the logging macros
//!
//! The global logger is installed once for this test binary; each test
//! runs on its own thread, so subcontexts never collide.

use context_logger::prelude::*;
use context_logger::{
    current_context, log_error, log_info, log_warning, pop_log_ctx, push_log_ctx, CapturedEntry,
};
use std::sync::{Arc, OnceLock};

fn backend() -> Arc<MemoryBackend> {
    static BACKEND: OnceLock<Arc<MemoryBackend>> = OnceLock::new();
    Arc::clone(BACKEND.get_or_init(|| {
        let backend = Arc::new(MemoryBackend::new());
        let logger = ContextLogger::builder()
            .backend(Arc::clone(&backend))
            .blob_store(Arc::new(MemoryBlobStore::new()))
            .build()
            .expect("valid configuration");
        set_global_logger(logger);
        backend
    }))
}

fn find(message: &str) -> CapturedEntry {
    backend()
        .find(message)
        .unwrap_or_else(|| panic!("no entry with message {:?}", message))
}

struct InvoiceService;

struct ReminderJob;

impl ReminderJob {
    fn run(&self) {
        log_info("global reminder fn", [("due", 3)]);
        log_info!("global reminder macro", [("due", 3)], "job");
    }
}

impl InvoiceService {
    fn send(&self) {
        push_log_ctx!("invoice", [("number", "INV-7")]);
        log_info!("global invoice sent", [("channel", "email")]);
        pop_log_ctx!("invoice");
    }
}

#[test]
fn test_free_functions() {
    backend();

    push_sub_context("tenant", [("id", "acme")]);
    log_info("global free fn info", ());
    log_warning("global free fn warning", [("retries", 3)]);
    pop_sub_context("tenant");
    log_error("global free fn error", ());

    let info = find("global free fn info");
    assert_eq!(info.level, LogLevel::Info);
    assert_eq!(info.field("tenant_id"), Some("acme"));
    assert!(info.field("m").unwrap().starts_with("global_facade.rs:"));

    let warning = find("global free fn warning");
    assert_eq!(warning.field("retries"), Some("3"));

    let error = find("global free fn error");
    assert_eq!(error.level, LogLevel::Error);
    assert_eq!(error.field("tenant_id"), None);
}

#[test]
fn test_macros_name_the_method() {
    backend();
    InvoiceService.send();

    let entry = find("global invoice sent");
    assert_eq!(entry.field("m"), Some("InvoiceService::send"));
    assert_eq!(entry.field("invoice_number"), Some("INV-7"));
    assert_eq!(entry.field("channel"), Some("email"));
    assert!(!current_context().contains_key("invoice_number"));
}

#[test]
fn test_macro_prefix_and_levels() {
    backend();

    log_warning!("global macro warning", [("ms", 1200)], "db");
    log_error!("global macro error");

    let warning = find("global macro warning");
    assert_eq!(warning.level, LogLevel::Warning);
    assert_eq!(warning.field("db_ms"), Some("1200"));
    assert_eq!(warning.field("m"), Some("test_macro_prefix_and_levels"));

    assert_eq!(find("global macro error").level, LogLevel::Error);
}

#[test]
fn test_global_logger_is_shared() {
    backend();
    let first = global_logger();
    let second = global_logger();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_function_and_macro_call_sites() {
    backend();
    ReminderJob.run();

    let by_fn = find("global reminder fn");
    assert!(by_fn.field("m").unwrap().starts_with("global_facade.rs:"));
    assert_eq!(by_fn.field("due"), Some("3"));

    let by_macro = find("global reminder macro");
    assert_eq!(by_macro.field("m"), Some("ReminderJob::run"));
    assert_eq!(by_macro.field("job_due"), Some("3"));
}

#[test]
fn test_global_log_str_is_exact() {
    backend();

    context_logger::global::log_str("warning", "global str valid", (), Some("x"));
    context_logger::global::log_str("warn", "global str lenient", (), None);

    assert_eq!(find("global str valid").level, LogLevel::Warning);
    let invalid = backend()
        .entries()
        .into_iter()
        .find(|e| e.field("orig_msg") == Some("global str lenient"))
        .expect("invalid level entry");
    assert_eq!(invalid.message, "invalid log level");
    assert_eq!(invalid.field("invalid_level"), Some("warn"));
}
