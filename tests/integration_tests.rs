//! Integration tests for the context logger
//!
//! These tests verify:
//! - Subcontext push/pop and merging
//! - End-to-end dispatch to the backend
//! - Dumping of oversized values
//! - Error context extraction
//! - File output through the default backend
//! - Thread isolation of subcontext stacks

use context_logger::appenders::{FileAppender, JsonAppender};
use context_logger::core::dump_store::{is_dump_token, DUMP_EXTENSION};
use context_logger::prelude::*;
use std::fmt;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn memory_logger(threshold: usize) -> (ContextLogger, Arc<MemoryBackend>, Arc<MemoryBlobStore>) {
    let backend = Arc::new(MemoryBackend::new());
    let blobs = Arc::new(MemoryBlobStore::new());
    let logger = ContextLogger::builder()
        .dump_threshold(threshold)
        .backend(Arc::clone(&backend))
        .blob_store(Arc::clone(&blobs))
        .build()
        .expect("valid configuration");
    (logger, backend, blobs)
}

#[derive(Debug)]
struct QueryError {
    message: &'static str,
    source: Option<Box<QueryError>>,
}

impl QueryError {
    fn new(message: &'static str) -> Self {
        Self {
            message,
            source: None,
        }
    }

    fn caused_by(mut self, source: QueryError) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message)
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

struct Customer {
    id: u32,
    plan: &'static str,
}

impl LogContextData for Customer {
    fn log_context_data(&self) -> ContextData {
        ContextData::new()
            .with_field("id", self.id)
            .with_field("plan", self.plan)
    }
}

#[test]
fn test_push_then_current_context_and_pop() {
    let (logger, _, _) = memory_logger(128);

    logger.push_sub_context("a", [("x", "1"), ("y", "2")]);
    let ctx = logger.current_context();
    assert_eq!(ctx.get("a_x").map(String::as_str), Some("1"));
    assert_eq!(ctx.get("a_y").map(String::as_str), Some("2"));
    assert!(ctx.contains_key("t"));

    logger.pop_sub_context("a");
    let ctx = logger.current_context();
    assert!(!ctx.contains_key("a_x"));
    assert!(!ctx.contains_key("a_y"));
}

#[test]
fn test_pop_unknown_name_is_noop() {
    let (logger, backend, _) = memory_logger(128);
    logger.push_sub_context("kept", [("k", "v")]);

    logger.pop_sub_context("never_pushed");

    assert!(logger.current_context().contains_key("kept_k"));
    assert!(backend.is_empty());
    logger.pop_sub_context("kept");
}

#[test]
fn test_union_of_subcontexts_and_appended_wins() {
    let (logger, _, _) = memory_logger(128);
    logger.push_sub_context("x", [("a", "1")]);
    logger.push_sub_context("y", [("b", "2")]);

    let mut appended = ContextMap::new();
    appended.insert("x_a".to_string(), "override".to_string());
    let ctx = logger.current_context_with(appended);

    assert_eq!(ctx["x_a"], "override");
    assert_eq!(ctx["y_b"], "2");

    logger.pop_sub_context("x");
    logger.pop_sub_context("y");
}

#[test]
fn test_end_to_end_hello() {
    let (logger, backend, _) = memory_logger(128);

    logger.push_sub_context("req", [("id", "42")]);
    logger.info("hello", [("status", "ok")]);
    logger.pop_sub_context("req");

    let entry = backend.find("hello").expect("entry dispatched");
    assert_eq!(entry.level, LogLevel::Info);
    assert_eq!(entry.message, "hello");
    assert_eq!(entry.field("req_id"), Some("42"));
    assert_eq!(entry.field("status"), Some("ok"));
    assert!(entry.field("t").unwrap().parse::<i64>().is_ok());
    assert!(entry.field("m").is_some_and(|m| !m.is_empty()));
}

#[test]
fn test_end_to_end_dump() {
    let (logger, backend, blobs) = memory_logger(128);
    let payload = "p".repeat(200);

    logger.warning("large body", [("body", payload.as_str())]);

    let token = backend.last().unwrap().field("body").unwrap().to_string();
    assert!(is_dump_token(&token), "not a dump token: {}", token);

    let path = format!("{}.{}", token, DUMP_EXTENSION);
    assert_eq!(blobs.get_string(&path), Some(payload));
    assert_eq!(logger.metrics().dumps_written(), 1);
}

#[test]
fn test_composite_values_are_json() {
    let (logger, backend, _) = memory_logger(128);
    let data = ContextData::new()
        .with_field("tags", serde_json::json!(["a", "b"]))
        .with_field("missing", serde_json::Value::Null)
        .with_field("ok", true);

    logger.info("composite", data);

    let entry = backend.last().unwrap();
    assert_eq!(entry.field("tags"), Some(r#"["a","b"]"#));
    assert_eq!(entry.field("missing"), Some(""));
    assert_eq!(entry.field("ok"), Some("true"));
}

#[test]
fn test_capability_payload() {
    let (logger, backend, _) = memory_logger(128);
    let customer = Customer { id: 9, plan: "pro" };

    logger.push_sub_context("customer", LogPayload::capability(&customer));
    logger.info("upgraded", ());
    logger.pop_sub_context("customer");

    let entry = backend.last().unwrap();
    assert_eq!(entry.field("customer_id"), Some("9"));
    assert_eq!(entry.field("customer_plan"), Some("pro"));
}

#[test]
fn test_error_without_inner() {
    let (logger, backend, _) = memory_logger(100_000);
    let err = QueryError::new("deadlock detected");

    logger.error("query failed", LogPayload::error(&err));

    let entry = backend.last().unwrap();
    let extracted: Vec<&str> = entry
        .fields
        .keys()
        .map(String::as_str)
        .filter(|k| !matches!(*k, "t" | "m"))
        .collect();
    assert_eq!(extracted, vec!["err_msg", "trace"]);
    assert_eq!(entry.field("err_msg"), Some("deadlock detected"));
}

#[test]
fn test_error_nesting_stops_at_one_level() {
    let (logger, backend, _) = memory_logger(100_000);
    let err = QueryError::new("request failed")
        .caused_by(QueryError::new("query failed").caused_by(QueryError::new("socket closed")));

    logger.error("handler failed", LogPayload::error(&err));

    let entry = backend.last().unwrap();
    assert_eq!(entry.field("err_msg"), Some("request failed"));
    assert_eq!(entry.field("inner_err_msg"), Some("query failed"));
    assert!(entry.field("inner_trace").is_some());
    assert!(!entry.fields.keys().any(|k| k.starts_with("inner_inner")));
    assert_eq!(entry.fields.len(), 6);
}

#[test]
fn test_long_trace_is_dumped() {
    let (logger, backend, blobs) = memory_logger(16);
    let err = QueryError::new("a fairly long error message that will not fit");

    logger.error("failed", LogPayload::error(&err));

    let entry = backend.last().unwrap();
    assert!(is_dump_token(entry.field("trace").unwrap()));
    assert!(is_dump_token(entry.field("err_msg").unwrap()));
    assert_eq!(blobs.len(), 2);
}

#[test]
fn test_default_backend_writes_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("context.log");

    let logger = ContextLogger::builder()
        .storage_root(temp_dir.path().join("storage"))
        .min_level(LogLevel::Warning)
        .appender(FileAppender::new(&log_file).expect("Failed to create appender"))
        .build()
        .expect("valid configuration");

    logger.push_sub_context("job", [("id", "j-1")]);
    logger.info("filtered out", ());
    logger.warning("disk almost full", [("free_mb", 12)]);
    logger.pop_sub_context("job");
    drop(logger);

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("disk almost full"));
    assert!(lines[0].contains("free_mb=12"));
    assert!(lines[0].contains("job_id=j-1"));
}

#[test]
fn test_dumps_land_under_storage_root() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("context.jsonl");

    let logger = ContextLogger::builder()
        .storage_root(temp_dir.path())
        .dump_threshold(8)
        .appender(JsonAppender::new(&log_file).expect("Failed to create appender"))
        .build()
        .expect("valid configuration");

    logger.info("dumped", [("payload", "0123456789abcdef")]);
    drop(logger);

    let line = fs::read_to_string(&log_file).expect("Failed to read log file");
    let parsed: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
    let token = parsed["payload"].as_str().unwrap().to_string();
    assert!(is_dump_token(&token));

    let dump = temp_dir.path().join(format!("{}.{}", token, DUMP_EXTENSION));
    assert_eq!(fs::read_to_string(dump).unwrap(), "0123456789abcdef");
}

#[test]
fn test_log_injection_prevention() {
    let (logger, backend, _) = memory_logger(128);
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("injection_test.log");

    let mut file_logger = Logger::new();
    file_logger.add_appender(Box::new(
        FileAppender::new(&log_file).expect("Failed to create appender"),
    ));
    let malicious = "User login\nERROR [2024-10-17] Fake error injected";
    file_logger.write(LogLevel::Info, malicious, &logger.current_context());
    file_logger.flush().expect("Failed to flush");

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert_eq!(content.lines().count(), 1);
    assert!(content.contains("\\n"));
    assert!(backend.is_empty());
}

#[test]
fn test_threads_have_separate_stacks() {
    let (logger, backend, _) = memory_logger(128);
    let logger = Arc::new(logger);

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let logger = Arc::clone(&logger);
            std::thread::spawn(move || {
                let id = i.to_string();
                logger.push_sub_context("worker", [("id", id.as_str())]);
                logger.info("working", ());
                logger.pop_sub_context("worker");
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let mut ids: Vec<String> = backend
        .entries()
        .iter()
        .map(|e| e.field("worker_id").unwrap().to_string())
        .collect();
    ids.sort();
    assert_eq!(ids, vec!["0", "1", "2", "3"]);
}
