//! Logging macros that capture the calling function.
//!
//! The method and free-function forms only know the file and line of the
//! call. These macros also record the enclosing function, so the `m` field
//! reads `Type::method` or `function`.
//!
//! Each macro takes a message, an optional payload and an optional prefix
//! for the payload keys. They log through the global logger unless a
//! `logger:` is given first.
//!
//! # Examples
//!
//! ```
//! use context_logger::prelude::*;
//! use context_logger::{log_info, log_warning, push_log_ctx, pop_log_ctx};
//! use std::sync::Arc;
//!
//! let backend = Arc::new(MemoryBackend::new());
//! let logger = ContextLogger::builder()
//!     .backend(Arc::clone(&backend))
//!     .blob_store(Arc::new(MemoryBlobStore::new()))
//!     .build()
//!     .unwrap();
//!
//! push_log_ctx!(logger: &logger, "req", [("id", "42")]);
//! log_info!(logger: &logger, "hello", [("status", "ok")]);
//! log_warning!(logger: &logger, "slow", [("ms", 950)], "db");
//! pop_log_ctx!(logger: &logger, "req");
//!
//! let hello = backend.find("hello").unwrap();
//! assert_eq!(hello.field("req_id"), Some("42"));
//! assert_eq!(backend.last().unwrap().field("db_ms"), Some("950"));
//! ```

/// Capture the current call site, including the enclosing function.
///
/// # Examples
///
/// ```
/// struct Billing;
///
/// impl Billing {
///     fn charge(&self) -> context_logger::CallSite {
///         context_logger::call_site!()
///     }
/// }
///
/// assert_eq!(Billing.charge().identifier(), "Billing::charge");
/// ```
#[macro_export]
macro_rules! call_site {
    () => {{
        fn __call_site() {}
        $crate::CallSite::from_marker(
            ::std::any::type_name_of_val(&__call_site),
            ::std::file!(),
            ::std::line!(),
        )
    }};
}

/// Log at the given level.
///
/// `log_at!([logger: l,] level, message [, payload [, prefix]])`
#[macro_export]
macro_rules! log_at {
    (logger: $logger:expr, $level:expr, $msg:expr $(,)?) => {
        $crate::log_at!(logger: $logger, $level, $msg, ())
    };
    (logger: $logger:expr, $level:expr, $msg:expr, $payload:expr $(,)?) => {
        ($logger).log_at(
            $level,
            $msg,
            $payload,
            ::core::option::Option::None,
            $crate::call_site!(),
        )
    };
    (logger: $logger:expr, $level:expr, $msg:expr, $payload:expr, $prefix:expr $(,)?) => {
        ($logger).log_at(
            $level,
            $msg,
            $payload,
            ::core::option::Option::Some($prefix),
            $crate::call_site!(),
        )
    };
    ($level:expr, $($arg:tt)+) => {
        $crate::log_at!(logger: $crate::global::global_logger(), $level, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// use context_logger::log_info;
///
/// log_info!("cache warmed");
/// log_info!("request done", [("status", 200)]);
/// log_info!("request done", [("status", 200)], "http");
/// ```
#[macro_export]
macro_rules! log_info {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::log_at!(logger: $logger, $crate::LogLevel::Info, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log_at!($crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! log_warning {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::log_at!(logger: $logger, $crate::LogLevel::Warning, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log_at!($crate::LogLevel::Warning, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// use context_logger::{log_error, LogPayload};
///
/// let err = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
/// log_error!("write failed", LogPayload::error(&err));
/// ```
#[macro_export]
macro_rules! log_error {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::log_at!(logger: $logger, $crate::LogLevel::Error, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log_at!($crate::LogLevel::Error, $($arg)+)
    };
}

/// Push a named subcontext.
///
/// `push_log_ctx!([logger: l,] name, payload)`
#[macro_export]
macro_rules! push_log_ctx {
    (logger: $logger:expr, $name:expr, $payload:expr $(,)?) => {
        ($logger).push_sub_context_at($name, $payload, $crate::call_site!())
    };
    ($name:expr, $payload:expr $(,)?) => {
        $crate::push_log_ctx!(logger: $crate::global::global_logger(), $name, $payload)
    };
}

/// Pop a named subcontext; unknown names are ignored.
#[macro_export]
macro_rules! pop_log_ctx {
    (logger: $logger:expr, $name:expr $(,)?) => {
        ($logger).pop_sub_context($name)
    };
    ($name:expr $(,)?) => {
        $crate::global::pop_sub_context($name)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::backend::MemoryBackend;
    use crate::core::context_logger::ContextLogger;
    use crate::core::dump_store::MemoryBlobStore;
    use crate::core::LogLevel;
    use std::sync::Arc;

    fn logger() -> (ContextLogger, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        let logger = ContextLogger::builder()
            .backend(Arc::clone(&backend))
            .blob_store(Arc::new(MemoryBlobStore::new()))
            .build()
            .unwrap();
        (logger, backend)
    }

    struct OrderService;

    impl OrderService {
        fn place(&self, logger: &ContextLogger) {
            log_info!(logger: logger, "order placed", [("sku", "A-1")]);
        }
    }

    #[test]
    fn test_macro_records_enclosing_method() {
        let (logger, backend) = logger();
        OrderService.place(&logger);

        let entry = backend.last().unwrap();
        assert_eq!(entry.field("m"), Some("OrderService::place"));
        assert_eq!(entry.field("sku"), Some("A-1"));
    }

    #[test]
    fn test_macro_arities() {
        let (logger, backend) = logger();

        log_info!(logger: &logger, "one");
        log_warning!(logger: &logger, "two", [("k", "v")]);
        log_error!(logger: &logger, "three", [("k", "v")], "pre");

        let entries = backend.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].level, LogLevel::Info);
        assert_eq!(entries[1].field("k"), Some("v"));
        assert_eq!(entries[2].level, LogLevel::Error);
        assert_eq!(entries[2].field("pre_k"), Some("v"));
        assert_eq!(entries[2].field("m"), Some("test_macro_arities"));
    }

    #[test]
    fn test_push_and_pop_macros() {
        let (logger, backend) = logger();

        push_log_ctx!(logger: &logger, "cart", [("items", 3)]);
        log_info!(logger: &logger, "checkout");
        pop_log_ctx!(logger: &logger, "cart");
        log_info!(logger: &logger, "after");

        assert_eq!(backend.find("checkout").unwrap().field("cart_items"), Some("3"));
        assert_eq!(backend.find("after").unwrap().field("cart_items"), None);
    }

    #[test]
    fn test_call_site_in_closure() {
        let site = (|| crate::call_site!())();
        assert_eq!(site.identifier(), "test_call_site_in_closure");
    }
}
