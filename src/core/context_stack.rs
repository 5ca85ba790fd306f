//! Stack of named subcontexts
//!
//! Each thread owns one [`ContextStack`]. With the `tokio` feature, a
//! future run through [`scope`] gets its own stack, which shadows the
//! thread stack for as long as that task runs. A `ContextStack` value can
//! also be owned directly and passed through calls.
//!
//! Merge order: subcontexts merge in push order, so when two subcontexts
//! produce the same key the most recently pushed one wins. Pushing an
//! existing name replaces it and moves it to the most recent position.

use chrono::Utc;
use std::cell::RefCell;

use super::context_data::ContextMap;

/// Key of the timestamp field in every merged context
pub const TIMESTAMP_KEY: &str = "t";

/// A named bundle of formatted context fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubContext {
    name: String,
    formatted_data: ContextMap,
}

impl SubContext {
    pub fn new(name: impl Into<String>, formatted_data: ContextMap) -> Self {
        Self {
            name: name.into(),
            formatted_data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn formatted_data(&self) -> &ContextMap {
        &self.formatted_data
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextStack {
    entries: Vec<SubContext>,
}

impl ContextStack {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Store `formatted_data` under `name`, replacing any previous entry
    pub fn push(&mut self, name: impl Into<String>, formatted_data: ContextMap) {
        let name = name.into();
        self.entries.retain(|entry| entry.name != name);
        self.entries.push(SubContext::new(name, formatted_data));
    }

    /// Remove the named subcontext; absent names are ignored
    pub fn pop(&mut self, name: &str) -> Option<SubContext> {
        let idx = self.entries.iter().position(|entry| entry.name == name)?;
        Some(self.entries.remove(idx))
    }

    pub fn get(&self, name: &str) -> Option<&SubContext> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Subcontext names, oldest first
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Union of all subcontext fields, without timestamp
    pub fn merged(&self) -> ContextMap {
        let mut merged = ContextMap::new();
        for entry in &self.entries {
            merged.extend(
                entry
                    .formatted_data
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone())),
            );
        }
        merged
    }

    /// `{t: now}`, overlaid by the stack, overlaid by `appended`
    pub fn current_context(&self, appended: ContextMap) -> ContextMap {
        self.current_context_at(Utc::now().timestamp(), appended)
    }

    /// [`current_context`](Self::current_context) with a fixed timestamp
    pub fn current_context_at(&self, unix_time: i64, appended: ContextMap) -> ContextMap {
        let mut context = ContextMap::new();
        context.insert(TIMESTAMP_KEY.to_string(), unix_time.to_string());
        context.extend(self.merged());
        context.extend(appended);
        context
    }
}

thread_local! {
    static THREAD_STACK: RefCell<ContextStack> = const { RefCell::new(ContextStack::new()) };
}

#[cfg(feature = "tokio")]
tokio::task_local! {
    static TASK_STACK: RefCell<ContextStack>;
}

fn with_cell<R>(cell: &RefCell<ContextStack>, f: impl FnOnce(&mut ContextStack) -> R) -> R {
    match cell.try_borrow_mut() {
        Ok(mut stack) => f(&mut stack),
        Err(_) => {
            eprintln!("[LOGGER WARNING] Context stack is already in use; using an empty stack");
            f(&mut ContextStack::new())
        }
    }
}

fn with_thread_stack<R>(f: impl FnOnce(&mut ContextStack) -> R) -> R {
    if THREAD_STACK.try_with(|_| ()).is_ok() {
        THREAD_STACK.with(|cell| with_cell(cell, f))
    } else {
        // thread-local already destroyed during thread teardown
        f(&mut ContextStack::new())
    }
}

/// Run `f` against the stack of the current task or thread
#[cfg(feature = "tokio")]
pub fn with_current<R>(f: impl FnOnce(&mut ContextStack) -> R) -> R {
    if TASK_STACK.try_with(|_| ()).is_ok() {
        TASK_STACK.with(|cell| with_cell(cell, f))
    } else {
        with_thread_stack(f)
    }
}

/// Run `f` against the stack of the current thread
#[cfg(not(feature = "tokio"))]
pub fn with_current<R>(f: impl FnOnce(&mut ContextStack) -> R) -> R {
    with_thread_stack(f)
}

/// Copy of the current stack, e.g. to seed a child task
pub fn snapshot() -> ContextStack {
    with_current(|stack| stack.clone())
}

/// Pop `name` from the current stack
pub fn pop_current(name: &str) -> Option<SubContext> {
    with_current(|stack| stack.pop(name))
}

/// Run `future` with a fresh stack of its own
#[cfg(feature = "tokio")]
pub async fn scope<F: std::future::Future>(future: F) -> F::Output {
    scope_with(ContextStack::new(), future).await
}

/// Run `future` with `stack` as its own stack
#[cfg(feature = "tokio")]
pub async fn scope_with<F: std::future::Future>(stack: ContextStack, future: F) -> F::Output {
    TASK_STACK.scope(RefCell::new(stack), future).await
}

/// Pops its subcontext from the current stack when dropped
#[must_use = "the subcontext is popped as soon as the guard is dropped"]
#[derive(Debug)]
pub struct SubContextGuard {
    name: String,
}

impl SubContextGuard {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for SubContextGuard {
    fn drop(&mut self) {
        pop_current(&self.name);
    }
}
