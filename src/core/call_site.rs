//! Call-site identification
//!
//! The call site is captured where the log statement is written, either by
//! [`call_site!`](crate::call_site) (function path plus file and line) or by
//! a `#[track_caller]` method (file and line only). It is rendered into the
//! `m` field as `Type::method`, `function`, or `file:line`.

use std::fmt;
use std::panic::Location;

/// Key of the call-site field in every emitted entry
pub const CALL_SITE_KEY: &str = "m";

/// Name of the marker fn that `call_site!` declares
#[doc(hidden)]
pub const MARKER_FN: &str = "__call_site";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    function: Option<String>,
    file: &'static str,
    line: u32,
}

impl CallSite {
    /// Call site from a full function path such as `app::Service::run`
    pub fn new(function_path: &str, file: &'static str, line: u32) -> Self {
        let function = short_function_name(function_path);
        Self {
            function: (!function.is_empty()).then_some(function),
            file,
            line,
        }
    }

    /// Used by `call_site!`; strips the marker fn from the path
    #[doc(hidden)]
    pub fn from_marker(marker_path: &str, file: &'static str, line: u32) -> Self {
        let path = marker_path
            .strip_suffix(MARKER_FN)
            .and_then(|p| p.strip_suffix("::"))
            .unwrap_or(marker_path);
        Self::new(path, file, line)
    }

    /// Location of the caller of a `#[track_caller]` function
    #[track_caller]
    pub fn caller() -> Self {
        Self::from_location(Location::caller())
    }

    pub fn from_location(location: &'static Location<'static>) -> Self {
        Self {
            function: None,
            file: location.file(),
            line: location.line(),
        }
    }

    pub fn function(&self) -> Option<&str> {
        self.function.as_deref()
    }

    pub fn file(&self) -> &'static str {
        self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    /// Value of the `m` field
    pub fn identifier(&self) -> String {
        match &self.function {
            Some(function) => function.clone(),
            None => {
                let file = self
                    .file
                    .rsplit(['/', '\\'])
                    .next()
                    .unwrap_or(self.file);
                format!("{}:{}", file, self.line)
            }
        }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier())
    }
}

/// Reduce a function path to `Type::method`, or `function` when the
/// enclosing segment is not a type
///
/// Closure segments are skipped, generic arguments dropped, and
/// `<Type as Trait>::method` renders as `Type::method`.
pub fn short_function_name(path: &str) -> String {
    let mut segments = split_path(path.trim());
    while segments
        .last()
        .is_some_and(|s| s.starts_with("{{") || s.is_empty())
    {
        segments.pop();
    }

    let Some(method) = segments.pop() else {
        return String::new();
    };
    let method = strip_generics(method);

    match segments.last().and_then(|owner| type_name(owner)) {
        Some(owner) => format!("{}::{}", owner, method),
        None => method.to_string(),
    }
}

fn type_name(segment: &str) -> Option<&str> {
    if let Some(inner) = segment.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
        let self_type = inner.split(" as ").next().unwrap_or(inner);
        let last = split_path(self_type).pop()?;
        return Some(strip_generics(last)).filter(|s| !s.is_empty());
    }

    let name = strip_generics(segment);
    name.chars()
        .next()
        .is_some_and(|c| c.is_ascii_uppercase())
        .then_some(name)
}

fn strip_generics(segment: &str) -> &str {
    segment.split('<').next().unwrap_or(segment)
}

/// Split on `::` outside of angle brackets
fn split_path(path: &str) -> Vec<&str> {
    let bytes = path.as_bytes();
    let mut segments = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            b'>' => depth -= 1,
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                segments.push(&path[start..i]);
                i += 2;
                start = i;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    segments.push(&path[start..]);
    segments
}
