//! Context data derived from errors
//!
//! An error contributes its message and a rendered trace. When an HTML
//! trace renderer is installed the trace is HTML, which suits the `.htm`
//! dump files long traces end up in; otherwise a plain-text rendering is
//! used. One level of `source()` is recorded as `inner_err_msg` and
//! `inner_trace`.

use std::error::Error;
use std::fmt::Write as _;
use std::sync::Arc;

use super::context_data::ContextData;

/// Renders an error and its cause chain as an HTML document
pub trait TraceRenderer: Send + Sync {
    fn render_html(&self, err: &(dyn Error + 'static)) -> String;
}

/// Built-in HTML trace renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlTraceRenderer;

impl TraceRenderer for HtmlTraceRenderer {
    fn render_html(&self, err: &(dyn Error + 'static)) -> String {
        let message = escape_html(&err.to_string());
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>");
        html.push_str(&message);
        html.push_str("</title></head>\n<body>\n<h1>");
        html.push_str(&message);
        html.push_str("</h1>\n<pre>");
        html.push_str(&escape_html(&format!("{:#?}", err)));
        html.push_str("</pre>\n");

        let causes: Vec<String> = sources(err).map(|e| escape_html(&e.to_string())).collect();
        if !causes.is_empty() {
            html.push_str("<h2>Caused by</h2>\n<ol>\n");
            for cause in causes {
                let _ = writeln!(html, "<li>{}</li>", cause);
            }
            html.push_str("</ol>\n");
        }

        html.push_str("</body>\n</html>\n");
        html
    }
}

/// Plain-text rendering: message, debug form, then the cause chain
pub fn plain_text_trace(err: &(dyn Error + 'static)) -> String {
    let mut out = format!("{}\n{:?}", err, err);
    let mut causes = sources(err).peekable();
    if causes.peek().is_some() {
        out.push_str("\n\nCaused by:");
        for (idx, cause) in causes.enumerate() {
            let _ = write!(out, "\n    {}: {}", idx, cause);
        }
    }
    out
}

fn sources<'a>(err: &'a (dyn Error + 'static)) -> impl Iterator<Item = &'a (dyn Error + 'static)> {
    std::iter::successors(err.source(), |e| (*e).source())
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Converts errors into context data
#[derive(Clone, Default)]
pub struct ErrorContextExtractor {
    renderer: Option<Arc<dyn TraceRenderer>>,
}

impl ErrorContextExtractor {
    /// Extractor producing plain-text traces
    pub fn new() -> Self {
        Self { renderer: None }
    }

    /// Extractor producing traces through `renderer`
    pub fn with_renderer(renderer: Arc<dyn TraceRenderer>) -> Self {
        Self {
            renderer: Some(renderer),
        }
    }

    pub fn has_renderer(&self) -> bool {
        self.renderer.is_some()
    }

    pub fn render_trace(&self, err: &(dyn Error + 'static)) -> String {
        match &self.renderer {
            Some(renderer) => renderer.render_html(err),
            None => plain_text_trace(err),
        }
    }

    /// Derive `err_msg`/`trace`, plus `inner_err_msg`/`inner_trace` for
    /// the direct source only
    pub fn extract(&self, err: &(dyn Error + 'static)) -> ContextData {
        let mut data = ContextData::new()
            .with_field("err_msg", err.to_string())
            .with_field("trace", self.render_trace(err));

        if let Some(inner) = err.source() {
            data.add_field("inner_err_msg", inner.to_string());
            data.add_field("inner_trace", self.render_trace(inner));
        }

        data
    }
}

impl std::fmt::Debug for ErrorContextExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorContextExtractor")
            .field("html", &self.has_renderer())
            .finish()
    }
}
