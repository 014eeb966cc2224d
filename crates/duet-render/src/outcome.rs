//! Request locations, components and the four resolution outcomes.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Path and query of one request. `search` is empty or starts with `?`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub pathname: String,
    pub search: String,
}

impl Location {
    pub fn new(pathname: impl Into<String>, search: impl Into<String>) -> Self {
        let search = search.into();
        let search = if search.is_empty() || search.starts_with('?') {
            search
        } else {
            format!("?{search}")
        };
        Self {
            pathname: pathname.into(),
            search,
        }
    }

    /// Split a request target such as `/foo?a=1`. Fragments are dropped.
    pub fn parse(url: &str) -> Self {
        let url = url.split_once('#').map_or(url, |(before, _)| before);
        match url.split_once('?') {
            Some((path, query)) if !query.is_empty() => Self::new(path, format!("?{query}")),
            Some((path, _)) => Self::new(path, ""),
            None => Self::new(url, ""),
        }
    }

    pub fn href(&self) -> String {
        format!("{}{}", self.pathname, self.search)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pathname, self.search)
    }
}

/// Something that renders to an HTML fragment for a matched route.
pub trait Component: Send + Sync {
    fn render_to_string(&self, props: &RenderProps) -> String;
}

impl<F> Component for F
where
    F: Fn(&RenderProps) -> String + Send + Sync,
{
    fn render_to_string(&self, props: &RenderProps) -> String {
        self(props)
    }
}

/// Everything a matched component needs to render.
#[derive(Clone)]
pub struct RenderProps {
    pub location: Location,
    /// The pattern that matched, as declared
    pub pattern: String,
    pub params: BTreeMap<String, String>,
    pub component: Arc<dyn Component>,
}

impl RenderProps {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn render(&self) -> String {
        self.component.render_to_string(self)
    }
}

impl fmt::Debug for RenderProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderProps")
            .field("location", &self.location)
            .field("pattern", &self.pattern)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Result of resolving one location. Produced fresh per request and consumed once.
#[derive(Debug, Clone)]
pub enum RenderOutcome {
    Error(String),
    Redirect(Location),
    Matched(RenderProps),
    NotFound,
}

impl RenderOutcome {
    pub fn error(message: impl Into<String>) -> Self {
        RenderOutcome::Error(message.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RenderOutcome::Error(_) => "error",
            RenderOutcome::Redirect(_) => "redirect",
            RenderOutcome::Matched(_) => "matched",
            RenderOutcome::NotFound => "not-found",
        }
    }
}
