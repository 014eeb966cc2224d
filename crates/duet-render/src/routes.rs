//! Ordered route table backed by matchit patterns.
//!
//! matchit picks the most specific route, but the table contract is
//! declaration order with first match winning. Each pattern therefore gets a
//! single-route matchit router and the table walks them in order.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{RenderError, Result};
use crate::outcome::{Component, Location, RenderOutcome, RenderProps};
use crate::resolver::RouteResolver;

/// A path pattern in matchit syntax: `/users/{id}`, `/assets/{*rest}`.
#[derive(Clone)]
pub struct RoutePattern {
    raw: String,
    router: matchit::Router<()>,
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> Result<Self> {
        if !pattern.starts_with('/') {
            return Err(RenderError::InvalidPattern {
                pattern: pattern.to_string(),
                message: "patterns must start with '/'".to_string(),
            });
        }

        let mut router = matchit::Router::new();
        router
            .insert(pattern, ())
            .map_err(|e| RenderError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            raw: pattern.to_string(),
            router,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Captured parameters when `path` matches.
    pub fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let matched = self.router.at(path).ok()?;
        Some(
            matched
                .params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl fmt::Debug for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RoutePattern").field(&self.raw).finish()
    }
}

#[derive(Clone)]
enum RouteTarget {
    Component(Arc<dyn Component>),
    /// Target path; may reference captured `{param}`s of the source pattern
    Redirect(String),
}

#[derive(Clone)]
struct RouteEntry {
    pattern: RoutePattern,
    target: RouteTarget,
}

/// Read-only for the process lifetime once built.
#[derive(Clone)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.pattern.as_str())
    }

    /// Synchronous resolution; [`RouteResolver::resolve`] delegates here.
    pub fn match_location(&self, location: &Location) -> RenderOutcome {
        if !location.pathname.starts_with('/') {
            return RenderOutcome::error(format!(
                "Invalid location '{}': paths must start with '/'",
                location
            ));
        }

        for entry in &self.entries {
            let Some(params) = entry.pattern.matches(&location.pathname) else {
                continue;
            };

            return match &entry.target {
                RouteTarget::Component(component) => RenderOutcome::Matched(RenderProps {
                    location: location.clone(),
                    pattern: entry.pattern.as_str().to_string(),
                    params,
                    component: Arc::clone(component),
                }),
                RouteTarget::Redirect(to) => {
                    RenderOutcome::Redirect(redirect_location(to, &params, location))
                }
            };
        }

        RenderOutcome::NotFound
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.patterns()).finish()
    }
}

#[async_trait]
impl RouteResolver for RouteTable {
    async fn resolve(&self, location: &Location) -> RenderOutcome {
        self.match_location(location)
    }
}

/// Collects routes in declaration order; patterns are validated by [`build`](Self::build).
#[derive(Default)]
pub struct RouteTableBuilder {
    entries: Vec<(String, RouteTarget)>,
}

impl RouteTableBuilder {
    pub fn route(mut self, pattern: impl Into<String>, component: impl Component + 'static) -> Self {
        self.entries
            .push((pattern.into(), RouteTarget::Component(Arc::new(component))));
        self
    }

    pub fn redirect(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.entries
            .push((from.into(), RouteTarget::Redirect(to.into())));
        self
    }

    pub fn build(self) -> Result<RouteTable> {
        let entries = self
            .entries
            .into_iter()
            .map(|(pattern, target)| {
                if let RouteTarget::Redirect(to) = &target {
                    if !to.starts_with('/') {
                        return Err(RenderError::InvalidPattern {
                            pattern: to.clone(),
                            message: "redirect targets must start with '/'".to_string(),
                        });
                    }
                }
                Ok(RouteEntry {
                    pattern: RoutePattern::parse(&pattern)?,
                    target,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RouteTable { entries })
    }
}

/// Fill `{name}` / `{*name}` placeholders in `target` and carry the request
/// query over unless the target has its own.
fn redirect_location(target: &str, params: &BTreeMap<String, String>, from: &Location) -> Location {
    let mut path = String::with_capacity(target.len());
    let mut rest = target;

    while let Some(open) = rest.find('{') {
        path.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            path.push_str(&rest[open..]);
            rest = "";
            break;
        };
        let name = after[..close].trim_start_matches('*');
        match params.get(name) {
            Some(value) => path.push_str(value),
            None => path.push_str(&rest[open..open + close + 2]),
        }
        rest = &after[close + 1..];
    }
    path.push_str(rest);

    match path.split_once('?') {
        Some((pathname, query)) => Location::new(pathname, query),
        None => Location::new(path, from.search.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(name: &'static str) -> impl Component + 'static {
        move |_: &RenderProps| name.to_string()
    }

    #[test]
    fn first_declared_match_wins() {
        let table = RouteTable::builder()
            .route("/users/{id}", page("user"))
            .route("/users/me", page("me"))
            .build()
            .unwrap();

        match table.match_location(&Location::parse("/users/me")) {
            RenderOutcome::Matched(props) => {
                assert_eq!(props.pattern, "/users/{id}");
                assert_eq!(props.param("id"), Some("me"));
                assert_eq!(props.render(), "user");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unmatched_path_is_not_found() {
        let table = RouteTable::builder().route("/", page("home")).build().unwrap();
        assert!(matches!(
            table.match_location(&Location::parse("/missing")),
            RenderOutcome::NotFound
        ));
    }

    #[test]
    fn redirect_interpolates_params_and_inherits_query() {
        let params = BTreeMap::from([("id".to_string(), "42".to_string())]);
        let from = Location::parse("/u/42?tab=posts");
        assert_eq!(
            redirect_location("/users/{id}", &params, &from).href(),
            "/users/42?tab=posts"
        );
        assert_eq!(
            redirect_location("/users/{id}?tab=about", &params, &from).href(),
            "/users/42?tab=about"
        );
        assert_eq!(redirect_location("/x/{missing}", &params, &from).pathname, "/x/{missing}");
    }

    #[test]
    fn catch_all_param_is_substituted() {
        let table = RouteTable::builder()
            .redirect("/old/{*rest}", "/new/{*rest}")
            .build()
            .unwrap();
        match table.match_location(&Location::parse("/old/a/b")) {
            RenderOutcome::Redirect(to) => assert_eq!(to.href(), "/new/a/b"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn relative_location_is_a_resolution_error() {
        let table = RouteTable::builder().route("/", page("home")).build().unwrap();
        assert!(matches!(
            table.match_location(&Location::parse("foo")),
            RenderOutcome::Error(_)
        ));
    }

    #[test]
    fn invalid_patterns_fail_to_build() {
        assert!(matches!(
            RouteTable::builder().route("users", page("x")).build(),
            Err(RenderError::InvalidPattern { .. })
        ));
        assert!(RouteTable::builder().route("/a/{", page("x")).build().is_err());
        assert!(RouteTable::builder().redirect("/a", "b").build().is_err());
    }
}
