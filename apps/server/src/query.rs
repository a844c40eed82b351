//! URL query-state helpers.
//!
//! The browser's query string is the only state a table view persists:
//! page (`p`), `page_size`, `ordering`, `<column>__icontains` filters,
//! `mapping_status__value__in` facets and the `hidden` tab. These helpers
//! translate that state to and from backend query strings.

use serde::Serialize;
use std::borrow::Cow;
use std::fmt::Display;
use utoipa::ToSchema;

/// Percent-encode one query component.
fn encode_component(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

fn decode_component(value: &str) -> String {
    let spaced = value.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(Cow::into_owned)
        .unwrap_or(spaced)
}

/// Serialize filter/sort/page pairs into a query string.
///
/// Pairs whose value is `None` are skipped. Values are percent-encoded, keys
/// are written as given. An empty input yields `""`.
pub fn obj_to_query<K, V, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (K, Option<V>)>,
    K: AsRef<str>,
    V: Display,
{
    pairs
        .into_iter()
        .filter_map(|(key, value)| {
            value.map(|v| format!("{}={}", key.as_ref(), encode_component(&v.to_string())))
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Ordered query-string multimap, the server-side twin of `URLSearchParams`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pairs: Vec<(String, String)>,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query string, with or without the leading `?`.
    pub fn parse(query: &str) -> Self {
        let pairs = query
            .trim_start_matches('?')
            .split('&')
            .filter(|part| !part.is_empty())
            .map(|part| match part.split_once('=') {
                Some((k, v)) => (decode_component(k), decode_component(v)),
                None => (decode_component(part), String::new()),
            })
            .collect();
        Self { pairs }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == name)
    }

    /// Replace the first occurrence of `name` and drop the others.
    /// Appends when `name` is absent.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.pairs.iter().position(|(k, _)| k == name) {
            Some(first) => {
                self.pairs[first].1 = value;
                let mut index = 0;
                self.pairs.retain(|(k, _)| {
                    let keep = index <= first || k != name;
                    index += 1;
                    keep
                });
            }
            None => self.pairs.push((name.to_string(), value)),
        }
    }

    pub fn append(&mut self, name: &str, value: impl Into<String>) {
        self.pairs.push((name.to_string(), value.into()));
    }

    /// Remove every occurrence of `name`.
    pub fn delete(&mut self, name: &str) {
        self.pairs.retain(|(k, _)| k != name);
    }

    /// Fill in `defaults` for keys the current parameters do not carry.
    pub fn with_defaults<K, V>(mut self, defaults: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, value) in defaults {
            if !self.contains(key.as_ref()) {
                self.append(key.as_ref(), value);
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serialize back into a query string (no leading `?`).
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl std::fmt::Display for SearchParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

/// Options for a client-side navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Reset the scroll position after navigating.
    pub scroll: bool,
}

/// Something that can move the browser to a new URL without a full reload.
pub trait Navigator {
    fn push(&mut self, url: &str, options: NavigateOptions);
}

/// Navigator that records the target so a handler can answer with a redirect.
#[derive(Debug, Clone, Default)]
pub struct RedirectNavigator {
    base_path: String,
    location: Option<String>,
    options: Option<NavigateOptions>,
}

impl RedirectNavigator {
    /// `base_path` is the page the relative `?query` push resolves against.
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            location: None,
            options: None,
        }
    }

    /// Absolute location of the last push.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn options(&self) -> Option<NavigateOptions> {
        self.options
    }
}

impl Navigator for RedirectNavigator {
    fn push(&mut self, url: &str, options: NavigateOptions) {
        let location = if url.starts_with('?') {
            format!("{}{}", self.base_path, url)
        } else {
            url.to_string()
        };
        self.location = Some(location);
        self.options = Some(options);
    }
}

/// Merge one parameter into the current query and navigate to the result.
///
/// An empty `value` removes `name`; otherwise it replaces any existing value.
/// Navigation keeps the scroll position. Returns the new query string.
pub fn navigate_with_search_param<N: Navigator + ?Sized>(
    name: &str,
    value: &str,
    navigator: &mut N,
    params: &SearchParams,
) -> String {
    let mut current = params.clone();
    if value.is_empty() {
        current.delete(name);
    } else {
        current.set(name, value);
    }

    let query = current.to_query_string();
    navigator.push(&format!("?{query}"), NavigateOptions { scroll: false });
    query
}

/// Append `hidden=false` unless the filter already picks a tab.
pub fn with_hidden_default(filter: &str) -> String {
    if filter.contains("hidden") {
        filter.to_string()
    } else if filter.is_empty() {
        "hidden=false".to_string()
    } else {
        format!("{filter}&hidden=false")
    }
}

/// Sort direction of an `ordering` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Typed view over the well-known table-view parameters.
#[derive(Debug, Clone)]
pub struct ViewQuery {
    params: SearchParams,
}

impl ViewQuery {
    /// Parse the request query and apply the default page size.
    pub fn new(query: &str, default_page_size: u32) -> Self {
        let params =
            SearchParams::parse(query).with_defaults([("page_size", default_page_size.to_string())]);
        Self { params }
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// Current page, starting at 1.
    pub fn page(&self) -> u32 {
        self.params
            .get("p")
            .and_then(|p| p.parse().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1)
    }

    pub fn page_size(&self) -> Option<u32> {
        self.params.get("page_size").and_then(|p| p.parse().ok())
    }

    /// Sort column and direction; a leading `-` means descending.
    pub fn ordering(&self) -> Option<(&str, SortDirection)> {
        let ordering = self.params.get("ordering").filter(|o| !o.is_empty())?;
        Some(match ordering.strip_prefix('-') {
            Some(column) => (column, SortDirection::Descending),
            None => (ordering, SortDirection::Ascending),
        })
    }

    /// Substring filter on `column` (`<column>__icontains`).
    pub fn icontains(&self, column: &str) -> Option<&str> {
        self.params
            .get(&format!("{column}__icontains"))
            .filter(|v| !v.is_empty())
    }

    /// Selected mapping status facets (`mapping_status__value__in`).
    pub fn mapping_statuses(&self) -> Vec<&str> {
        self.params
            .get("mapping_status__value__in")
            .map(|v| v.split(',').filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }

    /// `Some(true)` on the archived tab, `Some(false)` on the active tab.
    pub fn hidden(&self) -> Option<bool> {
        match self.params.get("hidden") {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        }
    }

    /// Query string forwarded to the backend list endpoint.
    pub fn backend_filter(&self) -> String {
        self.params.to_query_string()
    }
}
