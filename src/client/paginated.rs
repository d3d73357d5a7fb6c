//! Page-accumulating fetch for collection endpoints.
//!
//! Collection responses look like
//! `{ "<field>": [...], "meta": { "<field>": { "page": 1, "page_count": 3 } } }`.
//! [`DirectoryClient::fetch_all`](crate::DirectoryClient::fetch_all) walks
//! pages from 1 until the metadata says the last page was reached or
//! enough results were collected.

use serde::Deserialize;
use serde_json::Value;

use super::request::RequestSpec;
use super::ClientInner;
use crate::{Error, Result};

/// Pagination metadata for one collection page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageMeta {
    /// Page returned by this response (1-based)
    pub page: u32,
    /// Total number of pages
    pub page_count: u32,
}

impl PageMeta {
    /// Check if there are more pages after this one.
    pub fn has_more(&self) -> bool {
        self.page < self.page_count
    }

    /// Read `meta.<field>` from a page response.
    pub fn from_response(response: &Value, field: &str) -> Result<Self> {
        let meta = response
            .get("meta")
            .and_then(|m| m.get(field))
            .ok_or_else(|| Error::UnexpectedResponse(format!("missing meta.{field}")))?;
        Ok(PageMeta::deserialize(meta)?)
    }
}

/// Running state of one `fetch_all` call.
#[derive(Debug)]
struct PageState {
    page: u32,
    page_size: u32,
    results: Vec<Value>,
    limit: Option<usize>,
}

impl PageState {
    fn new(default_page_size: u32, page_size: Option<u32>, limit: Option<usize>) -> Self {
        let mut page_size = page_size.unwrap_or(default_page_size);
        if let Some(limit) = limit {
            if limit < page_size as usize {
                page_size = limit as u32;
            }
        }

        Self {
            page: 1,
            page_size,
            results: Vec::new(),
            limit,
        }
    }

    fn page_spec(&self, base: &RequestSpec) -> RequestSpec {
        let mut spec = base.clone();
        spec.set_query("page", self.page);
        spec.set_query("page_size", self.page_size);
        spec
    }

    /// Take one page's results. Returns whether another page should be
    /// requested.
    fn absorb(&mut self, mut response: Value, field: &str) -> Result<bool> {
        let meta = PageMeta::from_response(&response, field)?;
        let items = match response.get_mut(field).map(Value::take) {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => {
                return Err(Error::UnexpectedResponse(format!("missing {field} array")))
            }
            Some(_) => {
                return Err(Error::UnexpectedResponse(format!("{field} is not an array")))
            }
        };

        self.results.extend(items);
        self.page += 1;

        Ok(meta.has_more() && !self.limit_reached())
    }

    fn limit_reached(&self) -> bool {
        self.limit.is_some_and(|limit| self.results.len() >= limit)
    }

    fn finish(mut self) -> Vec<Value> {
        if let Some(limit) = self.limit {
            self.results.truncate(limit);
        }
        self.results
    }
}

impl ClientInner {
    /// Fetch pages of `spec` and concatenate the `field` arrays in order.
    ///
    /// A `limit` below the page size shrinks the page size so a single
    /// request suffices. Any error drops the pages collected so far.
    pub(crate) async fn fetch_all(
        &self,
        spec: &RequestSpec,
        field: &str,
        limit: Option<usize>,
        page_size: Option<u32>,
    ) -> Result<Vec<Value>> {
        if limit == Some(0) {
            return Ok(Vec::new());
        }

        let mut state = PageState::new(self.config.page_size, page_size, limit);
        loop {
            let response = self.execute(&state.page_spec(spec)).await?.json()?;
            let more = state.absorb(response, field)?;
            tracing::debug!(
                field,
                page = state.page - 1,
                collected = state.results.len(),
                more,
                "fetched page"
            );
            if !more {
                break;
            }
        }

        Ok(state.finish())
    }
}
