//! Page-by-page accumulation of IG history endpoints.
//!
//! IG's `/history/*` endpoints return one page per call together with a
//! `metadata.pageData` block. [`PageCursor`] walks `pageNumber` from 1
//! until the server reports no further pages.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::http::{ClientInner, Method};
use crate::{ApiVersion, Error, Result};

/// Default number of records per history page.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Page metadata from a history response.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData {
    /// Page just returned (1-indexed)
    #[serde(default)]
    pub page_number: u32,
    /// Records per page
    #[serde(default)]
    pub page_size: u32,
    /// Total number of pages; 0 when the range is empty
    #[serde(default)]
    pub total_pages: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Metadata {
    #[serde(default)]
    page_data: PageData,
}

/// Where a history fetch stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCursor {
    /// The next request asks for this page.
    Fetching {
        /// 1-indexed page number
        page: u32,
    },
    /// No further pages.
    Done,
}

impl PageCursor {
    /// Cursor for the first page.
    pub fn start() -> Self {
        PageCursor::Fetching { page: 1 }
    }

    /// Move past the page just fetched given the server's `totalPages`.
    pub fn advance(self, total_pages: u32) -> Self {
        match self {
            PageCursor::Fetching { page } if total_pages != 0 && page < total_pages => {
                PageCursor::Fetching { page: page + 1 }
            }
            _ => PageCursor::Done,
        }
    }
}

/// Fetch every page of `endpoint` and return the records found under
/// `key`, in page order.
///
/// `query` must serialize to a JSON object; `pageNumber` is added to it
/// for each request. Any non-200 page fails the whole fetch.
pub(crate) async fn fetch_all_pages<Q: Serialize>(
    inner: &ClientInner,
    endpoint: &str,
    version: ApiVersion,
    key: &str,
    query: &Q,
) -> Result<Vec<Value>> {
    let base: Map<String, Value> = match serde_json::to_value(query)? {
        Value::Object(map) => map,
        other => {
            return Err(Error::InvalidInput(format!(
                "history query must be a JSON object, got {other}"
            )))
        }
    };

    let mut records = Vec::new();
    let mut cursor = PageCursor::start();

    while let PageCursor::Fetching { page } = cursor {
        let mut params = base.clone();
        params.insert("pageNumber".to_string(), Value::from(page));
        let params = Value::Object(params);

        let body: Value = inner
            .request(Method::Get, endpoint, version, Some(&params))
            .await?
            .json(endpoint)?;

        let page_records = match body.get(key) {
            Some(Value::Array(items)) => items.clone(),
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                return Err(Error::UnexpectedResponse(format!(
                    "{endpoint}: `{key}` is not a list: {other}"
                )))
            }
        };

        let total_pages = body
            .get("metadata")
            .map(|m| serde_json::from_value::<Metadata>(m.clone()))
            .transpose()?
            .map(|m| m.page_data.total_pages)
            .unwrap_or(0);

        tracing::debug!(
            endpoint,
            page,
            total_pages,
            records = page_records.len(),
            "Fetched history page"
        );

        records.extend(page_records);
        cursor = cursor.advance(total_pages);
    }

    Ok(records)
}
