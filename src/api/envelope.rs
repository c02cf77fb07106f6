//! Response envelopes of the content API.
//!
//! Lists arrive as `{status, data: [...], total, totalPages, currentPage}`
//! and single records as `{status, data: {article: {...}}}`, but several
//! endpoints nest differently (`data` holding the record itself, the record
//! at the top level, lists under `data.articles` or `data.items`). The
//! helpers here accept all of those.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::forms::FieldErrors;

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub total_pages: u32,
    pub current_page: u32,
}

impl<T> Page<T> {
    pub fn single(items: Vec<T>) -> Self {
        Self {
            total: items.len() as u64,
            total_pages: 1,
            current_page: 1,
            items,
        }
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// Envelopes with a failing `status` are rejections even on HTTP 200.
pub fn ensure_success(http_status: u16, body: &Value) -> Result<()> {
    match body.get("status").and_then(Value::as_str) {
        Some("fail") | Some("error") => Err(AppError::Rejected {
            status: http_status,
            errors: FieldErrors::from_server_body(body),
        }),
        _ => Ok(()),
    }
}

fn looks_like_record(value: &Value) -> bool {
    value.get("id").is_some() || value.get("_id").is_some()
}

fn find_entity<'a>(body: &'a Value, key: &str) -> Option<&'a Value> {
    let data = body.get("data");
    data.and_then(|d| d.get(key))
        .or_else(|| body.get(key))
        .or_else(|| data.filter(|d| looks_like_record(d)))
        .or_else(|| Some(body).filter(|b| looks_like_record(b)))
}

/// Extracts one record nested under `key`.
pub fn entity<T: DeserializeOwned>(body: &Value, key: &str) -> Result<T> {
    let value = find_entity(body, key)
        .ok_or_else(|| AppError::Api(format!("response has no '{key}' record")))?;
    Ok(serde_json::from_value(value.clone())?)
}

fn find_list<'a>(body: &'a Value, key: &str) -> Option<&'a Vec<Value>> {
    let data = body.get("data");
    data.and_then(Value::as_array)
        .or_else(|| data.and_then(|d| d.get(key)).and_then(Value::as_array))
        .or_else(|| data.and_then(|d| d.get("items")).and_then(Value::as_array))
        .or_else(|| body.get(key).and_then(Value::as_array))
        .or_else(|| body.as_array())
}

/// Extracts a list nested under `key`. Records that fail to parse are
/// skipped with a warning rather than failing the whole page.
pub fn list<T: DeserializeOwned>(body: &Value, key: &str) -> Result<Vec<T>> {
    let values =
        find_list(body, key).ok_or_else(|| AppError::Api(format!("response has no '{key}' list")))?;
    Ok(values
        .iter()
        .filter_map(|v| match serde_json::from_value::<T>(v.clone()) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!("Skipping malformed {} record: {}", key, e);
                None
            }
        })
        .collect())
}

fn number(body: &Value, key: &str) -> Option<u64> {
    let field = body
        .get(key)
        .or_else(|| body.get("data").and_then(|d| d.get(key)))?;
    field
        .as_u64()
        .or_else(|| field.as_str().and_then(|s| s.parse().ok()))
}

pub fn page<T: DeserializeOwned>(body: &Value, key: &str) -> Result<Page<T>> {
    let items = list(body, key)?;
    let total = number(body, "total").unwrap_or(items.len() as u64);
    let total_pages = number(body, "totalPages").unwrap_or(1) as u32;
    let current_page = number(body, "currentPage").unwrap_or(1) as u32;
    Ok(Page {
        items,
        total,
        total_pages: total_pages.max(1),
        current_page: current_page.max(1),
    })
}
