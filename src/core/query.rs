//! Query parameters and pagination utilities

use serde::Serialize;

use crate::config::EngineConfig;
use crate::core::error::CrudError;
use crate::core::filter::FilterMap;
use crate::core::order::ORDER_KEYS;

/// Page size used when the caller supplies none (or a non-positive one)
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// A validated page window
///
/// # Example
/// ```rust,ignore
/// let page = PageRequest::new(0, -5);
/// assert_eq!((page.page(), page.size()), (1, 10));
/// assert_eq!(PageRequest::new(3, 20).offset(), 40);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    size: u64,
}

impl PageRequest {
    /// Clamp raw input: `page < 1` becomes 1, `size <= 0` becomes 10
    pub fn new(page: i64, size: i64) -> Self {
        Self::with_limits(page, size, DEFAULT_PAGE_SIZE, None)
    }

    /// Clamp raw input using the configured default and maximum size
    pub fn from_config(page: i64, size: i64, config: &EngineConfig) -> Self {
        Self::with_limits(page, size, config.default_size(), config.max_size)
    }

    fn with_limits(page: i64, size: i64, default_size: u64, max_size: Option<u64>) -> Self {
        let page = u64::try_from(page).ok().filter(|p| *p >= 1).unwrap_or(1);
        let mut size = u64::try_from(size)
            .ok()
            .filter(|s| *s >= 1)
            .unwrap_or(default_size);
        if let Some(max) = max_size.filter(|max| *max >= 1) {
            size = size.min(max);
        }

        Self { page, size }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Rows to skip: `(page - 1) * size`
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE as i64)
    }
}

/// One page of records plus the filtered total
#[derive(Debug, Clone, Serialize)]
pub struct PageResult<T> {
    /// Records on this page, at most `size` of them
    pub items: Vec<T>,

    /// Number of rows matching the filter, before pagination
    pub total: u64,

    /// Page number actually used (after clamping)
    pub page: u64,

    /// Page size actually used (after clamping)
    pub size: u64,
}

impl<T> PageResult<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page(),
            size: request.size(),
        }
    }

    /// Total number of pages for this result's page size
    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            0
        } else {
            self.total.div_ceil(self.size)
        }
    }
}

/// A list request decoded from query-string pairs
///
/// Reserved keys (`page`, `size` and the order keys) are pulled out; every
/// other key becomes a filter, in the order keys were first seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub page: i64,
    pub size: i64,
    pub orders: Vec<String>,
    pub filters: FilterMap,
}

impl ListQuery {
    /// Build a list request from decoded `(key, value)` pairs
    ///
    /// A `page` or `size` that is present but not an integer is rejected;
    /// a non-positive one is left for [`PageRequest`] to clamp. Blank
    /// filter values are removed, and so are keys left without values.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, CrudError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut page = None;
        let mut size = None;
        let mut order_values: [Vec<String>; ORDER_KEYS.len()] = Default::default();
        let mut filters = FilterMap::new();

        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref().trim());

            match key {
                "page" => {
                    if page.is_none() && !value.is_empty() {
                        page = Some(parse_integer("page", value)?);
                    }
                }
                "size" => {
                    if size.is_none() && !value.is_empty() {
                        size = Some(parse_integer("size", value)?);
                    }
                }
                _ => {
                    if let Some(slot) = ORDER_KEYS.iter().position(|k| *k == key) {
                        if !value.is_empty() {
                            order_values[slot].push(value.to_string());
                        }
                    } else if !value.is_empty() {
                        filters
                            .entry(key.to_string())
                            .or_default()
                            .push(value.to_string());
                    }
                }
            }
        }

        Ok(Self {
            page: page.unwrap_or(1),
            size: size.unwrap_or(0),
            orders: order_values.into_iter().flatten().collect(),
            filters,
        })
    }
}

fn parse_integer(name: &str, raw: &str) -> Result<i64, CrudError> {
    raw.parse::<i64>()
        .map_err(|_| CrudError::invalid_input(format!("{} must be an integer, got '{}'", name, raw)))
}
