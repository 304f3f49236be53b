//! Page requests, sorting and paged results

use crate::core::field::Fields;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// One sort key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub field: String,
    pub direction: Direction,
}

/// Ordered list of sort keys; empty means "unsorted"
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sort(pub Vec<SortOrder>);

impl Sort {
    pub fn unsorted() -> Self {
        Self::default()
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self(vec![SortOrder {
            field: field.into(),
            direction: Direction::Asc,
        }])
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self(vec![SortOrder {
            field: field.into(),
            direction: Direction::Desc,
        }])
    }

    /// Append a tie-breaking key
    pub fn then(mut self, other: Sort) -> Self {
        self.0.extend(other.0);
        self
    }

    pub fn is_unsorted(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse `field`, `field:asc` or `field:desc`, comma separated
    ///
    /// # Example
    /// ```
    /// use keeper::core::query::Sort;
    /// let sort = Sort::parse("feeding_date:desc,id");
    /// assert_eq!(sort.0.len(), 2);
    /// ```
    pub fn parse(input: &str) -> Self {
        let orders = input
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                let (field, direction) = match part.split_once(':') {
                    Some((field, dir)) if dir.eq_ignore_ascii_case("desc") => {
                        (field, Direction::Desc)
                    }
                    Some((field, _)) => (field, Direction::Asc),
                    None => (part, Direction::Asc),
                };
                SortOrder {
                    field: field.trim().to_string(),
                    direction,
                }
            })
            .collect();
        Self(orders)
    }

    /// Compare two values field by field
    pub fn compare<T: Fields>(&self, a: &T, b: &T) -> Ordering {
        for order in &self.0 {
            let left = a.field_value(&order.field);
            let right = b.field_value(&order.field);
            let ordering = match (left, right) {
                (Some(l), Some(r)) => l.compare(&r),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            let ordering = match order.direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

/// A request for one page of results
///
/// Pages are numbered from 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
    #[serde(default)]
    pub sort: Sort,
}

impl PageRequest {
    pub fn new(page: usize, size: usize) -> Self {
        Self {
            page,
            size,
            sort: Sort::unsorted(),
        }
    }

    pub fn sorted(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    /// Index of the first element of this page
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }

    /// Clamp the size to `1..=max_size`
    pub fn clamped(mut self, max_size: usize) -> Self {
        self.size = self.size.clamp(1, max_size.max(1));
        self
    }

    /// Use `fallback` when no sort was requested
    pub fn or_sort(mut self, fallback: &Sort) -> Self {
        if self.sort.is_unsorted() {
            self.sort = fallback.clone();
        }
        self
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, 20)
    }
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Current page number (starts at 0)
    pub page: usize,

    /// Number of items per page
    pub size: usize,

    /// Total number of items matching the query
    pub total: usize,

    /// Total number of pages
    pub total_pages: usize,

    /// Whether there is a next page
    pub has_next: bool,

    /// Whether there is a previous page
    pub has_prev: bool,
}

impl PaginationMeta {
    /// Create pagination metadata from calculation
    pub fn new(page: usize, size: usize, total: usize) -> Self {
        // Ensure size is at least 1 to avoid division by zero
        let size = size.max(1);
        let total_pages = if total == 0 { 0 } else { total.div_ceil(size) };
        let start = page.saturating_mul(size);

        Self {
            page,
            size,
            total,
            total_pages,
            has_next: start.saturating_add(size) < total,
            has_prev: page > 0,
        }
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub meta: PaginationMeta,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total: usize) -> Self {
        Self {
            content,
            meta: PaginationMeta::new(request.page, request.size, total),
        }
    }

    /// Cut the requested page out of an already sorted list
    ///
    /// A page past the end is empty.
    pub fn from_slice(items: Vec<T>, request: &PageRequest) -> Self {
        let total = items.len();
        let content = items
            .into_iter()
            .skip(request.offset())
            .take(request.size.max(1))
            .collect();
        Self::new(content, request, total)
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }
}
