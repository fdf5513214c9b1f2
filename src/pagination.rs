//! Offset pagination over ordered sequences.
//!
//! A page covers the index range `[(page_number - 1) * page_size,
//! page_number * page_size)` of an already ordered source, clipped to the
//! source length. Requests past the end produce an empty page whose
//! metadata still describes the whole source.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page size used when the caller does not supply one.
pub const DEFAULT_PAGE_SIZE: usize = 10;
/// Larger requested page sizes are clamped to this value.
pub const MAX_PAGE_SIZE: usize = 50;
/// Header carrying serialized [`PageMetadata`] next to a paged body.
pub const PAGINATION_HEADER: &str = "X-Pagination";

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PagingError {
    #[error("page number must be at least 1")]
    InvalidPageNumber,
    #[error("page size must be at least 1")]
    InvalidPageSize,
}

/// Raw pagination query parameters as they arrive from a request.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagingParams {
    pub page_number: Option<i64>,
    pub page_size: Option<i64>,
}

/// Validated pagination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingRequest {
    page_number: usize,
    page_size: usize,
}

impl PagingRequest {
    /// Rejects zero values and clamps `page_size` to [`MAX_PAGE_SIZE`].
    pub fn new(page_number: usize, page_size: usize) -> Result<Self, PagingError> {
        if page_number == 0 {
            return Err(PagingError::InvalidPageNumber);
        }
        if page_size == 0 {
            return Err(PagingError::InvalidPageSize);
        }
        Ok(Self {
            page_number,
            page_size: page_size.min(MAX_PAGE_SIZE),
        })
    }

    pub const fn page_number(&self) -> usize {
        self.page_number
    }

    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Index of the first element of the page; saturates instead of
    /// overflowing so huge page numbers simply land past the end.
    pub const fn offset(&self) -> usize {
        (self.page_number - 1).saturating_mul(self.page_size)
    }
}

impl Default for PagingRequest {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl TryFrom<PagingParams> for PagingRequest {
    type Error = PagingError;

    fn try_from(params: PagingParams) -> Result<Self, Self::Error> {
        let page_number = match params.page_number {
            None => 1,
            Some(n) => usize::try_from(n).map_err(|_| PagingError::InvalidPageNumber)?,
        };
        let page_size = match params.page_size {
            None => DEFAULT_PAGE_SIZE,
            Some(n) => usize::try_from(n).map_err(|_| PagingError::InvalidPageSize)?,
        };
        Self::new(page_number, page_size)
    }
}

/// Metadata describing one page relative to the whole source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PageMetadata {
    pub total_count: usize,
    pub page_size: usize,
    pub current_page: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

impl PageMetadata {
    pub fn new(total_count: usize, request: PagingRequest) -> Self {
        let total_pages = total_count.div_ceil(request.page_size);
        let current_page = request.page_number;
        Self {
            total_count,
            page_size: request.page_size,
            current_page,
            total_pages,
            has_next: current_page < total_pages,
            has_previous: current_page > 1,
        }
    }

    /// JSON rendering for the [`PAGINATION_HEADER`] header.
    pub fn header_value(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// A bounded page of results plus its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct PagedSlice<T> {
    items: Vec<T>,
    metadata: PageMetadata,
}

impl<T> PagedSlice<T> {
    /// Wrap a page produced by an engine-native counted query.
    ///
    /// `items` must already be the requested window and `total_count` the
    /// size of the whole ordered source.
    pub fn new(mut items: Vec<T>, total_count: usize, request: PagingRequest) -> Self {
        items.truncate(request.page_size);
        Self {
            items,
            metadata: PageMetadata::new(total_count, request),
        }
    }

    /// Cut a page out of an ordered in-memory source.
    pub fn paginate<I>(source: I, request: PagingRequest) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let source = source.into_iter();
        let total_count = source.len();
        let items = source
            .skip(request.offset())
            .take(request.page_size)
            .collect();
        Self {
            items,
            metadata: PageMetadata::new(total_count, request),
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn metadata(&self) -> &PageMetadata {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn into_parts(self) -> (Vec<T>, PageMetadata) {
        (self.items, self.metadata)
    }

    /// Convert every item while keeping the metadata.
    pub fn map<U, F>(self, f: F) -> PagedSlice<U>
    where
        F: FnMut(T) -> U,
    {
        PagedSlice {
            items: self.items.into_iter().map(f).collect(),
            metadata: self.metadata,
        }
    }
}

impl<T> IntoIterator for PagedSlice<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a PagedSlice<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
