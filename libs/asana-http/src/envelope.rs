use serde::{Deserialize, Serialize};

/// `{"data": ...}` wrapper around a single object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

impl<T> DataEnvelope<T> {
    #[must_use]
    pub fn new(data: T) -> Self {
        Self { data }
    }

    #[must_use]
    pub fn into_inner(self) -> T {
        self.data
    }
}

/// Cursor for the next page of a list call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

/// Paginated list envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page: Option<PageInfo>,
}

impl<T> ListResponse<T> {
    /// Offset to pass to the next call, if there is another page.
    #[must_use]
    pub fn next_offset(&self) -> Option<&str> {
        self.next_page.as_ref()?.offset.as_deref()
    }
}
