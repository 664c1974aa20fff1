//! The `{success, message?, data?}` envelope every endpoint answers with.

use domains::Page;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// Paging block attached to list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u64,
    pub has_more: bool,
}

impl<T> From<&Page<T>> for Pagination {
    fn from(page: &Page<T>) -> Self {
        Self {
            page: page.page,
            limit: page.limit,
            total: page.total,
            pages: page.pages(),
            has_more: page.has_more(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::PageRequest;
    use serde_json::json;

    #[test]
    fn envelopes_omit_empty_parts() {
        let ok = serde_json::to_value(ApiResponse::ok(json!({"n": 1}))).unwrap();
        assert_eq!(ok, json!({"success": true, "data": {"n": 1}}));

        let err = serde_json::to_value(ApiResponse::error("nope")).unwrap();
        assert_eq!(err, json!({"success": false, "message": "nope"}));
    }

    #[test]
    fn pagination_reports_remaining_pages() {
        let page = Page::new(vec![1, 2], 5, PageRequest::new(Some(2), Some(2), 10));
        let pagination = serde_json::to_value(Pagination::from(&page)).unwrap();
        assert_eq!(
            pagination,
            json!({"page": 2, "limit": 2, "total": 5, "pages": 3, "hasMore": true})
        );
    }
}
