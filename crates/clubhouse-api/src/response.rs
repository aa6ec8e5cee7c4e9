//! Success envelope shared by every endpoint: `{ success, message, data, meta? }`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use clubhouse_common::pagination::{PageMeta, Paginated};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            meta: None,
            status: StatusCode::OK,
        }
    }

    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::ok(message, data)
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn page(message: impl Into<String>, page: Paginated<T>) -> Self {
        Self {
            meta: Some(page.meta),
            ..Self::ok(message, page.data)
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clubhouse_common::pagination::PageWindow;

    #[test]
    fn test_plain_envelope_omits_meta() {
        let body = serde_json::to_value(ApiResponse::ok("Done", 7)).unwrap();
        assert_eq!(body, serde_json::json!({ "success": true, "message": "Done", "data": 7 }));
    }

    #[test]
    fn test_page_envelope_carries_meta() {
        let page = Paginated::new(&PageWindow::default(), 25, vec!["a", "b"]);
        let body = serde_json::to_value(ApiResponse::page("Listed", page)).unwrap();
        assert_eq!(body["meta"]["total"], 25);
        assert_eq!(body["meta"]["total_pages"], 3);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_created_status() {
        assert_eq!(ApiResponse::created("Made", ()).into_response().status(), StatusCode::CREATED);
    }
}
