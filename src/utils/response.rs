use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Envelope status tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Uniform response body shared by every endpoint
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: Status,
    pub message: String,
    pub data: T,
    pub errors: Vec<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
            data,
            errors: Vec::new(),
        }
    }
}

impl ApiResponse<Vec<()>> {
    pub fn error(message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
            data: Vec::new(),
            errors,
        }
    }
}

/// Successful response: status code plus envelope
#[derive(Debug)]
pub struct Envelope<T> {
    code: StatusCode,
    body: ApiResponse<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            code: StatusCode::OK,
            body: ApiResponse::success(message, data),
        }
    }

    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self {
            code: StatusCode::CREATED,
            body: ApiResponse::success(message, data),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.code
    }
}

/// Success envelope with `data: []`
pub type Empty = Envelope<Vec<()>>;

impl Envelope<Vec<()>> {
    pub fn done(message: impl Into<String>) -> Self {
        Self::ok(message, Vec::new())
    }

    pub fn done_created(message: impl Into<String>) -> Self {
        Self::created(message, Vec::new())
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (self.code, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_has_empty_errors() {
        let body = serde_json::to_value(ApiResponse::success("ok", vec![1, 2])).unwrap();
        assert_eq!(
            body,
            json!({"status": "success", "message": "ok", "data": [1, 2], "errors": []})
        );
    }

    #[test]
    fn error_envelope_has_empty_data() {
        let body =
            serde_json::to_value(ApiResponse::error("nope", vec!["why".to_string()])).unwrap();
        assert_eq!(body["status"], "error");
        assert_eq!(body["data"], json!([]));
        assert_eq!(body["errors"], json!(["why"]));
    }

    #[test]
    fn created_uses_201() {
        assert_eq!(Envelope::done_created("made").status_code(), StatusCode::CREATED);
        assert_eq!(Envelope::done("fine").status_code(), StatusCode::OK);
    }
}
