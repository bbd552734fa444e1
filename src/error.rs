use thiserror::Error;

/// Every way a single meal analysis can fail. None of these are retried.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to read image: {0}")]
    ImageRead(#[from] std::io::Error),

    #[error("AI request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("AI service error ({status}): {message}")]
    UpstreamError { status: u16, message: String },

    #[error("AI service returned no content")]
    EmptyResponse,

    #[error("Could not parse meal data from AI response: {raw}")]
    MalformedPayload { raw: String },
}

#[cfg(feature = "http-server")]
mod response {
    use super::AnalyzeError;
    use axum::{
        http::StatusCode,
        response::{IntoResponse, Response},
        Json,
    };

    impl AnalyzeError {
        pub fn status_code(&self) -> StatusCode {
            match self {
                AnalyzeError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                AnalyzeError::EmptyResponse | AnalyzeError::MalformedPayload { .. } => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                AnalyzeError::UpstreamError { .. } | AnalyzeError::Transport(_) => {
                    StatusCode::BAD_GATEWAY
                }
                AnalyzeError::ImageRead(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
    }

    impl IntoResponse for AnalyzeError {
        fn into_response(self) -> Response {
            let status = self.status_code();
            let body = serde_json::json!({ "error": self.to_string() });
            (status, Json(body)).into_response()
        }
    }
}
