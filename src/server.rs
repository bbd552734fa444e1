use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderMap},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::error::AnalyzeError;
use crate::models::{MealRecord, MediaType};
use crate::services::MealAnalyzer;

pub struct AppState {
    pub analyzer: Arc<dyn MealAnalyzer>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub meal: MealRecord,
    pub analyzed_at: DateTime<Utc>,
}

pub fn create_router(analyzer: Arc<dyn MealAnalyzer>) -> Router {
    let state = Arc::new(AppState { analyzer });

    Router::new()
        .route("/analyze", post(analyze_handler))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::disable()) // phone photos are often several MB
        .with_state(state)
}

/// Body is the raw image, `Content-Type` its media type (JPEG if absent).
async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<AnalyzeResponse>, AnalyzeError> {
    let media_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(essence)
        .unwrap_or_else(|| MediaType::default().as_mime().to_string());

    log::info!("🔔 Analyze request: {} bytes ({})", body.len(), media_type);

    match state.analyzer.analyze_bytes(&body, &media_type).await {
        Ok(meal) => Ok(Json(AnalyzeResponse {
            meal,
            analyzed_at: Utc::now(),
        })),
        Err(e) => {
            log::error!("❌ Analyze request failed: {}", e);
            Err(e)
        }
    }
}

/// `image/jpeg; charset=binary` -> `image/jpeg`
fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImageInput;
    use axum::http::{HeaderValue, StatusCode};
    use axum::response::IntoResponse;

    /// Accepts anything with a supported media type and returns a fixed meal.
    struct FixedAnalyzer;

    #[async_trait::async_trait]
    impl MealAnalyzer for FixedAnalyzer {
        async fn analyze(&self, input: &ImageInput) -> Result<MealRecord, AnalyzeError> {
            self.analyze_bytes(&[], &input.media_type).await
        }

        async fn analyze_bytes(
            &self,
            _image: &[u8],
            media_type: &str,
        ) -> Result<MealRecord, AnalyzeError> {
            media_type.parse::<MediaType>()?;
            Ok(MealRecord {
                name: "Menemen".to_string(),
                calories: 320.0,
                ..Default::default()
            })
        }
    }

    fn state() -> State<Arc<AppState>> {
        State(Arc::new(AppState {
            analyzer: Arc::new(FixedAnalyzer),
        }))
    }

    #[tokio::test]
    async fn test_analyze_defaults_to_jpeg() {
        let Json(response) = analyze_handler(state(), HeaderMap::new(), Bytes::from_static(b"img"))
            .await
            .unwrap();

        assert_eq!(response.meal.name, "Menemen");
        assert_eq!(response.meal.calories, 320.0);
    }

    #[tokio::test]
    async fn test_analyze_rejects_unsupported_content_type() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/gif"));

        let err = analyze_handler(state(), headers, Bytes::from_static(b"img"))
            .await
            .unwrap_err();

        assert_eq!(err.into_response().status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_analyze_ignores_content_type_parameters() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("image/jpeg; charset=binary"),
        );

        let Json(response) = analyze_handler(state(), headers, Bytes::from_static(b"img"))
            .await
            .unwrap();

        assert_eq!(response.meal.name, "Menemen");
    }

    #[test]
    fn test_essence() {
        assert_eq!(essence("image/png"), "image/png");
        assert_eq!(essence(" image/heic ; q=1"), "image/heic");
    }

    #[tokio::test]
    async fn test_router_accepts_large_photos() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = create_router(Arc::new(FixedAnalyzer));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let photo = vec![0u8; 5 * 1024 * 1024];
        let response = reqwest::Client::new()
            .post(format!("http://{}/analyze", addr))
            .header("content-type", "image/jpeg")
            .body(photo)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["meal"]["name"], "Menemen");
    }

    #[tokio::test]
    async fn test_health_check() {
        assert_eq!(health_check().await, "OK");
    }
}
