use serde::{Deserialize, Serialize};

use super::ai_service::MealAnalyzer;
use super::encoding::encode_image;
use super::extract::extract_meal_record;
use crate::config::AnalyzerConfig;
use crate::error::AnalyzeError;
use crate::models::{ImageInput, MealRecord, MediaType};

const MEAL_PROMPT: &str = "You are a nutrition expert. Identify the food in this photo and \
estimate its nutrition for the portion shown. Return ONLY a JSON object, with no other text, \
using exactly these keys: name (string), description (string), calories (number, kcal), \
protein_g (number), carbs_g (number), fat_g (number).";

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl GenerateResponse {
    fn into_first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

/// Gemini `generateContent` client that turns a meal photo into a `MealRecord`.
///
/// One request per call, no retry and no client-side timeout. Holds no
/// mutable state, so one instance can serve concurrent calls.
pub struct GeminiService {
    config: AnalyzerConfig,
    client: reqwest::Client,
}

impl GeminiService {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base, self.config.model
        )
    }

    fn build_request(image: &[u8], media_type: MediaType) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: MEAL_PROMPT.to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: media_type.as_mime().to_string(),
                            data: encode_image(image),
                        },
                    },
                ],
            }],
        }
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String, AnalyzeError> {
        log::info!("🤖 Sending request to Gemini with model: {}", self.config.model);

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .json(request)
            .send()
            .await?;

        let status = response.status();
        log::debug!("📥 Gemini response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            log::error!("❌ Gemini API error response: {}", error_text);
            return Err(AnalyzeError::UpstreamError {
                status: status.as_u16(),
                message: upstream_message(status, &error_text),
            });
        }

        let response_text = response.text().await?;
        log::debug!("📄 Raw Gemini response size: {} bytes", response_text.len());

        let parsed: GenerateResponse = match serde_json::from_str(&response_text) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::error!("❌ Unexpected Gemini response envelope: {}", e);
                return Err(AnalyzeError::EmptyResponse);
            }
        };

        parsed.into_first_text().ok_or(AnalyzeError::EmptyResponse)
    }
}

/// Upstream `error.message` when the body carries one, else the status text.
fn upstream_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .and_then(|error| error.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.as_u16().to_string())
        })
}

#[async_trait::async_trait]
impl MealAnalyzer for GeminiService {
    async fn analyze(&self, input: &ImageInput) -> Result<MealRecord, AnalyzeError> {
        log::debug!("📸 Starting image analysis for: {}", input.path.display());

        // Reject before touching the file or the network.
        let media_type: MediaType = input.media_type.parse()?;

        let image_data = tokio::fs::read(&input.path).await?;
        log::debug!("📊 Image file size: {} bytes", image_data.len());

        self.analyze_bytes(&image_data, media_type.as_mime()).await
    }

    async fn analyze_bytes(
        &self,
        image: &[u8],
        media_type: &str,
    ) -> Result<MealRecord, AnalyzeError> {
        let media_type: MediaType = media_type.parse()?;

        let request = Self::build_request(image, media_type);
        let content = self.generate(&request).await?;
        log::info!("💬 Gemini response content: {}", content);

        let meal = extract_meal_record(&content)?;
        log::info!("✅ Identified meal: {} ({} kcal)", meal.name, meal.calories);

        Ok(meal)
    }
}
