use crate::error::AnalyzeError;
use crate::models::{ImageInput, MealRecord};

/// Trait for meal analyzers (Gemini, test fakes, etc.)
#[async_trait::async_trait]
pub trait MealAnalyzer: Send + Sync {
    async fn analyze(&self, input: &ImageInput) -> Result<MealRecord, AnalyzeError>;

    /// Same as `analyze` for image bytes already in memory.
    async fn analyze_bytes(
        &self,
        image: &[u8],
        media_type: &str,
    ) -> Result<MealRecord, AnalyzeError>;
}
