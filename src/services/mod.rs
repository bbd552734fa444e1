pub mod ai_service;
pub mod encoding;
pub mod extract;
pub mod gemini; // Gemini generateContent client

pub use ai_service::MealAnalyzer;
pub use gemini::GeminiService;
