use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::AnalyzeError;

/// Nutrition summary the model returned for one photo.
///
/// Decoding is permissive: missing or null fields fall back to empty text
/// or zero, and numbers sent as strings are accepted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MealRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub calories: f64,
    #[serde(rename = "protein_g", default, deserialize_with = "lenient_number")]
    pub protein_grams: f64,
    #[serde(rename = "carbs_g", default, deserialize_with = "lenient_number")]
    pub carb_grams: f64,
    #[serde(rename = "fat_g", default, deserialize_with = "lenient_number")]
    pub fat_grams: f64,
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => leading_number(&s).unwrap_or(0.0),
        _ => 0.0,
    })
}

/// "95 kcal" -> 95.0, "12,5g" -> 12.5
fn leading_number(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',' || *c == '-')
        .collect::<String>()
        .replace(',', ".");

    cleaned.parse::<f64>().ok()
}

/// Image formats the AI endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaType {
    #[default]
    Jpeg,
    Png,
    Webp,
    Heic,
    Heif,
}

impl MediaType {
    pub fn as_mime(&self) -> &'static str {
        match self {
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
            MediaType::Webp => "image/webp",
            MediaType::Heic => "image/heic",
            MediaType::Heif => "image/heif",
        }
    }

    /// Guess from a file extension, e.g. for paths given on the command line.
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(MediaType::Jpeg),
            "png" => Some(MediaType::Png),
            "webp" => Some(MediaType::Webp),
            "heic" => Some(MediaType::Heic),
            "heif" => Some(MediaType::Heif),
            _ => None,
        }
    }
}

impl FromStr for MediaType {
    type Err = AnalyzeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "image/jpeg" => Ok(MediaType::Jpeg),
            "image/png" => Ok(MediaType::Png),
            "image/webp" => Ok(MediaType::Webp),
            "image/heic" => Ok(MediaType::Heic),
            "image/heif" => Ok(MediaType::Heif),
            _ => Err(AnalyzeError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_mime())
    }
}

/// A photo on local disk plus the media type the caller declared for it.
/// The declared type is only checked when the image is analyzed.
#[derive(Debug, Clone)]
pub struct ImageInput {
    pub path: PathBuf,
    pub media_type: String,
}

impl ImageInput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            media_type: MediaType::default().as_mime().to_string(),
        }
    }

    pub fn with_media_type(path: impl Into<PathBuf>, media_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            media_type: media_type.into(),
        }
    }
}
