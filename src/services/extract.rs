use crate::error::AnalyzeError;
use crate::models::MealRecord;

/// Pull a `MealRecord` out of free model text.
///
/// Models like to wrap JSON in markdown code fences or add a sentence around it,
/// so fence markers are dropped and the slice from the first `{` to the
/// last `}` is parsed. Any failure keeps the raw text for diagnostics.
pub fn extract_meal_record(raw: &str) -> Result<MealRecord, AnalyzeError> {
    let payload = json_slice(raw).ok_or_else(|| malformed(raw))?;

    serde_json::from_str::<MealRecord>(&payload).map_err(|e| {
        log::warn!("⚠️ Meal JSON did not parse: {}", e);
        malformed(raw)
    })
}

fn json_slice(raw: &str) -> Option<String> {
    let unfenced = strip_fences(raw);
    let start = unfenced.find('{')?;
    let end = unfenced.rfind('}')?;
    if end < start {
        return None;
    }
    Some(unfenced[start..=end].to_string())
}

fn strip_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "")
}

fn malformed(raw: &str) -> AnalyzeError {
    AnalyzeError::MalformedPayload {
        raw: raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const APPLE: &str = r#"{"name":"Apple","description":"A fruit","calories":95,"protein_g":0,"carbs_g":25,"fat_g":0}"#;

    fn apple() -> MealRecord {
        MealRecord {
            name: "Apple".to_string(),
            description: "A fruit".to_string(),
            calories: 95.0,
            protein_grams: 0.0,
            carb_grams: 25.0,
            fat_grams: 0.0,
        }
    }

    #[test]
    fn test_plain_json() {
        assert_eq!(extract_meal_record(APPLE).unwrap(), apple());
    }

    #[test]
    fn test_fenced_json_with_prose() {
        let raw = format!("Sure! ```json\n{}\n``` Enjoy your meal.", APPLE);
        assert_eq!(extract_meal_record(&raw).unwrap(), apple());
    }

    #[test]
    fn test_bare_fence() {
        let raw = format!("```\n{}\n```", APPLE);
        assert_eq!(extract_meal_record(&raw).unwrap(), apple());
    }

    #[test]
    fn test_no_braces() {
        let raw = "I could not identify any food in this picture.";
        match extract_meal_record(raw) {
            Err(AnalyzeError::MalformedPayload { raw: kept }) => assert_eq!(kept, raw),
            other => panic!("expected MalformedPayload, got {:?}", other),
        }
    }

    #[test]
    fn test_inverted_braces() {
        assert!(matches!(
            extract_meal_record("} nothing here {"),
            Err(AnalyzeError::MalformedPayload { .. })
        ));
    }

    #[test]
    fn test_broken_json_keeps_raw_text() {
        let raw = "```json\n{\"name\": \"Soup\", \"calories\": }\n```";
        match extract_meal_record(raw) {
            Err(AnalyzeError::MalformedPayload { raw: kept }) => assert_eq!(kept, raw),
            other => panic!("expected MalformedPayload, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_braces_in_text_fields() {
        let raw = r#"Result: {"name":"Pasta {al dente}","description":"","calories":410,"protein_g":14,"carbs_g":70,"fat_g":8} done"#;
        let meal = extract_meal_record(raw).unwrap();
        assert_eq!(meal.name, "Pasta {al dente}");
        assert_eq!(meal.calories, 410.0);
    }
}
