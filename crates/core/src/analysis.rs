use crate::error::AnalyzeError;
use serde::Deserialize;
use serde_json::Value;

/// Inbound body, before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysisRequest {
    product_name: Option<String>,
    ingredients_text: Option<String>,
}

/// A validated analysis request. Both fields are present and non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub product_name: String,
    pub ingredients_text: String,
}

impl AnalysisRequest {
    /// Parse and validate a JSON body `{productName, ingredientsText}`.
    pub fn from_json(body: &[u8]) -> Result<Self, AnalyzeError> {
        if body.is_empty() {
            return Err(AnalyzeError::InvalidRequest("empty body".into()));
        }
        let raw: RawAnalysisRequest = serde_json::from_slice(body)
            .map_err(|e| AnalyzeError::InvalidRequest(format!("invalid JSON body: {e}")))?;

        let mut issues = Vec::new();
        if raw.product_name.as_deref().is_none_or(|s| s.trim().is_empty()) {
            issues.push("productName is required");
        }
        if raw
            .ingredients_text
            .as_deref()
            .is_none_or(|s| s.trim().is_empty())
        {
            issues.push("ingredientsText is required");
        }
        if !issues.is_empty() {
            return Err(AnalyzeError::InvalidRequest(issues.join(", ")));
        }

        Ok(Self {
            product_name: raw.product_name.unwrap_or_default(),
            ingredients_text: raw.ingredients_text.unwrap_or_default(),
        })
    }
}

/// Lenient view over a model's analysis object, used for logging only.
/// Fields of the wrong type read as absent rather than failing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisSummary {
    pub score: Option<f64>,
    pub carbon_footprint: Option<String>,
    pub tags: usize,
    pub certifications: usize,
    pub greener_alternatives: usize,
    pub eco_brands: usize,
}

impl AnalysisSummary {
    pub fn from_value(value: &Value) -> Self {
        let count = |key: &str| value.get(key).and_then(Value::as_array).map_or(0, Vec::len);
        Self {
            score: value.get("score").and_then(Value::as_f64),
            carbon_footprint: value
                .get("carbon_footprint")
                .and_then(Value::as_str)
                .map(str::to_string),
            tags: count("tags"),
            certifications: count("certifications"),
            greener_alternatives: count("greener_alternatives"),
            eco_brands: count("eco_brands"),
        }
    }

    /// Whether the score is present and on the 0–10 scale.
    pub fn score_in_range(&self) -> bool {
        self.score.is_some_and(|s| (0.0..=10.0).contains(&s))
    }
}
