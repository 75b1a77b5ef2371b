//! Insight normalization
//!
//! Model output is untrusted JSON. Every candidate object is coerced into the
//! fixed [`NewInsight`] shape before it reaches the database:
//!
//! - title: non-empty string, else [`DEFAULT_TITLE`]
//! - description: string, else empty
//! - severity: low / medium / high, else medium
//! - recommended_actions: string elements of an array, else empty
//! - confidence: number clamped to [0, 1], else [`DEFAULT_CONFIDENCE`]
//! - metadata: object, else empty, with context metadata merged on top

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{CoreError, Result};

/// Constant `insight_type` for generated insights
pub const INSIGHT_TYPE: &str = "ai_insight";

/// Title used when the model omits one
pub const DEFAULT_TITLE: &str = "New Insight";

/// Confidence used when the model omits one or sends a non-number
pub const DEFAULT_CONFIDENCE: f64 = 0.7;

/// Insight severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Low, Severity::Medium, Severity::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parse a severity leniently (case and surrounding whitespace ignored).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    /// Severity from an arbitrary JSON value; anything unrecognized is medium.
    pub fn from_value(value: Option<&Value>) -> Self {
        value
            .and_then(Value::as_str)
            .and_then(Self::parse)
            .unwrap_or_default()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a batch of insights is being attached
#[derive(Debug, Clone)]
pub struct InsightContext {
    pub farm_id: Uuid,
    pub organization_id: Uuid,
    /// Merged into every insight's metadata (e.g. `livestock_id`)
    pub metadata: Map<String, Value>,
}

impl InsightContext {
    pub fn new(farm_id: Uuid, organization_id: Uuid) -> Self {
        Self {
            farm_id,
            organization_id,
            metadata: Map::new(),
        }
    }

    /// Attach a metadata entry that every insight in the batch carries.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A normalized insight ready for insertion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInsight {
    pub farm_id: Uuid,
    pub organization_id: Uuid,
    pub insight_type: String,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub recommended_actions: Vec<String>,
    pub confidence: f64,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Coerce one raw model object into the stored insight shape.
///
/// Never fails: every field has a default. A non-object `raw` yields an
/// insight made entirely of defaults.
pub fn normalize_insight(raw: &Value, ctx: &InsightContext, now: DateTime<Utc>) -> NewInsight {
    let title = raw
        .get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TITLE)
        .to_string();

    let description = raw
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let recommended_actions = match raw.get("recommended_actions") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    let mut metadata = match raw.get("metadata") {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };
    for (key, value) in &ctx.metadata {
        metadata.insert(key.clone(), value.clone());
    }

    NewInsight {
        farm_id: ctx.farm_id,
        organization_id: ctx.organization_id,
        insight_type: INSIGHT_TYPE.to_string(),
        title,
        description,
        severity: Severity::from_value(raw.get("severity")),
        recommended_actions,
        confidence: clamp_confidence(raw.get("confidence")),
        metadata: Value::Object(metadata),
        created_at: now,
        updated_at: now,
    }
}

fn clamp_confidence(value: Option<&Value>) -> f64 {
    match value.and_then(Value::as_f64) {
        Some(c) if c.is_finite() => c.clamp(0.0, 1.0),
        _ => DEFAULT_CONFIDENCE,
    }
}

/// Pull insight candidates out of a model's text reply.
///
/// Accepts `{"insights": [...]}`, a bare array, or a single object, with or
/// without a surrounding markdown code fence. Non-object array elements are
/// skipped.
pub fn extract_candidates(content: &str) -> Result<Vec<Value>> {
    let body = strip_code_fence(content);
    let parsed: Value =
        serde_json::from_str(body).map_err(|e| CoreError::json("model content", e))?;

    let items = match parsed {
        Value::Object(mut map) => match map.remove("insights") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(CoreError::unexpected_shape(format!(
                    "\"insights\" is {}, expected an array",
                    json_kind(&other)
                )))
            }
            None => vec![Value::Object(map)],
        },
        Value::Array(items) => items,
        other => {
            return Err(CoreError::unexpected_shape(format!(
                "top-level {}",
                json_kind(&other)
            )))
        }
    };

    let total = items.len();
    let objects: Vec<Value> = items.into_iter().filter(Value::is_object).collect();
    if objects.len() < total {
        tracing::debug!(
            skipped = total - objects.len(),
            "Skipped non-object insight candidates"
        );
    }
    Ok(objects)
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json"), which may share a line with the body
    let rest = rest.trim_start_matches(|c: char| !c.is_whitespace() && c != '{' && c != '[');
    let rest = rest.trim_end();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> InsightContext {
        InsightContext::new(Uuid::nil(), Uuid::from_u128(7))
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn complete_input_passes_through() {
        let raw = json!({
            "title": "Irrigate the east field",
            "description": "Soil moisture is trending down.",
            "severity": "high",
            "recommended_actions": ["Run drip lines for 2h", "Check valves"],
            "confidence": 0.92,
            "metadata": {"category": "water"}
        });

        let insight = normalize_insight(&raw, &ctx(), now());
        assert_eq!(insight.title, "Irrigate the east field");
        assert_eq!(insight.description, "Soil moisture is trending down.");
        assert_eq!(insight.severity, Severity::High);
        assert_eq!(insight.recommended_actions.len(), 2);
        assert_eq!(insight.confidence, 0.92);
        assert_eq!(insight.metadata, json!({"category": "water"}));
        assert_eq!(insight.insight_type, INSIGHT_TYPE);
        assert_eq!(insight.organization_id, Uuid::from_u128(7));
        assert_eq!(insight.created_at, insight.updated_at);
    }

    #[test]
    fn empty_object_gets_defaults() {
        let insight = normalize_insight(&json!({}), &ctx(), now());
        assert_eq!(insight.title, DEFAULT_TITLE);
        assert_eq!(insight.description, "");
        assert_eq!(insight.severity, Severity::Medium);
        assert!(insight.recommended_actions.is_empty());
        assert_eq!(insight.confidence, DEFAULT_CONFIDENCE);
        assert_eq!(insight.metadata, json!({}));
    }

    #[test]
    fn blank_title_uses_default() {
        let insight = normalize_insight(&json!({"title": "   "}), &ctx(), now());
        assert_eq!(insight.title, DEFAULT_TITLE);
    }

    #[test]
    fn confidence_is_clamped() {
        let high = normalize_insight(&json!({"confidence": 85}), &ctx(), now());
        assert_eq!(high.confidence, 1.0);

        let negative = normalize_insight(&json!({"confidence": -0.4}), &ctx(), now());
        assert_eq!(negative.confidence, 0.0);
    }

    #[test]
    fn non_numeric_confidence_uses_default() {
        for value in [json!("0.9"), json!(null), json!(true), json!([0.5])] {
            let insight = normalize_insight(&json!({"confidence": value}), &ctx(), now());
            assert_eq!(insight.confidence, DEFAULT_CONFIDENCE);
        }
    }

    #[test]
    fn severity_is_lenient_about_case() {
        let insight = normalize_insight(&json!({"severity": " HIGH "}), &ctx(), now());
        assert_eq!(insight.severity, Severity::High);

        let insight = normalize_insight(&json!({"severity": "critical"}), &ctx(), now());
        assert_eq!(insight.severity, Severity::Medium);

        let insight = normalize_insight(&json!({"severity": 3}), &ctx(), now());
        assert_eq!(insight.severity, Severity::Medium);
    }

    #[test]
    fn actions_keep_only_strings() {
        let raw = json!({"recommended_actions": ["Spray", 4, null, "", " Scout rows "]});
        let insight = normalize_insight(&raw, &ctx(), now());
        assert_eq!(insight.recommended_actions, vec!["Spray", "Scout rows"]);

        let raw = json!({"recommended_actions": "Spray"});
        let insight = normalize_insight(&raw, &ctx(), now());
        assert!(insight.recommended_actions.is_empty());
    }

    #[test]
    fn context_metadata_wins() {
        let livestock = Uuid::from_u128(42);
        let ctx = ctx().with_metadata("livestock_id", livestock.to_string());
        let raw = json!({"metadata": {"livestock_id": "bogus", "topic": "feed"}});

        let insight = normalize_insight(&raw, &ctx, now());
        assert_eq!(insight.metadata["livestock_id"], json!(livestock.to_string()));
        assert_eq!(insight.metadata["topic"], json!("feed"));
    }

    #[test]
    fn non_object_metadata_is_replaced() {
        let insight = normalize_insight(&json!({"metadata": [1, 2]}), &ctx(), now());
        assert_eq!(insight.metadata, json!({}));
    }

    #[test]
    fn extracts_wrapped_array() {
        let content = r#"{"insights": [{"title": "a"}, {"title": "b"}]}"#;
        assert_eq!(extract_candidates(content).unwrap().len(), 2);
    }

    #[test]
    fn extracts_bare_array_and_single_object() {
        assert_eq!(extract_candidates(r#"[{"title": "a"}]"#).unwrap().len(), 1);
        assert_eq!(extract_candidates(r#"{"title": "solo"}"#).unwrap().len(), 1);
    }

    #[test]
    fn strips_code_fence() {
        let content = "```json\n{\"insights\": [{\"title\": \"fenced\"}]}\n```";
        let items = extract_candidates(content).unwrap();
        assert_eq!(items[0]["title"], json!("fenced"));

        let one_line = "```json {\"insights\": [{\"title\": \"a\"}]} ```";
        assert_eq!(extract_candidates(one_line).unwrap()[0]["title"], json!("a"));

        let no_tag = "```{\"title\": \"a\"}```";
        assert_eq!(extract_candidates(no_tag).unwrap().len(), 1);

        let bare_fence = "```\n[{\"title\": \"b\"}]\n```";
        assert_eq!(extract_candidates(bare_fence).unwrap()[0]["title"], json!("b"));
    }

    #[test]
    fn skips_non_objects() {
        let items = extract_candidates(r#"[{"title": "a"}, "text", 3]"#).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn rejects_unusable_output() {
        assert!(matches!(
            extract_candidates("I could not find anything"),
            Err(CoreError::Json { .. })
        ));
        assert!(matches!(
            extract_candidates(r#""just a string""#),
            Err(CoreError::UnexpectedShape { .. })
        ));
        assert!(matches!(
            extract_candidates(r#"{"insights": "none"}"#),
            Err(CoreError::UnexpectedShape { .. })
        ));
    }
}
