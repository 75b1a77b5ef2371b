//! Field validation shared by the CRUD endpoints

use uuid::Uuid;

use super::ValidationError;

/// Maximum length for entity names (farms, crops, livestock, stages)
const MAX_NAME_LEN: usize = 200;

/// Validated, trimmed display name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityName(String);

impl EntityName {
    /// Trim and validate a name.
    ///
    /// # Rules
    /// - Not empty after trimming
    /// - At most 200 characters
    pub fn new(field: &'static str, s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field });
        }
        if trimmed.chars().count() > MAX_NAME_LEN {
            return Err(ValidationError::TooLong {
                field,
                max: MAX_NAME_LEN,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Validate an optional name (used by partial updates).
    pub fn optional(field: &'static str, s: Option<&str>) -> Result<Option<Self>, ValidationError> {
        s.map(|s| Self::new(field, s)).transpose()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for EntityName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Reject negative areas, yields and weights. `None` passes.
pub fn non_negative(field: &'static str, value: Option<f64>) -> Result<Option<f64>, ValidationError> {
    match value {
        Some(v) if !v.is_finite() => Err(ValidationError::InvalidFormat {
            field,
            reason: "must be a finite number",
        }),
        Some(v) if v < 0.0 => Err(ValidationError::Negative { field }),
        other => Ok(other),
    }
}

/// Reject negative counts. `None` passes.
pub fn non_negative_count(field: &'static str, value: Option<i32>) -> Result<Option<i32>, ValidationError> {
    match value {
        Some(v) if v < 0 => Err(ValidationError::Negative { field }),
        other => Ok(other),
    }
}

/// Parse a UUID from a query parameter or body field.
pub fn parse_id(field: &'static str, raw: &str) -> Result<Uuid, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Uuid::parse_str(raw).map_err(|_| ValidationError::InvalidFormat {
        field,
        reason: "invalid UUID format",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed() {
        let name = EntityName::new("name", "  North paddock ").unwrap();
        assert_eq!(name.as_str(), "North paddock");
    }

    #[test]
    fn rejects_blank_name() {
        let err = EntityName::new("name", "   ").unwrap_err();
        assert_eq!(err, ValidationError::Empty { field: "name" });
    }

    #[test]
    fn max_length() {
        assert!(EntityName::new("name", &"a".repeat(200)).is_ok());
        let err = EntityName::new("name", &"a".repeat(201)).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max: 200, .. }));
    }

    #[test]
    fn optional_name() {
        assert_eq!(EntityName::optional("name", None).unwrap(), None);
        assert!(EntityName::optional("name", Some("")).is_err());
    }

    #[test]
    fn negative_numbers_rejected() {
        assert_eq!(non_negative("area", Some(0.0)).unwrap(), Some(0.0));
        assert_eq!(non_negative("area", None).unwrap(), None);
        assert!(matches!(
            non_negative("area", Some(-1.5)),
            Err(ValidationError::Negative { field: "area" })
        ));
        assert!(non_negative("area", Some(f64::INFINITY)).is_err());
        assert!(non_negative_count("count", Some(-1)).is_err());
    }

    #[test]
    fn parses_ids() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id("id", &id.to_string()).unwrap(), id);
        assert!(matches!(
            parse_id("id", "nope"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(parse_id("id", ""), Err(ValidationError::Empty { .. })));
    }
}
