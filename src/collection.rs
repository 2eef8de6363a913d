//! Guestbook collections
//!
//! The site keeps two append-only lists of free-form JSON records: wedding
//! wishes and RSVPs. Each list knows which fields a submission must carry.

use serde_json::Value;
use std::fmt;

/// One of the two append-only record lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Wishes,
    Rsvp,
}

impl Collection {
    /// Short name used in routes and log lines
    pub const fn name(self) -> &'static str {
        match self {
            Self::Wishes => "wishes",
            Self::Rsvp => "rsvp",
        }
    }

    /// Fields a submission must carry with a truthy value
    pub const fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::Wishes => &["name", "content"],
            Self::Rsvp => &["name", "attendance"],
        }
    }

    /// Commit message used when the collection lives in a remote repository
    pub const fn commit_message(self) -> &'static str {
        match self {
            Self::Wishes => "chore: append wedding wish",
            Self::Rsvp => "chore: append wedding rsvp",
        }
    }

    /// Default storage file name
    pub const fn default_file_name(self) -> &'static str {
        match self {
            Self::Wishes => "wishes.json",
            Self::Rsvp => "rsvp.json",
        }
    }

    /// Required fields that are absent or falsy in `payload`
    ///
    /// A payload that is not a JSON object is missing every field.
    pub fn missing_fields(self, payload: &Value) -> Vec<&'static str> {
        self.required_fields()
            .iter()
            .copied()
            .filter(|field| !payload.get(field).is_some_and(is_truthy))
            .collect()
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Truthiness as browsers judge form payloads: `null`, `false`, `0` and `""`
/// count as absent.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("Ana")));
        assert!(is_truthy(&json!(2)));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn test_missing_fields_for_wish() {
        let payload = json!({"name": "Ana", "content": ""});
        assert_eq!(Collection::Wishes.missing_fields(&payload), vec!["content"]);

        let payload = json!({"name": "Ana", "content": "Congrats!", "extra": 1});
        assert!(Collection::Wishes.missing_fields(&payload).is_empty());
    }

    #[test]
    fn test_missing_fields_for_rsvp() {
        let payload = json!({"attendance": "yes"});
        assert_eq!(Collection::Rsvp.missing_fields(&payload), vec!["name"]);
    }

    #[test]
    fn test_non_object_payload_misses_everything() {
        assert_eq!(
            Collection::Rsvp.missing_fields(&json!(["name", "attendance"])),
            vec!["name", "attendance"]
        );
        assert_eq!(
            Collection::Wishes.missing_fields(&json!("hello")),
            vec!["name", "content"]
        );
    }
}
