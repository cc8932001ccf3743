//! View-to-controller intent contract
//!
//! Every user intention arrives as a typed event with a fixed payload
//! shape, mirroring the custom events emitted by the view components.
//! The serialized form is `{"type": "...", "detail": {...}}`.

use crate::models::Filter;
use serde::{Deserialize, Serialize};

/// A user-triggered request for a state change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail", rename_all = "kebab-case")]
pub enum Intent {
    Create { title: String, body: String },
    Pin { id: String, pinned: bool },
    Archive { id: String, archived: bool },
    Delete { id: String },
    FilterChange { filter: Filter },
    SearchChange { query: String },
    ThemeToggle,
    ExportData,
    ImportData { text: String, filename: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intents_use_kebab_case_tags() {
        let intent = Intent::FilterChange {
            filter: Filter::Archived,
        };
        let encoded = serde_json::to_string(&intent).unwrap();
        assert!(encoded.contains("\"filter-change\""));

        let decoded: Intent =
            serde_json::from_str(r#"{"type":"search-change","detail":{"query":"shop"}}"#).unwrap();
        assert_eq!(
            decoded,
            Intent::SearchChange {
                query: "shop".to_string()
            }
        );
    }

    #[test]
    fn create_payload_has_fixed_fields() {
        let decoded: Intent = serde_json::from_str(
            r#"{"type":"create","detail":{"title":"A","body":"B"}}"#,
        )
        .unwrap();
        assert_eq!(
            decoded,
            Intent::Create {
                title: "A".to_string(),
                body: "B".to_string()
            }
        );

        // a missing required field is an error
        assert!(serde_json::from_str::<Intent>(r#"{"type":"create","detail":{"title":"A"}}"#)
            .is_err());
    }
}
