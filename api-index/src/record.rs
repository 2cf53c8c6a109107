//! Core data models of the documentation corpus.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of documented member.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberType {
    #[default]
    Method,
    Property,
    Enum,
    Overview,
}

/// One documented API member. Immutable once loaded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiRecord {
    pub doc_id: String,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub item_name: String,
    #[serde(default)]
    pub member_type: MemberType,
    #[serde(default)]
    pub full_signature: String,
    #[serde(default)]
    pub description: String,
    /// Parameter table as scraped; shape varies by member.
    #[serde(default)]
    pub parameters: Value,
    #[serde(default)]
    pub return_type: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub example_code: String,
}

impl ApiRecord {
    /// `Class.item`, or whichever half is present.
    pub fn qualified_name(&self) -> String {
        match (self.class_name.is_empty(), self.item_name.is_empty()) {
            (false, false) => format!("{}.{}", self.class_name, self.item_name),
            (false, true) => self.class_name.clone(),
            (true, false) => self.item_name.clone(),
            (true, true) => self.doc_id.clone(),
        }
    }
}

/// Textual facet of a record; each facet is embedded into its own index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facet {
    Description,
    Details,
    Example,
}

impl Facet {
    /// All facets in tie-break order.
    pub const ALL: [Facet; 3] = [Facet::Description, Facet::Details, Facet::Example];

    /// Tie-break rank; lower wins.
    pub fn priority(self) -> u8 {
        match self {
            Facet::Description => 0,
            Facet::Details => 1,
            Facet::Example => 2,
        }
    }

    /// Default index name for this facet.
    pub fn as_str(self) -> &'static str {
        match self {
            Facet::Description => "description",
            Facet::Details => "details",
            Facet::Example => "example",
        }
    }

    /// The record text this facet covers.
    pub fn text(self, record: &ApiRecord) -> &str {
        match self {
            Facet::Description => &record.description,
            Facet::Details => &record.details,
            Facet::Example => &record.example_code,
        }
    }
}

impl std::fmt::Display for Facet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_defaults_missing_fields() {
        let r: ApiRecord =
            serde_json::from_str(r#"{"doc_id":"d1","class_name":"Sequence","item_name":"clone","member_type":"method"}"#)
                .unwrap();
        assert_eq!(r.qualified_name(), "Sequence.clone");
        assert!(r.full_signature.is_empty());
        assert!(r.parameters.is_null());
    }

    #[test]
    fn facet_priority_orders_description_first() {
        let mut fs = vec![Facet::Example, Facet::Description, Facet::Details];
        fs.sort_by_key(|f| f.priority());
        assert_eq!(fs, Facet::ALL.to_vec());
        assert_eq!(serde_json::to_string(&Facet::Details).unwrap(), "\"details\"");
    }
}
