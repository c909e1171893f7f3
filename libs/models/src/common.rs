//! Shared complex types reused across clinical documents.

use serde::{Deserialize, Serialize};

/// Coding - a reference to a code defined by a terminology system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Coding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// CodeableConcept - one or more codings plus free text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CodeableConcept {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CodeableConcept {
    pub fn first_coding(&self) -> Option<&Coding> {
        self.coding.first()
    }
}

/// Identifier - a business identifier with an optional coded type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Identifier {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<CodeableConcept>,
}

/// Reference to another document, by literal reference or identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Reference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Identifier>,
}

impl Reference {
    /// The referenced identifier value, if one was supplied.
    pub fn identifier_value(&self) -> Option<&str> {
        self.identifier.as_ref()?.value.as_deref()
    }
}

/// Period - a time range. Dates arrive as `YYYY-MM-DD` or as full
/// timestamps; only the date part is meaningful to the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Period {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

impl Period {
    /// Start instant truncated to a calendar date string.
    pub fn start_date(&self) -> Option<&str> {
        let start = self.start.as_deref()?;
        Some(start.split('T').next().unwrap_or(start))
    }
}

/// HumanName
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HumanName {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub given: Vec<String>,
}

impl HumanName {
    /// All given names joined with a single space.
    pub fn given_as_single_string(&self) -> Option<String> {
        if self.given.is_empty() {
            None
        } else {
            Some(self.given.join(" "))
        }
    }
}

/// Address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Contact point (phone, email, etc.)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ContactPoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Quantity - a measured amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Quantity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// A `value[x]` choice element as it appears on extensions and observations.
///
/// Externally tagged so it can be flattened into the owning struct, where the
/// variant name is the JSON key (`valueString`, `valueQuantity`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueX {
    #[serde(rename = "valueString")]
    String(String),
    #[serde(rename = "valueCode")]
    Code(String),
    #[serde(rename = "valueBoolean")]
    Boolean(bool),
    #[serde(rename = "valueInteger")]
    Integer(i64),
    #[serde(rename = "valueDecimal")]
    Decimal(f64),
    #[serde(rename = "valueDate")]
    Date(String),
    #[serde(rename = "valueDateTime")]
    DateTime(String),
    #[serde(rename = "valueQuantity")]
    Quantity(Quantity),
    #[serde(rename = "valueCodeableConcept")]
    CodeableConcept(CodeableConcept),
}

impl ValueX {
    /// Primitive rendering of the value, mirroring how the registry stores
    /// data values (everything is a string on the wire).
    pub fn primitive_value(&self) -> Option<String> {
        match self {
            ValueX::String(s) | ValueX::Code(s) | ValueX::Date(s) | ValueX::DateTime(s) => {
                Some(s.clone())
            }
            ValueX::Boolean(b) => Some(b.to_string()),
            ValueX::Integer(i) => Some(i.to_string()),
            ValueX::Decimal(d) => Some(d.to_string()),
            ValueX::Quantity(q) => q.value.map(|v| v.to_string()),
            ValueX::CodeableConcept(cc) => cc
                .first_coding()
                .and_then(|c| c.display.clone().or_else(|| c.code.clone()))
                .or_else(|| cc.text.clone()),
        }
    }
}

/// Extension - a URL plus a primitive value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extension {
    pub url: String,

    #[serde(flatten)]
    pub value: Option<ValueX>,
}
