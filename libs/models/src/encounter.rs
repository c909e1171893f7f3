//! Encounter (clinical visit) document.

use crate::common::{CodeableConcept, Identifier, Period, Reference};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Encounter {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,

    #[serde(rename = "type", default, skip_serializing_if = "Vec::is_empty")]
    pub type_: Vec<CodeableConcept>,

    #[serde(default)]
    pub subject: Reference,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
}

impl Encounter {
    /// The coding on the first type, which names the program stage.
    pub fn type_coding(&self) -> Option<&crate::common::Coding> {
        self.type_.first()?.first_coding()
    }

    /// The encounter's own identifier value. Every encounter must carry one;
    /// observations locate the encounter through it later.
    pub fn identifier_value(&self) -> Option<&str> {
        self.identifier.first()?.value.as_deref()
    }
}
