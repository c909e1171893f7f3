//! Observation document - contributes one data value to an encounter.

use crate::common::{CodeableConcept, Reference, ValueX};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Observation {
    #[serde(default)]
    pub code: CodeableConcept,

    #[serde(default)]
    pub subject: Reference,

    #[serde(default)]
    pub encounter: Reference,

    #[serde(flatten)]
    pub value: Option<ValueX>,
}

impl Observation {
    pub fn code_coding(&self) -> Option<&crate::common::Coding> {
        self.code.first_coding()
    }

    pub fn primitive_value(&self) -> Option<String> {
        self.value.as_ref()?.primitive_value()
    }
}
