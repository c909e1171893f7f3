//! Patient (demographic) document.

use crate::common::{Address, CodeableConcept, ContactPoint, Extension, HumanName, Identifier, Reference};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanName>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<Address>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub managing_organization: Option<Reference>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,
}

impl Patient {
    pub fn first_name(&self) -> Option<&HumanName> {
        self.name.first()
    }

    pub fn first_telecom_value(&self) -> Option<&str> {
        self.telecom.first()?.value.as_deref()
    }

    pub fn first_address_text(&self) -> Option<&str> {
        self.address.first()?.text.as_deref()
    }
}
