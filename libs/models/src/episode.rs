//! EpisodeOfCare (care-episode enrollment) document.

use crate::common::{Identifier, Period, Reference};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EpisodeOfCare {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,

    #[serde(default)]
    pub patient: Reference,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
}

impl EpisodeOfCare {
    /// The coding on the first identifier's type, which names the care
    /// program this episode belongs to.
    pub fn program_coding(&self) -> Option<&crate::common::Coding> {
        self.identifier.first()?.type_.as_ref()?.first_coding()
    }
}
