use serde::{
    Deserialize,
    Serialize,
};
use strum::{
    Display,
    EnumIter,
    EnumString,
};

/// Partition of the collaborator population. Every upstream feed is scoped
/// to exactly one sector.
#[derive(
    Debug, Default, Clone, Copy, Display, EnumIter, EnumString, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd,
)]
#[strum(ascii_case_insensitive)]
pub enum Sector {
    #[default]
    #[strum(to_string = "suporte", serialize = "support")]
    #[serde(rename = "suporte", alias = "support")]
    Support,
    #[strum(to_string = "comercial", serialize = "commercial")]
    #[serde(rename = "comercial", alias = "commercial")]
    Commercial,
}

impl Sector {
    /// Value used for the `setor` query parameter and in upstream payloads.
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            Sector::Support => "suporte",
            Sector::Commercial => "comercial",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sector::Support => "Support",
            Sector::Commercial => "Commercial",
        }
    }
}
