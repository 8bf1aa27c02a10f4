use serde::{
    Deserialize,
    Serialize,
};
use strum::{
    Display,
    EnumIter,
    EnumString,
};

const INTERN_MARKERS: [&str; 2] = ["(Estagiário)", "(Estagiario)"];

/// Restricts rankings and stats to a part of the roster.
#[derive(Debug, Default, Clone, Copy, Display, EnumIter, EnumString, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RosterFilter {
    #[default]
    All,
    /// Collaborators whose name carries the intern marker.
    Interns,
    /// Everyone else.
    Staff,
}

impl RosterFilter {
    pub fn matches_name(&self, name: &str) -> bool {
        match self {
            RosterFilter::All => true,
            RosterFilter::Interns => is_intern(name),
            RosterFilter::Staff => !is_intern(name),
        }
    }
}

fn is_intern(name: &str) -> bool {
    INTERN_MARKERS.iter().any(|marker| name.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_marker_with_and_without_accent() {
        assert!(RosterFilter::Interns.matches_name("Gabriel Brambila (Estagiário)"));
        assert!(RosterFilter::Interns.matches_name("João Silva (Estagiario)"));
        assert!(!RosterFilter::Interns.matches_name("Pedro Boni"));
    }

    #[test]
    fn staff_is_the_complement() {
        assert!(RosterFilter::Staff.matches_name("Pedro Boni"));
        assert!(!RosterFilter::Staff.matches_name("João Silva (Estagiario)"));
        assert!(RosterFilter::All.matches_name("João Silva (Estagiario)"));
    }
}
