//! Classification vocabulary shared across agents.
//!
//! The wire labels (what the model emits and what routers match on) are the
//! serde representations; `as_label` returns the same strings for writing
//! into state records.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------

/// Communicative purpose of the input text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenreType {
    Narrative,
    Informational,
    Expository,
    Argumentative,
    Instructional,
    Normative,
    Expressive,
    Other,
}

impl GenreType {
    /// Parses a wire label, falling back to [`GenreType::Other`] for
    /// anything unrecognised.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Narrative" => Self::Narrative,
            "Informational" => Self::Informational,
            "Expository" => Self::Expository,
            "Argumentative" => Self::Argumentative,
            "Instructional" => Self::Instructional,
            "Normative" => Self::Normative,
            "Expressive" => Self::Expressive,
            _ => Self::Other,
        }
    }

    /// The wire label.
    pub fn as_label(self) -> &'static str {
        match self {
            Self::Narrative => "Narrative",
            Self::Informational => "Informational",
            Self::Expository => "Expository",
            Self::Argumentative => "Argumentative",
            Self::Instructional => "Instructional",
            Self::Normative => "Normative",
            Self::Expressive => "Expressive",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for GenreType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}

// ---------------------------------------------------------------------------

/// Context classification. The current taxonomy has a single bucket; the
/// field exists so the wire format stays stable when finer contexts land.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContextType {
    #[default]
    Other,
}

impl ContextType {
    /// The wire label.
    pub fn as_label(self) -> &'static str {
        "Other"
    }
}

impl std::fmt::Display for ContextType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}

// ---------------------------------------------------------------------------

/// Which summarization mode the user wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskType {
    /// Compressed information: short, information-dense points.
    #[serde(rename = "KEYPOINT")]
    Keypoint,
    /// A reorganised explanation in continuous prose.
    #[serde(rename = "SYNTHESIS")]
    Synthesis,
}

impl TaskType {
    /// Parses a wire label; `None` for anything unrecognised so the caller
    /// can apply its own default.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "KEYPOINT" => Some(Self::Keypoint),
            "SYNTHESIS" => Some(Self::Synthesis),
            _ => None,
        }
    }

    /// The wire label.
    pub fn as_label(self) -> &'static str {
        match self {
            Self::Keypoint => "KEYPOINT",
            Self::Synthesis => "SYNTHESIS",
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genre_labels_round_trip_and_unknowns_fall_back_to_other() {
        assert_eq!(GenreType::from_label("Expository"), GenreType::Expository);
        assert_eq!(GenreType::from_label("Expository").as_label(), "Expository");
        assert_eq!(GenreType::from_label("Haiku"), GenreType::Other);
        assert_eq!(GenreType::from_label(""), GenreType::Other);
    }

    #[test]
    fn task_labels_are_strict() {
        assert_eq!(TaskType::from_label("KEYPOINT"), Some(TaskType::Keypoint));
        assert_eq!(TaskType::from_label("SYNTHESIS"), Some(TaskType::Synthesis));
        assert_eq!(TaskType::from_label("keypoint"), None);
        assert_eq!(TaskType::from_label("BOTH"), None);
    }

    #[test]
    fn task_type_serialises_to_the_wire_label() {
        assert_eq!(
            serde_json::to_string(&TaskType::Keypoint).unwrap(),
            "\"KEYPOINT\""
        );
        assert_eq!(
            serde_json::from_str::<TaskType>("\"SYNTHESIS\"").unwrap(),
            TaskType::Synthesis
        );
    }
}
