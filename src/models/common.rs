use serde::{Deserialize, Serialize};

/// How a lesson event is funded: included lessons draw a credit from the
/// member's package, extra lessons do not
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonKind {
    Included,
    Extra,
}

impl LessonKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "included" => Some(Self::Included),
            "extra" => Some(Self::Extra),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Included => "included",
            Self::Extra => "extra",
        }
    }
}
