//! Judgment domains
//!
//! A [`Domain`] is one independent dimension of judgment (accuracy,
//! compliance, ...) with its own proponent/critic pair. The set is closed:
//! anything outside [`Domain::ALL`] is rejected before a debate starts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EvaluationError;

/// A debate-capable judgment domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    /// Factual correctness of the answer
    Accuracy,
    /// Adherence to policies, standards and instructions
    Compliance,
    /// Legal soundness and exposure
    Legality,
    /// Potential for harm
    Safety,
    /// Structure, readability and precision of language
    Clarity,
}

impl Domain {
    /// Every supported domain, in canonical order
    pub const ALL: [Domain; 5] = [
        Domain::Accuracy,
        Domain::Compliance,
        Domain::Legality,
        Domain::Safety,
        Domain::Clarity,
    ];

    /// Lowercase identifier used in requests and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accuracy => "accuracy",
            Self::Compliance => "compliance",
            Self::Legality => "legality",
            Self::Safety => "safety",
            Self::Clarity => "clarity",
        }
    }

    /// The expertise name an evaluation in this domain is reported under
    pub fn expertise(&self) -> &'static str {
        match self {
            Self::Accuracy => "Fact Checker",
            Self::Compliance => "Compliance Officer",
            Self::Legality => "Legal Expert",
            Self::Safety => "Safety Reviewer",
            Self::Clarity => "Editor",
        }
    }

    /// What a reviewer in this domain is asked to focus on
    pub fn focus(&self) -> &'static str {
        match self {
            Self::Accuracy => {
                "whether every factual claim is correct, verifiable and free of fabrication"
            }
            Self::Compliance => {
                "whether the answer follows the applicable policies, standards and the instructions in the question"
            }
            Self::Legality => {
                "whether the answer is legally sound and avoids advice that creates legal exposure"
            }
            Self::Safety => "whether the answer could lead to physical, financial or psychological harm",
            Self::Clarity => "whether the answer is well structured, unambiguous and easy to act on",
        }
    }

    /// Map an expertise name onto a debate-capable domain.
    ///
    /// Matching is case-insensitive. A domain's own identifier maps to itself.
    pub fn for_expertise(expertise: &str) -> Option<Domain> {
        let needle = expertise.trim().to_lowercase();
        match needle.as_str() {
            "fact checker" | "subject matter expert" => Some(Self::Accuracy),
            "compliance officer" => Some(Self::Compliance),
            "legal expert" => Some(Self::Legality),
            "safety reviewer" => Some(Self::Safety),
            "editor" => Some(Self::Clarity),
            other => Self::ALL.into_iter().find(|d| d.as_str() == other),
        }
    }

    /// Comma separated list of valid identifiers (used in error messages)
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|d| d.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = EvaluationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == needle)
            .ok_or_else(|| EvaluationError::InvalidDomain {
                name: s.to_string(),
                valid: Self::valid_names(),
            })
    }
}
