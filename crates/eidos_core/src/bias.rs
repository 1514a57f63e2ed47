//! Generalization-bias detection over user input.
//!
//! Flags sweeping-statement patterns so responses can be framed with a
//! balancing note. Substring matching against fixed phrase lists; a flag
//! means "worth softening", not a verdict about the speaker.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiasKind {
    Confirmation,
    Cultural,
    Political,
    Gender,
    Age,
}

impl BiasKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BiasKind::Confirmation => "confirmation",
            BiasKind::Cultural => "cultural",
            BiasKind::Political => "political",
            BiasKind::Gender => "gender",
            BiasKind::Age => "age",
        }
    }
}

/// Result of scanning one message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiasAnalysis {
    pub detected: Vec<BiasKind>,
    /// Framing line prepended to a reply when biases were found.
    pub guidance: String,
    /// Concatenated per-kind mitigation notes, appended to a reply.
    pub mitigation: String,
}

impl BiasAnalysis {
    pub fn is_clear(&self) -> bool {
        self.detected.is_empty()
    }
}

const PATTERNS: &[(BiasKind, &[&str])] = &[
    (
        BiasKind::Confirmation,
        &["always", "never", "everyone", "nobody", "all", "none"],
    ),
    (
        BiasKind::Cultural,
        &["those people", "they all", "typical", "all of them"],
    ),
    (
        BiasKind::Political,
        &["liberals", "conservatives", "left", "right", "democrats", "republicans"],
    ),
    (
        BiasKind::Gender,
        &["all men", "all women", "typical male", "typical female"],
    ),
    (
        BiasKind::Age,
        &["millennials are", "boomers are", "gen z", "old people"],
    ),
];

fn mitigation_for(kind: BiasKind) -> &'static str {
    match kind {
        BiasKind::Confirmation => {
            "Consider alternative perspectives and exceptions to this generalization."
        }
        BiasKind::Cultural => "Remember that individuals within any group are diverse and unique.",
        BiasKind::Political => {
            "Political views exist on a spectrum, and people often hold nuanced positions."
        }
        BiasKind::Gender => "Gender expressions and behaviors vary greatly among individuals.",
        BiasKind::Age => {
            "Each generation contains individuals with diverse experiences and perspectives."
        }
    }
}

const GUIDANCE_FLAGGED: &str = "I notice some potential biases in this perspective. Let me provide \
     a balanced view that considers multiple viewpoints and individual differences.";
const GUIDANCE_CLEAR: &str = "This seems like a balanced perspective. Let me help you explore this \
     further while maintaining awareness of different viewpoints.";

/// Stateless detector over the fixed pattern taxonomy.
#[derive(Debug, Default, Clone, Copy)]
pub struct BiasDetector;

impl BiasDetector {
    pub fn analyze(&self, text: &str) -> BiasAnalysis {
        let lower = text.to_lowercase();
        let mut detected = Vec::new();
        let mut mitigations = Vec::new();

        for (kind, phrases) in PATTERNS {
            if phrases.iter().any(|p| lower.contains(p)) {
                detected.push(*kind);
                mitigations.push(mitigation_for(*kind));
            }
        }

        let guidance = if detected.is_empty() {
            GUIDANCE_CLEAR
        } else {
            GUIDANCE_FLAGGED
        };
        let mitigation = if mitigations.is_empty() {
            "Continue with current balanced approach.".to_string()
        } else {
            mitigations.join(" ")
        };

        BiasAnalysis {
            detected,
            guidance: guidance.to_string(),
            mitigation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_is_clear() {
        let analysis = BiasDetector.analyze("I enjoyed the hike this weekend");
        assert!(analysis.is_clear());
        assert!(analysis.guidance.contains("balanced perspective"));
    }

    #[test]
    fn test_confirmation_pattern() {
        let analysis = BiasDetector.analyze("everyone thinks this way, nobody disagrees");
        assert!(analysis.detected.contains(&BiasKind::Confirmation));
        assert!(analysis.mitigation.contains("alternative perspectives"));
    }

    #[test]
    fn test_multiple_kinds_accumulate_mitigations() {
        let analysis = BiasDetector.analyze("all men are typical and boomers are out of touch");
        assert!(analysis.detected.contains(&BiasKind::Gender));
        assert!(analysis.detected.contains(&BiasKind::Age));
        assert!(analysis.mitigation.contains("Gender expressions"));
        assert!(analysis.mitigation.contains("Each generation"));
    }

    #[test]
    fn test_detection_is_case_insensitive() {
        let analysis = BiasDetector.analyze("THOSE PEOPLE are Typical");
        assert!(analysis.detected.contains(&BiasKind::Cultural));
    }
}
