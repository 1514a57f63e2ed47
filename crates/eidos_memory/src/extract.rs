//! Regex-based personal-context extraction.
//!
//! A declarative table of (category, pattern) pairs, iterated uniformly
//! over each message. High-signal phrasings only: the goal is a profile
//! that stays useful, not a transcript of everything the user said.

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextCategory {
    /// Upcoming events and tasks ("tomorrow...", "I need to...")
    Future,
    Goal,
    Challenge,
    Preference,
    Relationship,
}

/// One captured phrase with its category.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub category: ContextCategory,
    pub text: String,
}

/// Captured text shorter than this is noise.
const MIN_CAPTURE_LEN: usize = 3;

/// Tokens dropped during topic extraction.
const STOPWORDS: &[&str] = &[
    "this", "that", "with", "have", "will", "been", "were", "they", "them", "what", "when",
    "where", "how",
];

pub struct ContextExtractor {
    rules: Vec<(ContextCategory, Regex)>,
    relationship: Regex,
}

impl Default for ContextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextExtractor {
    pub fn new() -> Self {
        let table: &[(ContextCategory, &str)] = &[
            (
                ContextCategory::Future,
                r"(?i)(?:later|tomorrow|next week|next month|planning to|going to|will|gonna)\s+(.+)",
            ),
            (
                ContextCategory::Future,
                r"(?i)(?:i need to|i have to|i must|i should)\s+(.+)",
            ),
            (
                ContextCategory::Goal,
                r"(?i)(?:my goal is|i want to|hoping to|trying to)\s+(.+)",
            ),
            (
                ContextCategory::Challenge,
                r"(?i)(?:struggling with|difficult|problem with|challenge)\s+(.+)",
            ),
            (
                ContextCategory::Preference,
                r"(?i)(?:i like|i love|i prefer|i enjoy)\s+(.+)",
            ),
        ];

        let rules = table
            .iter()
            .map(|(category, pattern)| {
                (
                    *category,
                    Regex::new(pattern).expect("context pattern must compile"),
                )
            })
            .collect();

        // Relationship capture keeps the relation word plus an optional
        // trailing descriptive clause.
        let relationship = Regex::new(
            r"(?i)(?:my|with my)\s+(mom|dad|sister|brother|friend|partner|spouse|wife|husband|boss|colleague)(\s+.+)?",
        )
        .expect("relationship pattern must compile");

        Self {
            rules,
            relationship,
        }
    }

    /// Run every rule against the text. Duplicate handling and caps are
    /// the profile's concern; this returns raw captures.
    pub fn extract(&self, text: &str) -> Vec<Extraction> {
        let mut out = Vec::new();

        for (category, re) in &self.rules {
            for cap in re.captures_iter(text) {
                if let Some(m) = cap.get(1) {
                    let captured = m.as_str().trim();
                    if captured.len() >= MIN_CAPTURE_LEN {
                        out.push(Extraction {
                            category: *category,
                            text: captured.to_string(),
                        });
                    }
                }
            }
        }

        for cap in self.relationship.captures_iter(text) {
            let relation = match cap.get(1) {
                Some(m) => m.as_str().to_lowercase(),
                None => continue,
            };
            let text = match cap.get(2) {
                Some(rest) if !rest.as_str().trim().is_empty() => {
                    format!("{} {}", relation, rest.as_str().trim())
                }
                _ => relation,
            };
            if text.len() >= MIN_CAPTURE_LEN {
                out.push(Extraction {
                    category: ContextCategory::Relationship,
                    text,
                });
            }
        }

        out
    }

    /// Significant topic tokens: lowercase, punctuation-trimmed words
    /// longer than 3 characters that are not stop-words.
    pub fn topics(text: &str) -> Vec<String> {
        text.split_whitespace()
            .map(|word| {
                word.trim_matches(|c: char| !c.is_alphanumeric())
                    .to_lowercase()
            })
            .filter(|word| word.len() > 3 && !STOPWORDS.contains(&word.as_str()))
            .collect()
    }
}
