//! Keyword-based emotion classification.
//!
//! Scores free text against fixed per-emotion keyword lists and derives an
//! intensity and confidence from surface features (caps, punctuation,
//! character repetition). Heuristic by design: this is the fast path that
//! runs on every turn, not an ML model.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// The fixed emotion vocabulary. Declaration order matters: when two
/// emotions score equally, the first-declared one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Fearful,
    Surprised,
    Disgusted,
    Euphoric,
    Depressed,
    Content,
}

impl Emotion {
    /// All emotions in declaration (tie-break) order.
    pub const ALL: [Emotion; 9] = [
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Fearful,
        Emotion::Surprised,
        Emotion::Disgusted,
        Emotion::Euphoric,
        Emotion::Depressed,
        Emotion::Content,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Fearful => "fearful",
            Emotion::Surprised => "surprised",
            Emotion::Disgusted => "disgusted",
            Emotion::Euphoric => "euphoric",
            Emotion::Depressed => "depressed",
            Emotion::Content => "content",
        }
    }

    /// Parse a stored label back into the enum. Unknown labels fall back
    /// to `Content` rather than failing the read path.
    pub fn parse(label: &str) -> Emotion {
        match label {
            "happy" => Emotion::Happy,
            "sad" => Emotion::Sad,
            "angry" => Emotion::Angry,
            "fearful" => Emotion::Fearful,
            "surprised" => Emotion::Surprised,
            "disgusted" => Emotion::Disgusted,
            "euphoric" => Emotion::Euphoric,
            "depressed" => Emotion::Depressed,
            _ => Emotion::Content,
        }
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification result for one piece of text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EmotionalSignal {
    pub emotion: Emotion,
    /// 0.0 - 2.0, where 1.0 is a balanced baseline
    pub intensity: f32,
    /// 0.1 - 1.0
    pub confidence: f32,
}

impl Default for EmotionalSignal {
    fn default() -> Self {
        Self {
            emotion: Emotion::Content,
            intensity: 1.0,
            confidence: 0.5,
        }
    }
}

/// Keyword lists per emotion, in tie-break order. `Content` has no
/// keywords: it is the fallback when nothing else scores.
const LEXICON: &[(Emotion, &[&str])] = &[
    (
        Emotion::Happy,
        &["happy", "joy", "excited", "great", "wonderful", "amazing", "fantastic", "love", "perfect"],
    ),
    (
        Emotion::Sad,
        &["sad", "depressed", "down", "upset", "disappointed", "miserable", "crying", "hurt"],
    ),
    (
        Emotion::Angry,
        &["angry", "mad", "frustrated", "annoyed", "furious", "rage", "hate", "pissed"],
    ),
    (
        Emotion::Fearful,
        &["scared", "afraid", "worried", "anxious", "nervous", "terrified", "panic", "stress", "stressed"],
    ),
    (
        Emotion::Surprised,
        &["surprised", "shocked", "amazed", "unexpected", "wow", "incredible", "unbelievable"],
    ),
    (
        Emotion::Disgusted,
        &["disgusted", "gross", "awful", "terrible", "revolting", "sick", "nasty"],
    ),
    (
        Emotion::Euphoric,
        &["euphoric", "ecstatic", "blissful", "elated", "overjoyed", "thrilled"],
    ),
    (
        Emotion::Depressed,
        &["depressed", "hopeless", "worthless", "empty", "numb", "suicidal"],
    ),
];

/// Whole-word keyword classifier. Compiles one alternation per emotion up
/// front; `classify` is then pure and allocation-light.
pub struct EmotionClassifier {
    patterns: Vec<(Emotion, Regex)>,
}

impl Default for EmotionClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl EmotionClassifier {
    pub fn new() -> Self {
        let patterns = LEXICON
            .iter()
            .map(|(emotion, keywords)| {
                let alternation = keywords.join("|");
                // Keywords are plain ASCII words, so the pattern is valid by
                // construction.
                let re = Regex::new(&format!(r"(?i)\b(?:{alternation})\b"))
                    .expect("emotion lexicon pattern must compile");
                (*emotion, re)
            })
            .collect();
        Self { patterns }
    }

    /// Classify a message. Deterministic, no side effects.
    pub fn classify(&self, text: &str) -> EmotionalSignal {
        let emotion = self.dominant_emotion(text);
        let intensity = intensity_of(text);
        let confidence = confidence_of(text);
        EmotionalSignal {
            emotion,
            intensity,
            confidence,
        }
    }

    fn dominant_emotion(&self, text: &str) -> Emotion {
        let mut best = Emotion::Content;
        let mut best_score = 0usize;
        for (emotion, re) in &self.patterns {
            let score = re.find_iter(text).count();
            // Strict '>' keeps the first-declared emotion on ties.
            if score > best_score {
                best_score = score;
                best = *emotion;
            }
        }
        best
    }
}

/// Intensity from surface features: capital-letter ratio, exclamation and
/// question marks, and runs of repeated characters. Clamped to [0, 2].
fn intensity_of(text: &str) -> f32 {
    let mut intensity = 1.0f32;

    let total = text.chars().count();
    if total > 0 {
        let caps = text.chars().filter(|c| c.is_ascii_uppercase()).count();
        intensity += (caps as f32 / total as f32) * 0.5;
    }

    let exclamations = text.chars().filter(|c| *c == '!').count();
    intensity += exclamations as f32 * 0.2;

    let questions = text.chars().filter(|c| *c == '?').count();
    intensity += questions as f32 * 0.1;

    intensity += repeated_runs(text) as f32 * 0.15;

    intensity.clamp(0.0, 2.0)
}

/// Confidence from message length and emphatic markers. Clamped to
/// [0.1, 1.0].
fn confidence_of(text: &str) -> f32 {
    let mut confidence = 0.5f32;

    let words = text.split_whitespace().count();
    if words > 10 {
        confidence += 0.2;
    }
    if words > 20 {
        confidence += 0.1;
    }

    let markers = punctuation_runs(text) + caps_runs(text) + repeated_runs(text);
    confidence += (markers as f32 * 0.1).min(0.3);

    confidence.clamp(0.1, 1.0)
}

/// Count maximal runs of three or more identical characters ("sooooo").
/// The regex crate has no backreferences, so this is a linear scan.
fn repeated_runs(text: &str) -> usize {
    let mut runs = 0;
    let mut prev: Option<char> = None;
    let mut len = 0usize;
    for c in text.chars() {
        if Some(c) == prev {
            len += 1;
        } else {
            if len >= 3 {
                runs += 1;
            }
            prev = Some(c);
            len = 1;
        }
    }
    if len >= 3 {
        runs += 1;
    }
    runs
}

/// Count maximal runs of '!' / '?' characters.
fn punctuation_runs(text: &str) -> usize {
    let mut runs = 0;
    let mut in_run = false;
    for c in text.chars() {
        if c == '!' || c == '?' {
            if !in_run {
                runs += 1;
                in_run = true;
            }
        } else {
            in_run = false;
        }
    }
    runs
}

/// Count maximal runs of three or more uppercase letters.
fn caps_runs(text: &str) -> usize {
    let mut runs = 0;
    let mut len = 0usize;
    for c in text.chars() {
        if c.is_ascii_uppercase() {
            len += 1;
        } else {
            if len >= 3 {
                runs += 1;
            }
            len = 0;
        }
    }
    if len >= 3 {
        runs += 1;
    }
    runs
}
