//! Batch pattern analysis over interview responses.
//!
//! Accumulates (question, response) pairs for a session and derives four
//! profile facets — demographic, emotional, beliefs, and a "mind dataset"
//! of motives — each with its own confidence score. Everything here is
//! keyword tallying over fixed taxonomies; the confidences are honest
//! about that.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

// ============================================================================
// Fixed taxonomies
// ============================================================================

struct GenerationBand {
    name: &'static str,
    birth_years: (i32, i32),
    markers: &'static [&'static str],
    traits: &'static [&'static str],
}

const GENERATIONS: &[GenerationBand] = &[
    GenerationBand {
        name: "Gen Z",
        birth_years: (1997, 2012),
        markers: &["tiktok", "social media", "climate change", "digital native", "covid", "pandemic", "online learning"],
        traits: &["Digital native", "Social justice oriented", "Entrepreneurial", "Mental health aware"],
    },
    GenerationBand {
        name: "Millennial",
        birth_years: (1981, 1996),
        markers: &["college debt", "housing market", "9/11", "2008 recession", "harry potter", "social media", "internet"],
        traits: &["Tech-savvy", "Experience-focused", "Socially conscious", "Career-driven"],
    },
    GenerationBand {
        name: "Gen X",
        birth_years: (1965, 1980),
        markers: &["cold war", "mtv", "reagan", "challenger", "berlin wall", "dial-up", "walkman"],
        traits: &["Independent", "Pragmatic", "Skeptical", "Self-reliant"],
    },
    GenerationBand {
        name: "Boomer",
        birth_years: (1946, 1964),
        markers: &["vietnam", "woodstock", "kennedy", "moon landing", "watergate", "civil rights"],
        traits: &["Experience-rich", "Value-driven", "Relationship-focused", "Stability-oriented"],
    },
];

/// Extended tone list for interview responses. Broader than the turn
/// classifier: retrospective questions surface nostalgia, hope, and
/// regret that a live-chat lexicon misses.
const TONES: &[(&str, &[&str])] = &[
    ("happy", &["happy", "joy", "excited", "great", "wonderful", "amazing", "love"]),
    ("sad", &["sad", "depressed", "down", "upset", "disappointed", "miserable"]),
    ("angry", &["angry", "mad", "frustrated", "annoyed", "furious", "rage"]),
    ("fearful", &["scared", "afraid", "worried", "anxious", "nervous", "terrified"]),
    ("nostalgic", &["remember", "miss", "nostalgia", "back then", "those days", "childhood"]),
    ("hopeful", &["hope", "looking forward", "excited about", "future", "plan", "dream"]),
    ("regretful", &["regret", "wish i had", "should have", "missed opportunity"]),
];

const NEUTRAL_TONE: &str = "neutral";

const TOPICS: &[(&str, &[&str])] = &[
    ("career", &["job", "career", "work", "profession", "company", "business"]),
    ("education", &["school", "college", "university", "degree", "study", "learn"]),
    ("family", &["family", "parent", "child", "mother", "father", "sister", "brother"]),
    ("relationships", &["friend", "relationship", "partner", "marriage", "date", "love"]),
    ("health", &["health", "exercise", "diet", "doctor", "illness", "wellness"]),
    ("finance", &["money", "finance", "budget", "saving", "investment", "debt"]),
    ("hobbies", &["hobby", "interest", "sport", "game", "music", "art", "read"]),
    ("technology", &["technology", "computer", "internet", "digital", "online", "app"]),
    ("politics", &["politics", "government", "election", "vote", "policy", "law"]),
    ("spirituality", &["god", "faith", "spiritual", "religion", "belief", "soul"]),
];

const VALUES: &[(&str, &[&str])] = &[
    ("family", &["family", "parents", "children", "siblings", "relatives"]),
    ("achievement", &["success", "achievement", "accomplish", "goal", "ambition"]),
    ("security", &["security", "safety", "stability", "protection", "reliable"]),
    ("freedom", &["freedom", "independence", "choice", "liberty", "autonomy"]),
    ("tradition", &["tradition", "heritage", "culture", "custom", "ritual"]),
    ("spirituality", &["god", "faith", "spiritual", "religion", "belief", "soul"]),
    ("knowledge", &["knowledge", "learning", "education", "wisdom", "understanding"]),
    ("creativity", &["creative", "art", "innovation", "original", "imagination"]),
    ("helping others", &["help", "service", "volunteer", "community", "giving back"]),
    ("health", &["health", "wellness", "fitness", "wellbeing", "self-care"]),
];

const WORLDVIEWS: &[(&str, &[&str])] = &[
    ("optimistic", &["positive", "hopeful", "optimistic", "bright future", "opportunity"]),
    ("pessimistic", &["negative", "worried", "pessimistic", "dark future", "problem"]),
    ("pragmatic", &["practical", "realistic", "sensible", "logical", "rational"]),
    ("idealistic", &["ideal", "perfect", "utopia", "dream", "vision", "should be"]),
    ("individualistic", &["individual", "self", "personal", "own", "independent"]),
    ("collectivistic", &["community", "together", "group", "society", "collective"]),
];

pub(crate) const INSUFFICIENT: &str = "Insufficient data";

// ============================================================================
// Facets
// ============================================================================

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DemographicProfile {
    pub generation: Option<String>,
    pub age_range: Option<String>,
    pub birth_year_estimate: Option<i32>,
    pub confidence: f32,
    pub generation_traits: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmotionalProfile {
    pub dominant_emotions: Vec<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub coping_mechanisms: Vec<String>,
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BeliefSystem {
    pub core_values: Vec<String>,
    pub worldview: String,
    pub priorities: Vec<String>,
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MindDataset {
    pub objects_of_importance: Vec<String>,
    pub goal_motives: Vec<String>,
    pub likely_responses: Vec<String>,
    pub underlying_values: Vec<String>,
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PatternAnalysis {
    pub demographic: DemographicProfile,
    pub emotional: EmotionalProfile,
    pub beliefs: BeliefSystem,
    pub mind: MindDataset,
    /// Arithmetic mean of the four facet confidences.
    pub overall_confidence: f32,
}

// ============================================================================
// Recognition system
// ============================================================================

#[derive(Debug, Clone)]
struct ResponseRecord {
    #[allow(dead_code)]
    question: String,
    response: String,
    #[allow(dead_code)]
    timestamp: DateTime<Utc>,
    tone: &'static str,
    topics: Vec<&'static str>,
}

#[derive(Debug, Clone, Copy, Default)]
struct AgeSignal {
    age: Option<i32>,
    birth_year: Option<i32>,
    confidence: f32,
}

pub struct PatternRecognition {
    responses: Vec<ResponseRecord>,
    current_year: i32,
    tone_patterns: Vec<(&'static str, Regex)>,
    age_re: Regex,
    birth_year_re: Regex,
    graduation_re: Regex,
    event_age_re: Regex,
}

impl PatternRecognition {
    pub fn new(current_year: i32) -> Self {
        let tone_patterns = TONES
            .iter()
            .map(|(tone, keywords)| {
                let alternation = keywords.join("|");
                let re = Regex::new(&format!(r"(?i)\b(?:{alternation})\b"))
                    .expect("tone pattern must compile");
                (*tone, re)
            })
            .collect();

        Self {
            responses: Vec::new(),
            current_year,
            tone_patterns,
            age_re: Regex::new(
                r"(?i)\b(?:i am|i'm)\s+(\d{1,2})\s+(?:years old|year old|years|year)\b",
            )
            .expect("age pattern must compile"),
            birth_year_re: Regex::new(r"(?i)\b(?:born in|birth year|born)\s+(?:in\s+)?(\d{4})\b")
                .expect("birth year pattern must compile"),
            graduation_re: Regex::new(
                r"(?i)\b(?:graduated|graduation|graduate)\s+(?:(?:in|from)\s+)?(\d{4})\b",
            )
            .expect("graduation pattern must compile"),
            event_age_re: Regex::new(r"(?i)\b(?:i was|i remember being)\s+(\d{1,2})\b")
                .expect("event age pattern must compile"),
        }
    }

    /// Record one (question, response) pair with its detected tone and
    /// topics. Unbounded for the session by design.
    pub fn add_response(&mut self, question: &str, response: &str) {
        let record = ResponseRecord {
            question: question.to_string(),
            response: response.to_string(),
            timestamp: Utc::now(),
            tone: self.detect_tone(response),
            topics: detect_topics(response),
        };
        tracing::debug!("Recorded interview response (tone: {})", record.tone);
        self.responses.push(record);
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    pub fn reset(&mut self) {
        self.responses.clear();
    }

    /// Run the full batch analysis over everything collected so far.
    pub fn analyze(&self) -> PatternAnalysis {
        let demographic = self.infer_demographic();
        let emotional = self.infer_emotional();
        let beliefs = self.infer_beliefs();
        let mind = self.infer_mind(&beliefs);

        let overall_confidence = (demographic.confidence
            + emotional.confidence
            + beliefs.confidence
            + mind.confidence)
            / 4.0;

        PatternAnalysis {
            demographic,
            emotional,
            beliefs,
            mind,
            overall_confidence,
        }
    }

    fn detect_tone(&self, text: &str) -> &'static str {
        let mut best = NEUTRAL_TONE;
        let mut best_score = 0usize;
        for (tone, re) in &self.tone_patterns {
            let score = re.find_iter(text).count();
            if score > best_score {
                best_score = score;
                best = *tone;
            }
        }
        best
    }

    // ------------------------------------------------------------------
    // Demographic facet
    // ------------------------------------------------------------------

    /// Ordered alternatives, first match wins: stated age (0.9), birth
    /// year (0.85), graduation year at an assumed age of 22 (0.6), age at
    /// a dated historical event (0.7).
    fn age_signal(&self) -> AgeSignal {
        for record in &self.responses {
            if let Some(cap) = self.age_re.captures(&record.response) {
                if let Ok(age) = cap[1].parse::<i32>() {
                    return AgeSignal {
                        age: Some(age),
                        birth_year: Some(self.current_year - age),
                        confidence: 0.9,
                    };
                }
            }
        }
        for record in &self.responses {
            if let Some(cap) = self.birth_year_re.captures(&record.response) {
                if let Ok(year) = cap[1].parse::<i32>() {
                    return AgeSignal {
                        age: Some(self.current_year - year),
                        birth_year: Some(year),
                        confidence: 0.85,
                    };
                }
            }
        }
        for record in &self.responses {
            if let Some(cap) = self.graduation_re.captures(&record.response) {
                if let Ok(year) = cap[1].parse::<i32>() {
                    let birth_year = year - 22;
                    return AgeSignal {
                        age: Some(self.current_year - birth_year),
                        birth_year: Some(birth_year),
                        confidence: 0.6,
                    };
                }
            }
        }
        for record in &self.responses {
            if record.response.contains("9/11") {
                if let Some(cap) = self.event_age_re.captures(&record.response) {
                    if let Ok(age_then) = cap[1].parse::<i32>() {
                        let birth_year = 2001 - age_then;
                        return AgeSignal {
                            age: Some(self.current_year - birth_year),
                            birth_year: Some(birth_year),
                            confidence: 0.7,
                        };
                    }
                }
            }
        }
        AgeSignal::default()
    }

    fn infer_demographic(&self) -> DemographicProfile {
        let signal = self.age_signal();
        let mut generation: Option<&GenerationBand> = None;
        let mut confidence = signal.confidence;

        if let Some(birth_year) = signal.birth_year {
            if let Some(band) = GENERATIONS
                .iter()
                .find(|g| birth_year >= g.birth_years.0 && birth_year <= g.birth_years.1)
            {
                generation = Some(band);
                confidence += 0.2;
            }
        }

        // No direct signal: count generation markers across all responses.
        if generation.is_none() {
            let joined = self.joined_responses();
            let mut best_hits = 0usize;
            for band in GENERATIONS {
                let hits = band
                    .markers
                    .iter()
                    .filter(|marker| joined.contains(*marker))
                    .count();
                if hits > best_hits {
                    best_hits = hits;
                    generation = Some(band);
                }
            }
            if best_hits > 0 {
                confidence = (0.3 + best_hits as f32 * 0.1).min(0.7);
            }
        }

        let age_range = match (generation, signal.age) {
            (Some(band), _) => {
                let min_age = self.current_year - band.birth_years.1;
                let max_age = self.current_year - band.birth_years.0;
                Some(format!("{min_age}-{max_age}"))
            }
            (None, Some(age)) => Some(format!("{}-{}", age - 2, age + 2)),
            (None, None) => None,
        };

        DemographicProfile {
            generation: generation.map(|g| g.name.to_string()),
            age_range,
            birth_year_estimate: signal.birth_year,
            confidence: confidence.min(1.0),
            generation_traits: generation
                .map(|g| g.traits.iter().map(|t| t.to_string()).collect())
                .unwrap_or_default(),
        }
    }

    // ------------------------------------------------------------------
    // Emotional facet
    // ------------------------------------------------------------------

    fn tone_counts(&self) -> Vec<(&'static str, u32)> {
        // Fixed order keeps the output deterministic on count ties.
        let mut counts: Vec<(&'static str, u32)> = TONES
            .iter()
            .map(|(tone, _)| (*tone, 0))
            .chain(std::iter::once((NEUTRAL_TONE, 0)))
            .collect();
        for record in &self.responses {
            if let Some(entry) = counts.iter_mut().find(|(tone, _)| *tone == record.tone) {
                entry.1 += 1;
            }
        }
        counts.retain(|(_, count)| *count > 0);
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }

    fn infer_emotional(&self) -> EmotionalProfile {
        let counts = self.tone_counts();
        let dominant: Vec<&'static str> =
            counts.iter().take(3).map(|(tone, _)| *tone).collect();

        let mut strengths = Vec::new();
        let mut weaknesses = Vec::new();
        let mut coping = Vec::new();

        if dominant.contains(&"happy") || dominant.contains(&"hopeful") {
            strengths.push("Optimism".to_string());
            strengths.push("Positive outlook".to_string());
        }
        if dominant.contains(&"nostalgic") {
            strengths.push("Strong memory recall".to_string());
            strengths.push("Emotional connection to past".to_string());
            if dominant.contains(&"sad") {
                weaknesses.push("May dwell on the past".to_string());
            }
        }
        if dominant.contains(&"angry") {
            weaknesses.push("Frustration management".to_string());
            coping.push("Needs healthy outlets for frustration".to_string());
        }
        if dominant.contains(&"fearful") {
            weaknesses.push("Anxiety management".to_string());
            coping.push("May benefit from stress reduction techniques".to_string());
        }
        if dominant.contains(&"regretful") {
            weaknesses.push("Self-forgiveness".to_string());
            coping.push("Needs to practice acceptance of past decisions".to_string());
        }

        let total: u32 = counts.iter().map(|(_, c)| c).sum();
        let unique = counts.len() as f32;
        let consistency = if unique > 0.0 { total as f32 / unique } else { 0.0 };
        let confidence =
            (self.responses.len() as f32 * 0.2 * (consistency * 0.5)).min(1.0);

        EmotionalProfile {
            dominant_emotions: dominant.iter().map(|t| t.to_string()).collect(),
            strengths: or_insufficient(strengths),
            weaknesses: or_insufficient(weaknesses),
            coping_mechanisms: or_insufficient(coping),
            confidence,
        }
    }

    // ------------------------------------------------------------------
    // Beliefs facet
    // ------------------------------------------------------------------

    fn joined_responses(&self) -> String {
        self.responses
            .iter()
            .map(|r| r.response.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn infer_beliefs(&self) -> BeliefSystem {
        let joined = self.joined_responses();

        let value_counts: Vec<(&'static str, usize)> = VALUES
            .iter()
            .map(|(value, keywords)| {
                let hits = keywords.iter().filter(|kw| joined.contains(*kw)).count();
                (*value, hits)
            })
            .collect();
        let worldview_counts: Vec<(&'static str, usize)> = WORLDVIEWS
            .iter()
            .map(|(view, keywords)| {
                let hits = keywords.iter().filter(|kw| joined.contains(*kw)).count();
                (*view, hits)
            })
            .collect();

        let mut core_values: Vec<(&'static str, usize)> = value_counts
            .iter()
            .filter(|(_, hits)| *hits > 0)
            .copied()
            .collect();
        core_values.sort_by(|a, b| b.1.cmp(&a.1));
        let core_values: Vec<String> = core_values
            .iter()
            .take(5)
            .map(|(value, _)| value.to_string())
            .collect();

        // Strict '>' keeps the first-declared worldview on ties.
        let mut worldview = "unclear";
        let mut worldview_best = 0usize;
        for (view, hits) in &worldview_counts {
            if *hits > worldview_best {
                worldview_best = *hits;
                worldview = *view;
            }
        }
        let worldview = worldview.to_string();

        let priorities: Vec<String> = self
            .topic_counts()
            .into_iter()
            .take(3)
            .map(|(topic, _)| topic.to_string())
            .collect();

        let value_hits: usize = value_counts.iter().map(|(_, hits)| hits).sum();
        let worldview_hits: usize = worldview_counts.iter().map(|(_, hits)| hits).sum();
        let confidence = (value_hits as f32 * 0.1
            + worldview_hits as f32 * 0.1
            + self.responses.len() as f32 * 0.1)
            .min(1.0);

        BeliefSystem {
            core_values: or_insufficient(core_values),
            worldview,
            priorities: or_insufficient(priorities),
            confidence,
        }
    }

    // ------------------------------------------------------------------
    // Mind dataset facet
    // ------------------------------------------------------------------

    fn topic_counts(&self) -> Vec<(&'static str, u32)> {
        let mut counts: HashMap<&'static str, u32> = HashMap::new();
        for record in &self.responses {
            for topic in &record.topics {
                *counts.entry(topic).or_default() += 1;
            }
        }
        // Deterministic order: count descending, taxonomy order on ties.
        let mut ordered: Vec<(&'static str, u32)> = TOPICS
            .iter()
            .filter_map(|(topic, _)| counts.get(topic).map(|c| (*topic, *c)))
            .collect();
        ordered.sort_by(|a, b| b.1.cmp(&a.1));
        ordered
    }

    fn infer_mind(&self, beliefs: &BeliefSystem) -> MindDataset {
        let objects: Vec<&'static str> = self
            .topic_counts()
            .into_iter()
            .take(5)
            .map(|(topic, _)| topic)
            .collect();

        let mut motives = Vec::new();
        for object in &objects {
            for motive in motives_for(object) {
                motives.push(motive.to_string());
            }
        }

        let dominant_tone = self
            .tone_counts()
            .first()
            .map(|(tone, _)| *tone)
            .unwrap_or(NEUTRAL_TONE);
        let likely: Vec<String> = likely_responses_for(dominant_tone)
            .iter()
            .map(|s| s.to_string())
            .collect();

        let confidence = (objects.len() as f32 * 0.1
            + motives.len() as f32 * 0.1
            + likely.len() as f32 * 0.1
            + self.responses.len() as f32 * 0.1)
            .min(1.0);

        MindDataset {
            objects_of_importance: objects.iter().map(|o| o.to_string()).collect(),
            goal_motives: motives,
            likely_responses: likely,
            underlying_values: beliefs.core_values.clone(),
            confidence,
        }
    }

    // ------------------------------------------------------------------
    // Question recommendation
    // ------------------------------------------------------------------

    /// Up to five questions chosen by the largest knowledge gap: no age
    /// signal, too few emotionally-tagged responses, weak belief signal,
    /// or simply not enough responses yet.
    pub fn recommended_questions(&self) -> Vec<String> {
        let mut questions: Vec<String> = Vec::new();
        let year = self.current_year;

        if self.age_signal().age.is_none() {
            questions.push(format!("What were you doing in the summer of {}?", year - 20));
            questions.push(format!("How did you feel about the events of {}?", year - 10));
            questions.push(format!(
                "What was your favorite music or movie from the early {}s?",
                (year - 15) / 10 * 10
            ));
        }

        let toned = self
            .responses
            .iter()
            .filter(|r| r.tone != NEUTRAL_TONE)
            .count();
        if toned < 2 {
            questions.push("What's a time in your life when you felt most proud?".to_string());
            questions
                .push("Can you tell me about a challenging period you've overcome?".to_string());
            questions
                .push("What's something you're looking forward to in the future?".to_string());
        }

        if self.infer_beliefs().confidence < 0.4 {
            questions.push("What values do you consider most important in life?".to_string());
            questions.push("How do you approach making difficult decisions?".to_string());
            questions.push(
                "What do you think is most important for the next generation to understand?"
                    .to_string(),
            );
        }

        if self.responses.len() < 3 {
            questions.push("What were you doing in 1999?".to_string());
            questions.push("How did you feel about life in 1992?".to_string());
            questions.push("What was happening in your world in 2005?".to_string());
        }

        let mut unique = Vec::new();
        for question in questions {
            if !unique.contains(&question) {
                unique.push(question);
            }
        }
        unique.truncate(5);
        unique
    }
}

fn detect_topics(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    TOPICS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|kw| lower.contains(kw)))
        .map(|(topic, _)| *topic)
        .collect()
}

fn or_insufficient(list: Vec<String>) -> Vec<String> {
    if list.is_empty() {
        vec![INSUFFICIENT.to_string()]
    } else {
        list
    }
}

fn motives_for(object: &str) -> &'static [&'static str] {
    match object {
        "career" => &["Professional advancement", "Financial stability"],
        "education" => &["Knowledge acquisition", "Skill development"],
        "family" => &["Nurturing relationships", "Creating stability"],
        "relationships" => &["Connection", "Emotional fulfillment"],
        "health" => &["Wellbeing", "Longevity"],
        "finance" => &["Financial security", "Wealth building"],
        "hobbies" => &["Personal enjoyment", "Self-expression"],
        _ => &["Personal fulfillment"],
    }
}

fn likely_responses_for(tone: &str) -> &'static [&'static str] {
    match tone {
        "happy" => &["Enthusiastic engagement", "Positive outlook on challenges"],
        "sad" => &["Cautious approach", "Seeking emotional support"],
        "angry" => &["Direct confrontation", "Seeking justice or resolution"],
        "fearful" => &["Risk avoidance", "Seeking security and reassurance"],
        "nostalgic" => &["Connection to past experiences", "Seeking familiar patterns"],
        _ => &["Balanced consideration", "Pragmatic approach"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YEAR: i32 = 2026;

    fn system_with(responses: &[&str]) -> PatternRecognition {
        let mut system = PatternRecognition::new(YEAR);
        for (i, response) in responses.iter().enumerate() {
            system.add_response(&format!("question {i}"), response);
        }
        system
    }

    #[test]
    fn test_tone_detection() {
        let system = PatternRecognition::new(YEAR);
        assert_eq!(system.detect_tone("I was so happy and excited"), "happy");
        assert_eq!(system.detect_tone("I regret the move, wish I had stayed"), "regretful");
        assert_eq!(system.detect_tone("the sky is blue"), "neutral");
    }

    #[test]
    fn test_topic_detection() {
        let topics = detect_topics("My job at the company pays my college debt");
        assert!(topics.contains(&"career"));
        assert!(topics.contains(&"education"));
        assert!(topics.contains(&"finance"));
    }

    #[test]
    fn test_stated_age_wins_with_high_confidence() {
        let system = system_with(&["I'm 34 years old and doing fine"]);
        let demo = system.analyze().demographic;
        assert_eq!(demo.birth_year_estimate, Some(YEAR - 34));
        // 1992 lands in the Millennial band; 0.9 + 0.2 clamps to 1.0
        assert_eq!(demo.generation.as_deref(), Some("Millennial"));
        assert!((demo.confidence - 1.0).abs() < 1e-6);
        assert!(!demo.generation_traits.is_empty());
    }

    #[test]
    fn test_birth_year_extraction() {
        let system = system_with(&["I was born in 1975, small town"]);
        let demo = system.analyze().demographic;
        assert_eq!(demo.birth_year_estimate, Some(1975));
        assert_eq!(demo.generation.as_deref(), Some("Gen X"));
        assert_eq!(demo.age_range, Some(format!("{}-{}", YEAR - 1980, YEAR - 1965)));
    }

    #[test]
    fn test_graduation_year_estimate() {
        let system = system_with(&["I graduated in 2008 and moved abroad"]);
        let demo = system.analyze().demographic;
        assert_eq!(demo.birth_year_estimate, Some(1986));
        assert_eq!(demo.generation.as_deref(), Some("Millennial"));
        assert!((demo.confidence - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_historical_event_age() {
        let system = system_with(&["When 9/11 happened I was 15 and in school"]);
        let demo = system.analyze().demographic;
        assert_eq!(demo.birth_year_estimate, Some(1986));
        assert!((demo.confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_marker_fallback_without_direct_signal() {
        let system = system_with(&[
            "I listened to my walkman constantly",
            "mtv was everything back in the day",
        ]);
        let demo = system.analyze().demographic;
        assert_eq!(demo.generation.as_deref(), Some("Gen X"));
        assert_eq!(demo.birth_year_estimate, None);
        assert!((demo.confidence - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_no_signal_at_all() {
        let system = system_with(&["nothing remarkable here"]);
        let demo = system.analyze().demographic;
        assert_eq!(demo.generation, None);
        assert_eq!(demo.age_range, None);
        assert_eq!(demo.confidence, 0.0);
    }

    #[test]
    fn test_emotional_profile_strengths_and_weaknesses() {
        let system = system_with(&[
            "I was so happy and excited about it",
            "wonderful times, I love that memory",
            "lately I feel worried and anxious",
        ]);
        let emotional = system.analyze().emotional;
        assert_eq!(emotional.dominant_emotions[0], "happy");
        assert!(emotional.strengths.contains(&"Optimism".to_string()));
        assert!(emotional
            .weaknesses
            .contains(&"Anxiety management".to_string()));
        assert!(emotional.confidence > 0.0);
    }

    #[test]
    fn test_emotional_profile_insufficient_data() {
        let system = system_with(&["plain statement"]);
        let emotional = system.analyze().emotional;
        assert_eq!(emotional.strengths, vec![INSUFFICIENT.to_string()]);
        assert_eq!(emotional.coping_mechanisms, vec![INSUFFICIENT.to_string()]);
    }

    #[test]
    fn test_beliefs_values_and_worldview() {
        let system = system_with(&[
            "my family and parents mean everything, our community helps each other",
            "I try to stay positive and hopeful about the opportunity ahead",
        ]);
        let beliefs = system.analyze().beliefs;
        assert!(beliefs.core_values.contains(&"family".to_string()));
        assert_eq!(beliefs.worldview, "optimistic");
        assert!(beliefs.confidence > 0.0);
    }

    #[test]
    fn test_beliefs_unclear_worldview_without_hits() {
        let system = system_with(&["short reply"]);
        let beliefs = system.analyze().beliefs;
        assert_eq!(beliefs.worldview, "unclear");
    }

    #[test]
    fn test_mind_dataset_motives() {
        let system = system_with(&[
            "my job and career keep me busy at the company",
            "work has been rewarding this year",
        ]);
        let mind = system.analyze().mind;
        assert_eq!(mind.objects_of_importance[0], "career");
        assert!(mind
            .goal_motives
            .contains(&"Professional advancement".to_string()));
        assert!(!mind.likely_responses.is_empty());
    }

    #[test]
    fn test_overall_confidence_is_mean_of_facets() {
        let system = system_with(&["I'm 34 years old, happy with my job and family"]);
        let analysis = system.analyze();
        let expected = (analysis.demographic.confidence
            + analysis.emotional.confidence
            + analysis.beliefs.confidence
            + analysis.mind.confidence)
            / 4.0;
        assert!((analysis.overall_confidence - expected).abs() < 1e-6);
    }

    #[test]
    fn test_recommended_questions_for_fresh_system() {
        let system = PatternRecognition::new(YEAR);
        let questions = system.recommended_questions();
        assert_eq!(questions.len(), 5);
        assert!(questions[0].contains(&format!("{}", YEAR - 20)));
        // deduplicated
        let unique: std::collections::HashSet<_> = questions.iter().collect();
        assert_eq!(unique.len(), questions.len());
    }

    #[test]
    fn test_recommended_questions_shrink_with_knowledge() {
        let system = system_with(&[
            "I'm 34 years old and very happy with my family values and community work",
            "I feel hopeful and excited about the future, success and achievement matter",
            "I remember my childhood fondly, wonderful and positive times with my parents",
            "practical and realistic thinking guides my choices about money and health",
        ]);
        let questions = system.recommended_questions();
        // age known, tones present, beliefs confident, enough responses
        assert!(questions.is_empty(), "still recommended: {questions:?}");
    }

    #[test]
    fn test_reset_clears_responses() {
        let mut system = system_with(&["I'm 34 years old"]);
        assert_eq!(system.len(), 1);
        system.reset();
        assert!(system.is_empty());
        assert_eq!(system.analyze().demographic.confidence, 0.0);
    }
}
