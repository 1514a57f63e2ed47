//! Response shaping: emotion framing, bias balancing, and
//! generation-aware guidance applied around a base completion.

use eidos_core::{BiasAnalysis, Emotion, EmotionalSignal};
use serde::Serialize;

/// Slang and topic markers that hint at a speaker's generation within a
/// single message. Looser than the interview-based inference: this runs
/// per turn and only nudges tone.
const GENERATION_MARKERS: &[(&str, &[&str])] = &[
    (
        "Gen Z",
        &["tiktok", "discord", "sus", "no cap", "fr", "periodt", "bet", "slaps", "bussin"],
    ),
    (
        "Millennial",
        &["facebook", "instagram", "adulting", "netflix", "student loans", "avocado toast", "gig economy"],
    ),
    (
        "Gen X",
        &["email", "work-life balance", "mortgage", "kids", "401k", "mtv", "grunge"],
    ),
    (
        "Boomer",
        &["retirement", "grandchildren", "facebook", "traditional", "pension", "landline"],
    ),
];

fn traits_for(generation: &str) -> &'static [&'static str] {
    match generation {
        "Gen Z" => &["Digital native", "Social justice oriented", "Entrepreneurial", "Mental health aware"],
        "Millennial" => &["Tech-savvy", "Experience-focused", "Socially conscious", "Career-driven"],
        "Gen X" => &["Independent", "Pragmatic", "Skeptical", "Self-reliant"],
        "Boomer" => &["Experience-rich", "Value-driven", "Relationship-focused", "Stability-oriented"],
        _ => &[],
    }
}

fn guidance_for(generation: &str) -> &'static str {
    match generation {
        "Gen Z" => {
            "I'll keep my response authentic and direct, focusing on practical solutions and \
             acknowledging the unique challenges your generation faces."
        }
        "Millennial" => {
            "Let me provide a balanced perspective that considers both idealistic goals and \
             practical constraints, recognizing your generation's unique position."
        }
        "Gen X" => {
            "I'll focus on pragmatic solutions that work within existing systems, respecting \
             your independent and self-reliant approach."
        }
        "Boomer" => {
            "I'll provide thoughtful, experience-based guidance with respect for traditional \
             values and the wisdom that comes with experience."
        }
        _ => {
            "I'll provide a balanced response suitable for any background, focusing on \
             universal human experiences."
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationGuidance {
    pub generation: String,
    pub traits: Vec<String>,
    pub guidance: String,
    pub confidence: f32,
}

/// Infer a generation hint from one message's markers. "Unknown" with
/// zero confidence when nothing matches.
pub fn infer_generation(text: &str) -> GenerationGuidance {
    let lower = text.to_lowercase();
    let mut best = "Unknown";
    let mut best_hits = 0usize;

    for (generation, markers) in GENERATION_MARKERS {
        let hits = markers.iter().filter(|m| lower.contains(*m)).count();
        if hits > best_hits {
            best_hits = hits;
            best = *generation;
        }
    }

    GenerationGuidance {
        generation: best.to_string(),
        traits: traits_for(best).iter().map(|t| t.to_string()).collect(),
        guidance: guidance_for(best).to_string(),
        confidence: (best_hits as f32 * 0.3).min(1.0),
    }
}

/// Wrap a base completion with emotion-conditioned framing, bias
/// balancing, and the generation guidance line.
pub fn shape_response(
    base: &str,
    signal: &EmotionalSignal,
    bias: &BiasAnalysis,
    guidance: &GenerationGuidance,
) -> String {
    let intense = signal.intensity > 1.5;
    let mut shaped = match signal.emotion {
        Emotion::Sad => {
            if intense {
                format!(
                    "I can sense you're going through a really difficult time. {base} Please \
                     know that these feelings are valid, and I'm here to support you through this."
                )
            } else {
                format!(
                    "I sense you might be feeling down. {base} Remember, it's okay to feel this \
                     way, and I'm here to help."
                )
            }
        }
        Emotion::Angry => {
            if intense {
                format!(
                    "I can feel the strong intensity in your message. Let's take a moment to \
                     process this. {base} We can work through this constructively together."
                )
            } else {
                format!("I sense some frustration here. {base} Let's approach this step by step.")
            }
        }
        Emotion::Fearful => format!(
            "I understand this might feel overwhelming or scary. {base} We can take this one \
             step at a time, and there's no pressure."
        ),
        Emotion::Happy => format!(
            "I love your positive energy! {base} Let's build on this momentum and explore this \
             further."
        ),
        Emotion::Euphoric => format!(
            "Your excitement is contagious! {base} While we celebrate this, let's also make \
             sure we're considering all aspects."
        ),
        Emotion::Depressed => format!(
            "I recognize you might be struggling with some deep feelings right now. {base} Your \
             wellbeing matters, and professional support might be helpful alongside our \
             conversation."
        ),
        _ => base.to_string(),
    };

    if !bias.is_clear() {
        shaped = format!("{} {} {}", bias.guidance, shaped, bias.mitigation);
    }

    shaped.push(' ');
    shaped.push_str(&guidance.guidance);
    shaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use eidos_core::BiasDetector;

    fn signal(emotion: Emotion, intensity: f32) -> EmotionalSignal {
        EmotionalSignal {
            emotion,
            intensity,
            confidence: 0.8,
        }
    }

    #[test]
    fn test_generation_markers() {
        let hint = infer_generation("saw it on tiktok, no cap");
        assert_eq!(hint.generation, "Gen Z");
        assert!((hint.confidence - 0.6).abs() < 1e-6);
        assert!(!hint.traits.is_empty());
    }

    #[test]
    fn test_unknown_generation_fallback() {
        let hint = infer_generation("a perfectly ordinary sentence");
        assert_eq!(hint.generation, "Unknown");
        assert_eq!(hint.confidence, 0.0);
        assert!(hint.guidance.contains("balanced response"));
    }

    #[test]
    fn test_happy_framing() {
        let bias = BiasDetector.analyze("nice weather");
        let guidance = infer_generation("nice weather");
        let shaped = shape_response("Good to hear.", &signal(Emotion::Happy, 1.2), &bias, &guidance);
        assert!(shaped.starts_with("I love your positive energy!"));
        assert!(shaped.contains("Good to hear."));
    }

    #[test]
    fn test_intense_sadness_escalates() {
        let bias = BiasDetector.analyze("plain");
        let guidance = infer_generation("plain");
        let mild = shape_response("Okay.", &signal(Emotion::Sad, 1.0), &bias, &guidance);
        let strong = shape_response("Okay.", &signal(Emotion::Sad, 1.8), &bias, &guidance);
        assert!(mild.contains("feeling down"));
        assert!(strong.contains("really difficult time"));
    }

    #[test]
    fn test_bias_wrapping() {
        let bias = BiasDetector.analyze("everyone always does this");
        let guidance = infer_generation("everyone always does this");
        let shaped = shape_response("Noted.", &signal(Emotion::Content, 1.0), &bias, &guidance);
        assert!(shaped.starts_with("I notice some potential biases"));
        assert!(shaped.contains("Noted."));
        assert!(shaped.contains("alternative perspectives"));
    }

    #[test]
    fn test_content_passes_base_through() {
        let bias = BiasDetector.analyze("neutral text");
        let guidance = infer_generation("neutral text");
        let shaped = shape_response("Base reply.", &signal(Emotion::Content, 1.0), &bias, &guidance);
        assert!(shaped.starts_with("Base reply."));
    }
}
