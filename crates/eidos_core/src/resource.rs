//! Emotion → simulated resource-state mapping.
//!
//! The resource state is advisory telemetry only: it feeds displays and
//! snapshots attached to memory nodes. Nothing schedules or blocks on it.

use crate::emotion::Emotion;
use serde::{Deserialize, Serialize};

/// Four unitless positive scalars describing the simulated machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    pub compute_rate: f32,
    pub memory_pressure: f32,
    pub throughput: f32,
    pub load: f32,
}

impl Default for ResourceState {
    fn default() -> Self {
        Self {
            compute_rate: 1.0,
            memory_pressure: 1.0,
            throughput: 1.0,
            load: 0.5,
        }
    }
}

impl ResourceState {
    /// Map an emotion and intensity onto the resource vector.
    ///
    /// Each emotion applies a fixed linear formula `1.0 + intensity * k`
    /// per dimension; `load` is the intensity itself. Emotions without
    /// their own coefficients use the `happy` formula.
    pub fn for_emotion(emotion: Emotion, intensity: f32) -> Self {
        let intensity = intensity.clamp(0.0, 2.0);
        let (compute, memory, through) = coefficients(emotion);
        Self {
            compute_rate: 1.0 + intensity * compute,
            memory_pressure: 1.0 + intensity * memory,
            throughput: 1.0 + intensity * through,
            load: intensity,
        }
    }
}

/// Per-emotion coefficients for (compute_rate, memory_pressure,
/// throughput). Hand-tuned display heuristics, not a performance model.
fn coefficients(emotion: Emotion) -> (f32, f32, f32) {
    match emotion {
        Emotion::Sad => (-0.3, 0.2, -0.4),
        Emotion::Angry => (0.6, 0.1, 0.3),
        Emotion::Fearful => (0.7, 0.0, 0.5),
        Emotion::Surprised => (0.8, 0.4, 0.6),
        Emotion::Disgusted => (-0.2, -0.1, -0.3),
        // happy, and every emotion without its own tuning
        _ => (0.5, 0.3, 0.4),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_raises_every_dimension() {
        let state = ResourceState::for_emotion(Emotion::Happy, 1.0);
        assert!(state.compute_rate > 1.0);
        assert!(state.memory_pressure > 1.0);
        assert!(state.throughput > 1.0);
        assert_eq!(state.load, 1.0);
    }

    #[test]
    fn test_disgusted_lowers_compute_and_throughput() {
        let state = ResourceState::for_emotion(Emotion::Disgusted, 1.0);
        assert!(state.compute_rate < 1.0);
        assert!(state.throughput < 1.0);
    }

    #[test]
    fn test_fearful_leaves_memory_flat() {
        let state = ResourceState::for_emotion(Emotion::Fearful, 1.5);
        assert!((state.memory_pressure - 1.0).abs() < 1e-6);
        assert!(state.compute_rate > 1.9);
    }

    #[test]
    fn test_unmapped_emotions_fall_back_to_happy() {
        let happy = ResourceState::for_emotion(Emotion::Happy, 1.2);
        for emotion in [Emotion::Euphoric, Emotion::Depressed, Emotion::Content] {
            let state = ResourceState::for_emotion(emotion, 1.2);
            assert_eq!(state, happy);
        }
    }

    #[test]
    fn test_intensity_is_clamped() {
        let state = ResourceState::for_emotion(Emotion::Happy, 99.0);
        assert_eq!(state.load, 2.0);
        assert!((state.compute_rate - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_intensity_is_baseline() {
        let state = ResourceState::for_emotion(Emotion::Sad, 0.0);
        assert_eq!(state.compute_rate, 1.0);
        assert_eq!(state.load, 0.0);
    }
}
