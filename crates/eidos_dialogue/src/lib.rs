pub mod interview;
pub mod patterns;

pub use interview::{DialogueFlow, DialogueStage, DialogueState, QuestionAnswer, UserInfo};
pub use patterns::{
    BeliefSystem, DemographicProfile, EmotionalProfile, MindDataset, PatternAnalysis,
    PatternRecognition,
};
