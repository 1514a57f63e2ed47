pub mod bounded;
pub mod extract;
pub mod profile;
pub mod repository;
pub mod sqlite;
pub mod store;

pub use extract::{ContextCategory, ContextExtractor, Extraction};
pub use profile::{
    ConversationProfile, DisconnectionPoint, EmotionTrend, EmotionalPattern, FutureEvent,
    HistoryEntry, InsightSnapshot, MemorySummary, PersonalContext, ProfileAggregator, TopicCount,
    TopicEntry,
};
pub use repository::{InMemoryRepository, MemoryRepository};
pub use sqlite::SqliteRepository;
pub use store::{DayCount, EmotionCount, MemoryStats, MemoryStore, TagCount};
