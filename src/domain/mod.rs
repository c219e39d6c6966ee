// Domain types and value objects
pub mod candle;
pub mod pattern;

// Re-export commonly used types
pub use candle::{Candle, CandleType};
pub use pattern::{PatternCategory, PatternKind, PatternOccurrence, PatternStrength, PatternTraits};
