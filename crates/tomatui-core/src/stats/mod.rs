//! Historical statistics derived from recorded sessions.

pub mod streak;

pub use streak::Streak;
