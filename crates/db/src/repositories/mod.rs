//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod chapter_repo;
pub mod coin_repo;
pub mod paragraph_repo;
pub mod story_repo;

pub use chapter_repo::ChapterRepo;
pub use coin_repo::CoinRepo;
pub use paragraph_repo::ParagraphRepo;
pub use story_repo::StoryRepo;
