//! Content module - front-matter, markdown rendering and the post repository

mod error;
mod frontmatter;
mod markdown;
mod post;
pub mod repository;

pub use error::ContentError;
pub use frontmatter::{FrontMatter, FrontMatterError};
pub use markdown::MarkdownRenderer;
pub use post::{Post, PostMetadata};
pub use repository::{PostRepository, ScanEntry, ScanOutcome, SkipReason};
