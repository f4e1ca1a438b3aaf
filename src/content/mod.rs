//! Content module - post models, rich text and derived values

mod post;
pub mod reading_time;
pub mod rich_text;

pub use post::{Cursor, PageResult, PostDetail, PostSummary, Section};
pub use reading_time::ReadingTime;
pub use rich_text::{PrismicRichText, RichText, RichTextBlock, RichTextRenderer};
