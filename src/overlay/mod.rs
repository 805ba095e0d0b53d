//! Manual edits layered over generated pages.

pub mod richtext;
pub mod snapshot;

pub use richtext::{Alignment, FormatCommand, InlineStyle, RichText, Selection};
pub use snapshot::EditedContentSnapshot;
