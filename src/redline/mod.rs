//! Redlined document output.
//!
//! - `markup`: parses `[DELETE]`/`[ADD]` tagged lines into segments
//! - `diff`: produces that markup from an original and corrected text
//! - `render`: writes the segments out as a styled DOCX document

pub mod diff;
pub mod markup;
pub mod render;

pub use diff::diff_to_markup;
pub use markup::{Segment, SegmentKind};
pub use render::render;
