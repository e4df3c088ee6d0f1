//! PDF rendering for summaries
//!
//! One source line becomes one PDF line; long lines are cut, never wrapped.

mod layout;
mod pdf;

pub use layout::{layout, Page, PlacedLine, LINES_PER_PAGE, MAX_LINE_CHARS};
pub use pdf::{render, RenderError};
