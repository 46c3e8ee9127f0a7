//! Rendering of transcript and file details for the HTML and terminal surfaces.

mod format;
pub mod html;
pub mod terminal;

pub use format::format_bytes;
