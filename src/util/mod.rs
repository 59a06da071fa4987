//! Small helpers shared by the UI and the API layer.
//!
//! - **Text**: width-aware truncation and wrapping, control-sequence
//!   stripping for API-provided strings, date and tag formatting
//! - **URL validation**: gatekeeping for URLs handed to the system browser

mod text;
mod url_validator;

pub use text::{
    display_width, format_published, format_tags, strip_control_chars, truncate_to_width,
    wrap_to_width,
};
pub use url_validator::{validate_url_for_open, UrlValidationError};

/// Longest accepted search query, in characters.
pub const MAX_SEARCH_QUERY_LENGTH: usize = 256;
