//! Front-end renderers for explorer pages.

pub mod json;
pub mod text;

pub use json::{error_body, JsonPage, JsonRenderer};
pub use text::TextRenderer;
