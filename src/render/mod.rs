//! Output rendering for extracted outlines.

mod json;

pub use json::{spans_to_json, to_json, write_json, JsonFormat};
