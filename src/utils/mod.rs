pub mod image_encoding;
pub mod logging;

pub use logging::truncate_text;
