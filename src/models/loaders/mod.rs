pub mod toml_loader;

pub use toml_loader::{load_brand_brief, parse_brand_brief};
