pub mod brand_store;

pub use brand_store::{BoardSnapshot, BrandProfileStore};
