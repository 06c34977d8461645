pub mod brand;
pub mod catalog;
pub mod loaders;
pub mod section;

pub use brand::{BrandAnalysis, BrandInput, BrandProfile};
pub use catalog::{BRAND_DNA_ID, SECTION_CATALOG};
pub use loaders::load_brand_brief;
pub use section::{SectionDescriptor, SectionResult, SectionResultMap};
