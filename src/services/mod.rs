pub mod board_export;
pub mod image_service;
pub mod llm_service;

pub use board_export::BoardExporter;
pub use image_service::ImageService;
pub use llm_service::LlmService;
