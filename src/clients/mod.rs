pub mod generation_client;

pub use generation_client::{GeminiGenerationClient, GenerationClient};
