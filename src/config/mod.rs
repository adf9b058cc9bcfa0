pub mod models;

pub use models::{get_model_config, ModelConfig};
