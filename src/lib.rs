pub mod assistant;
pub mod config;
pub mod content;
pub mod entity;
pub mod error;
pub mod notes;
pub mod pregnancy;
pub mod store;
pub mod tts;
pub mod utils;
pub mod video;

pub use error::{MaternaError, Result};
