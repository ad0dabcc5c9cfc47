#![forbid(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod generator;
pub mod model;
pub mod scoring;
pub mod stats;
pub mod time;
pub mod verify;

pub use config::GameConfig;
pub use generator::QuestionGenerator;
pub use time::Clock;
