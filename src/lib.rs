pub mod cloze;
pub mod example;
pub mod generate;
pub mod ingest;
pub mod models;
pub mod prompt;
pub mod render;
pub mod reveal;
pub mod store;
