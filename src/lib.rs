pub mod config;
pub mod export;
pub mod flatten;
pub mod impute;
pub mod loader;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod sequence;
