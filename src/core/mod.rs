pub mod config;
pub mod episodes;
pub mod error;
pub mod model;
pub mod ranker;
