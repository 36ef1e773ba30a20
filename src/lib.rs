pub mod aggregate;
pub mod brownian;
pub mod charts;
pub mod config;
pub mod error;
pub mod export;
pub mod fixtures;
pub mod match_model;
pub mod season;
mod table;
pub mod team_profile;
pub mod terminal;

pub use error::DataError;
