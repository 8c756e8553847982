pub mod blacklist;
pub mod config;
pub mod yaml;
