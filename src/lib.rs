pub mod api;
pub mod config;
pub mod data;
pub mod models;
pub mod pricing;
