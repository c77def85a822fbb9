pub mod config;
pub mod dates;
pub mod dtos;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
