pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod models;
pub mod orderspace;
pub mod routes;
pub mod services;

pub use error::{Error, Result};
