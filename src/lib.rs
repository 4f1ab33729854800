pub mod api;
pub mod backend;
pub mod board;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod generation;
pub mod kanban;
pub mod logging;
pub mod models;
pub mod notify;
pub mod parser;
pub mod projects;
pub mod summary;

pub use error::{BackendError, Error};
