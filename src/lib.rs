pub mod api;
pub mod models;
pub mod reports;
pub mod store;
