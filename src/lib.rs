pub mod app;
pub mod auth;
pub mod avatar;
pub mod config;
pub mod error;
pub mod posts;
pub mod profiles;
pub mod state;
pub mod store;
