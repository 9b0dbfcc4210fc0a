pub mod api;
pub mod models;
pub mod rest;

pub use api::{ApiError, BasicCredentials, GithubApi};
pub use models::*;
pub use rest::GithubClient;
