pub mod cache;
pub mod github;
pub mod resolve;
pub mod sources;
pub mod util;
