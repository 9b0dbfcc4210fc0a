pub mod store;

pub use store::SourceCache;
