/// Track identifiers, metadata and download outcomes
pub mod entities;
/// Error types and result aliases
pub mod errors;
/// Track url normalization
pub mod identifier;
/// Mixcloud HTTP client
pub mod mixcloud;
/// Markup scraping for preview urls and tag listings
pub mod scrape;

pub use mixcloud::{Endpoints, MixcloudClient};
