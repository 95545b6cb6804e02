mod client;
mod endpoints;
mod errors;

pub use client::{SupabaseConnector, SupabaseGateway, build_client};
pub use endpoints::SupabaseEndpoints;
