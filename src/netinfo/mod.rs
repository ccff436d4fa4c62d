//! Network information helpers for connection links

mod public_ip;

pub use public_ip::{PublicIpResolver, SERVER_IP_PLACEHOLDER, UNKNOWN_SERVER_IP};
