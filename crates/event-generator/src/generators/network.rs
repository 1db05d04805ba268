//! Network address generators.

use rand::Rng;
use std::net::Ipv4Addr;

/// Generate a random dotted-quad IPv4 address.
///
/// Every octet is drawn uniformly from 0..=255, so reserved and
/// broadcast addresses can come out too.
pub fn generate_ipv4<R: Rng>(rng: &mut R) -> String {
    let octets: [u8; 4] = rng.random();
    Ipv4Addr::from(octets).to_string()
}
