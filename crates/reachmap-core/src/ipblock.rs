//! IPBlock membership tests.

use ipnetwork::IpNetwork;
use k8s_openapi::api::networking::v1::IPBlock;
use std::net::IpAddr;

use crate::error::{Error, Result};

/// Whether an address falls inside an `ipBlock`, honoring its except list.
///
/// No block means no constraint. An address inside the CIDR but also inside
/// any `except` entry is excluded. A pod IP that does not parse as an address
/// (pods briefly have none) is outside every block.
pub fn contains(block: Option<&IPBlock>, ip: &str) -> Result<bool> {
    let Some(block) = block else {
        return Ok(true);
    };

    let network = parse_cidr(&block.cidr)?;
    let Ok(address) = ip.parse::<IpAddr>() else {
        return Ok(false);
    };

    if !network.contains(address) {
        return Ok(false);
    }

    if let Some(except) = &block.except {
        for cidr in except {
            if parse_cidr(cidr)?.contains(address) {
                return Ok(false);
            }
        }
    }

    Ok(true)
}

fn parse_cidr(cidr: &str) -> Result<IpNetwork> {
    cidr.parse().map_err(|source| Error::MalformedCidr {
        cidr: cidr.to_string(),
        source,
    })
}
