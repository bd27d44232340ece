//! Error types for the reachability evaluator

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid ip block: bad CIDR {cidr:?}: {source}")]
    MalformedCidr {
        cidr: String,
        #[source]
        source: ipnetwork::IpNetworkError,
    },

    #[error("there is no pod named {0:?}")]
    PodNotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
