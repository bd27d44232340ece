//! NetworkPolicy reachability evaluation.
//!
//! Pure functions over an immutable [`ClusterSnapshot`]: given a target pod,
//! decide for every other pod whether traffic is admitted in each direction
//! and on which protocol/port tuples, by interpreting NetworkPolicy selection
//! rules the way the policy engine does.

pub mod error;
pub mod ipblock;
pub mod policy;
pub mod ports;
pub mod reachability;
pub mod selector;
pub mod snapshot;

pub use error::{Error, Result};
pub use policy::{admitted_ports, applicable_policies, classify, direction_ports, peer_admits, Direction};
pub use ports::{dedupe, intersect, intersect_all, AllowedPort, PortSpan, Protocol};
pub use reachability::{evaluate, Admission, PeerVerdict, Reachability};
pub use snapshot::ClusterSnapshot;
