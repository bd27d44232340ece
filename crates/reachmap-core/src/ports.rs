//! Port-rule model and intersection arithmetic.
//!
//! A rule's port constraint is a protocol (absent means any) crossed with a
//! span: all ports, one port, or a closed range. Keeping the span as a tagged
//! variant means "endPort absent" and "endPort 0" can never be confused, in
//! the model or in dedup keys.

use k8s_openapi::api::networking::v1::NetworkPolicyPort;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::collections::HashSet;

/// The recognized transport protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Tcp,
    Udp,
    Sctp,
}

impl Protocol {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "TCP" => Some(Self::Tcp),
            "UDP" => Some(Self::Udp),
            "SCTP" => Some(Self::Sctp),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tcp => "TCP",
            Self::Udp => "UDP",
            Self::Sctp => "SCTP",
        }
    }
}

/// The ports a rule covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortSpan {
    /// No port constraint.
    All,
    /// Exactly one port.
    Single(i32),
    /// The closed range `[lo, hi]`.
    Range { lo: i32, hi: i32 },
}

/// One permitted protocol/port tuple, parsed out of a rule's `ports` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AllowedPort {
    pub protocol: Option<Protocol>,
    pub span: PortSpan,
}

impl From<&NetworkPolicyPort> for AllowedPort {
    fn from(rule: &NetworkPolicyPort) -> Self {
        let protocol = rule.protocol.as_deref().and_then(Protocol::parse);

        // Numeric ports only; a named port that is not a number degrades to
        // "all ports" rather than failing the whole evaluation.
        let number = match &rule.port {
            Some(IntOrString::Int(n)) => Some(*n),
            Some(IntOrString::String(name)) => name.parse().ok(),
            None => None,
        };

        let span = match (number, rule.end_port) {
            (Some(lo), Some(hi)) => PortSpan::Range { lo, hi },
            (Some(port), None) => PortSpan::Single(port),
            (None, _) => PortSpan::All,
        };

        Self { protocol, span }
    }
}

/// Intersection of two single rules; `None` when they share no traffic.
pub fn intersect(a: AllowedPort, b: AllowedPort) -> Option<AllowedPort> {
    let protocol = match (a.protocol, b.protocol) {
        (None, None) => None,
        (None, Some(p)) | (Some(p), None) => Some(p),
        (Some(x), Some(y)) if x == y => Some(x),
        _ => return None,
    };

    let span = match (bounds(a.span), bounds(b.span)) {
        (None, None) => PortSpan::All,
        (None, Some(_)) => b.span,
        (Some(_), None) => a.span,
        (Some((a_lo, a_hi)), Some((b_lo, b_hi))) => {
            let lo = a_lo.max(b_lo);
            let hi = a_hi.min(b_hi);
            if lo > hi {
                return None;
            }
            if lo == hi {
                PortSpan::Single(lo)
            } else {
                PortSpan::Range { lo, hi }
            }
        }
    };

    Some(AllowedPort { protocol, span })
}

fn bounds(span: PortSpan) -> Option<(i32, i32)> {
    match span {
        PortSpan::All => None,
        PortSpan::Single(port) => Some((port, port)),
        PortSpan::Range { lo, hi } => Some((lo, hi)),
    }
}

/// Drop duplicate rules, keeping first-occurrence order.
///
/// Identity is the full `(protocol, span)` tuple; `Single(80)` and
/// `Range { 80, 80 }` are distinct rules here, exactly as written.
pub fn dedupe(rules: &[AllowedPort]) -> Vec<AllowedPort> {
    let mut seen = HashSet::with_capacity(rules.len());
    rules
        .iter()
        .copied()
        .filter(|rule| seen.insert(*rule))
        .collect()
}

/// Intersection of two permitted-port lists.
///
/// An empty list means "all ports", so two empty lists intersect to an empty
/// (fully open) list and one empty list yields the other side verbatim.
/// Otherwise the pairwise products that share traffic survive, deduplicated;
/// the pair is admitted only if at least one product survives.
pub fn intersect_all(ours: &[AllowedPort], theirs: &[AllowedPort]) -> (Vec<AllowedPort>, bool) {
    if ours.is_empty() && theirs.is_empty() {
        return (Vec::new(), true);
    }
    if ours.is_empty() {
        return (theirs.to_vec(), true);
    }
    if theirs.is_empty() {
        return (ours.to_vec(), true);
    }

    let mut product = Vec::with_capacity(ours.len().max(theirs.len()));
    for a in ours {
        for b in theirs {
            if let Some(shared) = intersect(*a, *b) {
                product.push(shared);
            }
        }
    }

    let product = dedupe(&product);
    let admitted = !product.is_empty();
    (product, admitted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tcp(span: PortSpan) -> AllowedPort {
        AllowedPort {
            protocol: Some(Protocol::Tcp),
            span,
        }
    }

    fn udp(span: PortSpan) -> AllowedPort {
        AllowedPort {
            protocol: Some(Protocol::Udp),
            span,
        }
    }

    fn any(span: PortSpan) -> AllowedPort {
        AllowedPort {
            protocol: None,
            span,
        }
    }

    #[test]
    fn parses_rule_ports() {
        let rule = NetworkPolicyPort {
            protocol: Some("TCP".to_string()),
            port: Some(IntOrString::Int(80)),
            end_port: Some(100),
        };
        assert_eq!(
            AllowedPort::from(&rule),
            tcp(PortSpan::Range { lo: 80, hi: 100 })
        );

        let bare = NetworkPolicyPort::default();
        assert_eq!(AllowedPort::from(&bare), any(PortSpan::All));

        let numeric_name = NetworkPolicyPort {
            port: Some(IntOrString::String("8080".to_string())),
            ..Default::default()
        };
        assert_eq!(AllowedPort::from(&numeric_name), any(PortSpan::Single(8080)));

        let named = NetworkPolicyPort {
            port: Some(IntOrString::String("http".to_string())),
            ..Default::default()
        };
        assert_eq!(AllowedPort::from(&named), any(PortSpan::All));
    }

    #[test]
    fn protocol_lattice() {
        let all = PortSpan::All;
        assert_eq!(intersect(any(all), any(all)), Some(any(all)));
        assert_eq!(intersect(any(all), tcp(all)), Some(tcp(all)));
        assert_eq!(intersect(tcp(all), any(all)), Some(tcp(all)));
        assert_eq!(intersect(tcp(all), tcp(all)), Some(tcp(all)));
        assert_eq!(intersect(tcp(all), udp(all)), None);
    }

    #[test]
    fn range_intersection_narrows_to_the_overlap() {
        let a = tcp(PortSpan::Range { lo: 80, hi: 100 });
        let b = tcp(PortSpan::Range { lo: 90, hi: 120 });
        assert_eq!(intersect(a, b), Some(tcp(PortSpan::Range { lo: 90, hi: 100 })));
    }

    #[test]
    fn touching_ranges_collapse_to_a_single_port() {
        let a = tcp(PortSpan::Range { lo: 80, hi: 90 });
        let b = tcp(PortSpan::Range { lo: 90, hi: 120 });
        assert_eq!(intersect(a, b), Some(tcp(PortSpan::Single(90))));
    }

    #[test]
    fn disjoint_ranges_share_nothing() {
        let a = tcp(PortSpan::Range { lo: 80, hi: 90 });
        let b = tcp(PortSpan::Range { lo: 91, hi: 120 });
        assert_eq!(intersect(a, b), None);
    }

    #[test]
    fn single_ports_intersect_on_equality() {
        let a = tcp(PortSpan::Single(443));
        assert_eq!(intersect(a, a), Some(tcp(PortSpan::Single(443))));
        assert_eq!(intersect(a, tcp(PortSpan::Single(80))), None);
    }

    #[test]
    fn all_ports_is_the_identity() {
        let r = tcp(PortSpan::Range { lo: 80, hi: 100 });
        assert_eq!(intersect(tcp(PortSpan::All), r), Some(r));
        assert_eq!(intersect(r, any(PortSpan::All)), Some(r));
    }

    #[test]
    fn single_port_inside_a_range() {
        let single = tcp(PortSpan::Single(85));
        let range = tcp(PortSpan::Range { lo: 80, hi: 100 });
        assert_eq!(intersect(single, range), Some(tcp(PortSpan::Single(85))));
        assert_eq!(intersect(range, single), Some(tcp(PortSpan::Single(85))));
    }

    #[test]
    fn dedupe_keeps_first_occurrence_order() {
        let rules = [
            tcp(PortSpan::Single(80)),
            udp(PortSpan::Single(80)),
            tcp(PortSpan::Single(80)),
            tcp(PortSpan::Range { lo: 80, hi: 80 }),
        ];
        let deduped = dedupe(&rules);
        // Single(80) and Range{80,80} are written differently, so both stay.
        assert_eq!(
            deduped,
            vec![
                tcp(PortSpan::Single(80)),
                udp(PortSpan::Single(80)),
                tcp(PortSpan::Range { lo: 80, hi: 80 }),
            ]
        );
    }

    #[test]
    fn empty_lists_mean_all_ports() {
        let (ports, admitted) = intersect_all(&[], &[]);
        assert!(admitted);
        assert!(ports.is_empty());

        let narrowed = [tcp(PortSpan::Single(80))];
        let (ports, admitted) = intersect_all(&[], &narrowed);
        assert!(admitted);
        assert_eq!(ports, narrowed.to_vec());

        let (ports, admitted) = intersect_all(&narrowed, &[]);
        assert!(admitted);
        assert_eq!(ports, narrowed.to_vec());
    }

    #[test]
    fn pairwise_intersection_drops_empty_products() {
        let ours = [tcp(PortSpan::Single(80)), udp(PortSpan::Single(53))];
        let theirs = [tcp(PortSpan::Single(80)), tcp(PortSpan::Single(443))];
        let (ports, admitted) = intersect_all(&ours, &theirs);
        assert!(admitted);
        assert_eq!(ports, vec![tcp(PortSpan::Single(80))]);

        let (ports, admitted) = intersect_all(
            &[tcp(PortSpan::Single(80))],
            &[udp(PortSpan::Single(80))],
        );
        assert!(!admitted);
        assert!(ports.is_empty());
    }

    #[test]
    fn product_duplicates_are_collapsed() {
        // Two distinct pairs both narrow to TCP 80.
        let ours = [
            tcp(PortSpan::Single(80)),
            tcp(PortSpan::Range { lo: 70, hi: 90 }),
        ];
        let theirs = [tcp(PortSpan::Single(80))];
        let (ports, admitted) = intersect_all(&ours, &theirs);
        assert!(admitted);
        assert_eq!(ports, vec![tcp(PortSpan::Single(80))]);
    }

    #[test]
    fn intersection_is_idempotent_after_dedup() {
        let rules = [
            tcp(PortSpan::Single(80)),
            tcp(PortSpan::Single(80)),
            udp(PortSpan::Range { lo: 1000, hi: 2000 }),
        ];
        let deduped = dedupe(&rules);
        let (ports, admitted) = intersect_all(&deduped, &deduped);
        assert!(admitted);
        assert_eq!(ports, deduped);
    }
}
