use std::net::{Ipv4Addr, Ipv6Addr};

use url::{Host, Url};

use super::validate::ValidationError;
use super::NodeGraph;

/// Ceiling on external data sources per graph; each one becomes a
/// polling target in the engine's fetch loop.
const MAX_API_FETCH_NODES: usize = 5;
/// Floor on the polling interval the engine will honor.
const MIN_INTERVAL_SECS: f64 = 30.0;

// ---------------------------------------------------------------------------
// api_fetch node validation — accumulates every violation
// ---------------------------------------------------------------------------

/// Validate the `api_fetch` nodes of a node-mode graph.
///
/// Unlike the form validator this collects all violations before
/// returning, so the editor can flag every offending node in one pass.
/// An over-the-ceiling node count is reported as a single group-level
/// error rather than one error per node.
pub fn validate_api_fetch_nodes(graph: &NodeGraph) -> Result<(), Vec<ValidationError>> {
    let fetch_nodes: Vec<_> = graph
        .nodes
        .iter()
        .filter(|n| n.node_type == "api_fetch")
        .collect();

    if fetch_nodes.len() > MAX_API_FETCH_NODES {
        return Err(vec![ValidationError::new(
            "nodes",
            format!(
                "at most {MAX_API_FETCH_NODES} api_fetch nodes are allowed, found {}",
                fetch_nodes.len()
            ),
        )]);
    }

    let mut errors = Vec::new();
    for node in fetch_nodes {
        let url = node.data.get("url").and_then(|v| v.as_str()).unwrap_or("");
        if url.is_empty() {
            errors.push(ValidationError::new(
                format!("nodes.{}.data.url", node.id),
                "api_fetch node requires a url",
            ));
            continue;
        }

        if !url.starts_with("https://") {
            errors.push(ValidationError::new(
                format!("nodes.{}.data.url", node.id),
                "url must use https://",
            ));
        }

        if is_private_url(url) {
            errors.push(ValidationError::new(
                format!("nodes.{}.data.url", node.id),
                "url must not target a private or internal host",
            ));
        }

        let interval = node
            .data
            .get("interval_secs")
            .and_then(|v| v.as_f64())
            .unwrap_or(60.0);
        if interval < MIN_INTERVAL_SECS {
            errors.push(ValidationError::new(
                format!("nodes.{}.data.interval_secs", node.id),
                format!("polling interval must be at least {MIN_INTERVAL_SECS} seconds"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// ---------------------------------------------------------------------------
// Private host detection
// ---------------------------------------------------------------------------

/// Host-based SSRF blocklist.
///
/// Rejects literal private/reserved IPs, loopback names, and `.local` /
/// `.internal` suffixes. This is deliberately a blocklist: a public
/// hostname that resolves to a private address at fetch time (DNS
/// rebinding) is not caught here.
pub fn is_private_url(raw: &str) -> bool {
    let Ok(url) = Url::parse(raw) else {
        // unparsable → treat as private
        return true;
    };
    let Some(host) = url.host() else {
        return true;
    };

    match host {
        Host::Domain(name) => {
            let name = name.to_ascii_lowercase();
            name == "localhost" || name.ends_with(".local") || name.ends_with(".internal")
        }
        Host::Ipv4(ip) => is_private_v4(ip),
        Host::Ipv6(ip) => is_private_v6(ip),
    }
}

fn is_private_v4(ip: Ipv4Addr) -> bool {
    let octets = ip.octets();
    ip.is_unspecified()                                  // 0.0.0.0
        || ip.is_loopback()                              // 127.0.0.0/8
        || ip.is_private()                               // RFC1918
        || ip.is_link_local()                            // 169.254.0.0/16
        || (octets[0] == 100 && octets[1] & 0xc0 == 64)  // CGNAT 100.64.0.0/10
        || octets[0] >= 240                              // 240.0.0.0/4 incl. broadcast
}

fn is_private_v6(ip: Ipv6Addr) -> bool {
    if let Some(mapped) = ip.to_ipv4_mapped() {
        return is_private_v4(mapped);
    }
    let seg = ip.segments();
    ip.is_loopback()
        || ip.is_unspecified()
        || seg[0] & 0xfe00 == 0xfc00 // unique-local fc00::/7
        || seg[0] & 0xffc0 == 0xfe80 // link-local fe80::/10
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
