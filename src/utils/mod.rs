/// Utility functions and helpers
use crate::core::Connection;

/// Format a latency for human-readable output
pub fn format_latency(latency_ms: u64) -> String {
    if latency_ms < 1000 {
        format!("{}ms", latency_ms)
    } else {
        format!("{:.2}s", latency_ms as f64 / 1000.0)
    }
}

/// One line per connection: id, role, latency and tags
pub fn format_connection(con: &Connection) -> String {
    let mut line = format!(
        "{} ({}, {})",
        con.id,
        con.role.display_name().to_lowercase(),
        format_latency(con.latency_ms)
    );
    if !con.tags.is_empty() {
        line.push_str(" [");
        line.push_str(&con.tags.join(", "));
        line.push(']');
    }
    line
}

/// Numbered listing of candidates, in the order given
pub fn format_candidates(candidates: &[&Connection]) -> String {
    candidates
        .iter()
        .enumerate()
        .map(|(i, con)| format!("{}: {}", i + 1, format_connection(con)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NodeRole;

    #[test]
    fn test_format_latency() {
        assert_eq!(format_latency(0), "0ms");
        assert_eq!(format_latency(15), "15ms");
        assert_eq!(format_latency(1500), "1.50s");
    }

    #[test]
    fn test_format_connection() {
        let con = Connection::new("db1:27017", NodeRole::Secondary, 5)
            .with_tag("dc", "east")
            .with_tag("rack", "2");
        assert_eq!(format_connection(&con), "db1:27017 (secondary, 5ms) [dc:east, rack:2]");

        let con = Connection::new("router:27017", NodeRole::RouterProxy, 2);
        assert_eq!(format_connection(&con), "router:27017 (mongos, 2ms)");
    }

    #[test]
    fn test_format_candidates() {
        let a = Connection::new("a", NodeRole::Primary, 1);
        let b = Connection::new("b", NodeRole::Secondary, 2);
        assert_eq!(
            format_candidates(&[&a, &b]),
            "1: a (primary, 1ms)\n2: b (secondary, 2ms)"
        );
        assert_eq!(format_candidates(&[]), "");
    }
}
