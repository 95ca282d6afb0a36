use ulid::Ulid;

/// Generates a new ULID-based ID with the given prefix.
///
/// # Examples
/// ```
/// let id = linkroom_common::id::prefixed_ulid("gw");
/// assert!(id.starts_with("gw_"));
/// ```
pub fn prefixed_ulid(prefix: &str) -> String {
    format!("{}_{}", prefix, Ulid::new())
}

/// Well-known ID prefixes.
pub mod prefix {
    /// Gateway connection.
    pub const CONNECTION: &str = "gw";
    /// Bearer session token.
    pub const SESSION: &str = "ses";
    /// Single-use WebSocket ticket.
    pub const WS_TICKET: &str = "wst";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixed_ulid_has_prefix_and_ulid_body() {
        let id = prefixed_ulid(prefix::CONNECTION);
        assert!(id.starts_with("gw_"));
        // ULID is 26 chars, plus prefix + underscore
        assert_eq!(id.len(), 3 + 26);
    }

    #[test]
    fn prefixed_ulids_are_unique() {
        let a = prefixed_ulid(prefix::SESSION);
        let b = prefixed_ulid(prefix::SESSION);
        assert_ne!(a, b);
    }
}
