//! Room name normalization shared by the API and the gateway.

/// Canonical form of a room name: surrounding whitespace removed, lower-cased.
///
/// Every lookup and insert goes through this so `Team-X` and `team-x` name
/// the same room.
pub fn normalize_room_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_trims() {
        assert_eq!(normalize_room_name("  Team-X "), "team-x");
    }

    #[test]
    fn whitespace_only_becomes_empty() {
        assert_eq!(normalize_room_name("   "), "");
    }

    #[test]
    fn already_normal_is_unchanged() {
        assert_eq!(normalize_room_name("lobby"), "lobby");
    }
}
