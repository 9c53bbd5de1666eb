//! User ID anonymization for the public leaderboard (§4.6 P11: "the
//! leaderboard must never expose a raw user ID"). A stable, one-way
//! pseudonym derived from the user ID, so the same user always ranks under
//! the same label without that label being reversible to the ID.

use sha2::{Digest, Sha256};

pub fn anonymize(user_id: &str) -> String {
    let digest = Sha256::digest(user_id.as_bytes());
    format!("trader-{}", hex_prefix(&digest, 6))
}

fn hex_prefix(bytes: &[u8], len: usize) -> String {
    bytes
        .iter()
        .take(len)
        .map(|b| format!("{b:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymization_is_stable_and_does_not_echo_the_input() {
        let a = anonymize("user-42");
        let b = anonymize("user-42");
        assert_eq!(a, b);
        assert!(!a.contains("user-42"));
    }

    #[test]
    fn different_users_get_different_pseudonyms() {
        assert_ne!(anonymize("user-1"), anonymize("user-2"));
    }
}
