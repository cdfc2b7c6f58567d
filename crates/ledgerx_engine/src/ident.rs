//! Entry id generation and remote-eligibility checks.

use rand::{RngCore, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};

/// Generates a collision-resistant entry id.
///
/// Two-tier strategy: random bytes come from the operating system's
/// cryptographically strong source; if that source is unavailable the
/// generator falls back to a pseudo-random generator seeded from the clock.
/// The fallback has measurably weaker uniqueness guarantees and is logged as
/// a warning rather than degrading silently.
#[must_use]
pub fn new_entry_id() -> String {
    let mut bytes = [0u8; 16];
    if let Err(e) = getrandom::getrandom(&mut bytes) {
        tracing::warn!(
            error = %e,
            "OS entropy source unavailable, falling back to clock-seeded PRNG for entry id"
        );
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        rand::rngs::StdRng::seed_from_u64(seed).fill_bytes(&mut bytes);
    }
    uuid::Builder::from_random_bytes(bytes)
        .into_uuid()
        .to_string()
}

/// Returns true if `value` is account-identifier-shaped.
///
/// Account identifiers are canonical hyphenated UUIDs (8-4-4-4-12 hex
/// groups) with an RFC 4122 version nibble (1-5) and variant nibble
/// (8, 9, a, b). Anything else — guest tags, device ids, empty strings —
/// is ineligible for remote sync and stays local-only indefinitely.
#[must_use]
pub fn is_account_id(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 36 {
        return false;
    }
    for (i, &b) in bytes.iter().enumerate() {
        match i {
            8 | 13 | 18 | 23 => {
                if b != b'-' {
                    return false;
                }
            }
            _ => {
                if !b.is_ascii_hexdigit() {
                    return false;
                }
            }
        }
    }
    // Version nibble: first hex digit of the third group.
    if !matches!(bytes[14], b'1'..=b'5') {
        return false;
    }
    // Variant nibble: first hex digit of the fourth group.
    matches!(bytes[19], b'8' | b'9' | b'a' | b'b' | b'A' | b'B')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use uuid::Uuid;

    #[test]
    fn generated_ids_are_account_shaped() {
        for _ in 0..100 {
            let id = new_entry_id();
            assert!(is_account_id(&id), "generated id not canonical: {id}");
        }
    }

    #[test]
    fn generated_ids_are_unique() {
        let ids: HashSet<String> = (0..1000).map(|_| new_entry_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn generated_ids_parse_as_v4() {
        let id = new_entry_id();
        let parsed = Uuid::parse_str(&id).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[test]
    fn canonical_uuids_are_accepted() {
        assert!(is_account_id("11111111-1111-4111-8111-111111111111"));
        assert!(is_account_id("A987FBC9-4BED-3078-9F07-9141BA07C9F3"));
        assert!(is_account_id("987fbc97-4bed-5078-af07-9141ba07c9f3"));
    }

    #[test]
    fn guest_tags_are_rejected() {
        assert!(!is_account_id(""));
        assert!(!is_account_id("not-a-uuid"));
        assert!(!is_account_id("guest-1692301234567"));
        assert!(!is_account_id("device-abc123"));
    }

    #[test]
    fn malformed_uuids_are_rejected() {
        // Missing hyphens
        assert!(!is_account_id("11111111111141118111111111111111"));
        // Hyphen in the wrong place
        assert!(!is_account_id("1111111-11111-4111-8111-11111111111"));
        // Bad version nibble
        assert!(!is_account_id("11111111-1111-0111-8111-111111111111"));
        assert!(!is_account_id("11111111-1111-7111-8111-111111111111"));
        // Bad variant nibble
        assert!(!is_account_id("11111111-1111-4111-0111-111111111111"));
        assert!(!is_account_id("11111111-1111-4111-c111-111111111111"));
        // Non-hex characters
        assert!(!is_account_id("11111111-1111-4111-8111-11111111111g"));
        // Too long
        assert!(!is_account_id("11111111-1111-4111-8111-1111111111112"));
    }
}
