//! Magnet URI validation and metadata extraction.

use super::{InfoHash, TorrentError};

const MAGNET_PREFIX: &str = "magnet:?";
const BTIH_MARKER: &str = "xt=urn:btih:";

/// Validates a magnet URI before any engine work begins.
///
/// Rules are checked in order and the first failure wins:
/// 1. the URI must start with `magnet:?`;
/// 2. it must carry an exact-topic hash parameter (`xt=urn:btih:`);
/// 3. the `magnet:?` prefix must occur exactly once - a second occurrence
///    signals a concatenated or otherwise mangled URI.
///
/// Pure and deterministic; no engine interaction.
///
/// # Errors
/// - `TorrentError::InvalidMagnet` - URI violates one of the rules above
pub fn validate_magnet(uri: &str) -> Result<(), TorrentError> {
    if !uri.starts_with(MAGNET_PREFIX) {
        return Err(TorrentError::InvalidMagnet {
            reason: "missing magnet prefix".to_string(),
        });
    }

    if !uri.contains(BTIH_MARKER) {
        return Err(TorrentError::InvalidMagnet {
            reason: "missing hash identifier".to_string(),
        });
    }

    if uri.matches(MAGNET_PREFIX).count() > 1 {
        return Err(TorrentError::InvalidMagnet {
            reason: "duplicate magnet prefix".to_string(),
        });
    }

    Ok(())
}

/// Extracts the v1 info hash from a magnet URI's `xt=urn:btih:` parameter.
///
/// Only 40-digit hex hashes are accepted; base32-encoded hashes are not
/// produced by the clients this service fronts.
///
/// # Errors
/// - `TorrentError::InvalidMagnet` - No parseable `btih` parameter
pub fn extract_info_hash(uri: &str) -> Result<InfoHash, TorrentError> {
    for param in uri.split(['?', '&']) {
        if let Some(hash) = param.strip_prefix("xt=urn:btih:") {
            return InfoHash::from_hex(hash).map_err(|_| TorrentError::InvalidMagnet {
                reason: format!("invalid info hash in magnet link: {hash}"),
            });
        }
    }

    Err(TorrentError::InvalidMagnet {
        reason: "missing hash identifier".to_string(),
    })
}

/// Extracts the display name (`dn`) from a magnet URI, if present.
///
/// Falls back to `None` when the URI does not parse or carries no name;
/// callers synthesize a name from the info hash in that case.
pub fn extract_display_name(uri: &str) -> Option<String> {
    let magnet = magnet_url::Magnet::new(uri).ok()?;
    magnet.display_name().map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn reason(result: Result<(), TorrentError>) -> String {
        match result {
            Err(TorrentError::InvalidMagnet { reason }) => reason,
            other => panic!("expected InvalidMagnet, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_magnet_accepted() {
        let uri = "magnet:?xt=urn:btih:0123456789abcdef0123456789abcdef01234567&dn=test";
        assert!(validate_magnet(uri).is_ok());
    }

    #[test]
    fn test_missing_prefix_rejected() {
        assert_eq!(
            reason(validate_magnet("http://example.com/file.torrent")),
            "missing magnet prefix"
        );
    }

    #[test]
    fn test_missing_hash_identifier_rejected() {
        assert_eq!(
            reason(validate_magnet("magnet:?dn=no-hash-here")),
            "missing hash identifier"
        );
    }

    #[test]
    fn test_duplicate_prefix_rejected() {
        let uri = "magnet:?xt=urn:btih:0123456789abcdef0123456789abcdef01234567magnet:?xt=urn:btih:aaaa";
        assert_eq!(reason(validate_magnet(uri)), "duplicate magnet prefix");
    }

    #[test]
    fn test_rules_checked_in_order() {
        // Missing hash is reported before the duplicate prefix.
        assert_eq!(
            reason(validate_magnet("magnet:?magnet:?dn=x")),
            "missing hash identifier"
        );
    }

    #[test]
    fn test_extract_info_hash() {
        let uri = "magnet:?xt=urn:btih:0123456789abcdef0123456789abcdef01234567&tr=udp://t";
        let hash = extract_info_hash(uri).unwrap();
        assert_eq!(
            hash.to_string(),
            "0123456789abcdef0123456789abcdef01234567"
        );
    }

    #[test]
    fn test_extract_info_hash_rejects_short_hash() {
        assert!(extract_info_hash("magnet:?xt=urn:btih:abcd").is_err());
    }

    #[test]
    fn test_extract_display_name() {
        let uri = "magnet:?xt=urn:btih:0123456789abcdef0123456789abcdef01234567&dn=Some+Name";
        assert!(extract_display_name(uri).is_some());
    }

    proptest! {
        #[test]
        fn prop_non_magnet_strings_rejected(s in "\\PC*") {
            prop_assume!(!s.starts_with("magnet:?"));
            prop_assert_eq!(reason(validate_magnet(&s)), "missing magnet prefix");
        }

        #[test]
        fn prop_duplicated_uris_rejected(tail in "[a-z0-9&=:]*") {
            let uri = format!("magnet:?xt=urn:btih:{}magnet:?{}", "ab".repeat(20), tail);
            prop_assert_eq!(reason(validate_magnet(&uri)), "duplicate magnet prefix");
        }

        #[test]
        fn prop_valid_magnets_accepted(hash in "[0-9a-f]{40}", name in "[A-Za-z0-9.+-]{0,32}") {
            let uri = format!("magnet:?xt=urn:btih:{hash}&dn={name}");
            prop_assert!(validate_magnet(&uri).is_ok());
            prop_assert_eq!(extract_info_hash(&uri).unwrap().to_string(), hash);
        }
    }
}
