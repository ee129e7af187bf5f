//! Wire payload parsing
//!
//! Payloads are bare ASCII strings, not JSON: invalidation signals are a
//! single digit naming the snapshot, impression broadcasts are the decimal
//! ad id. Anything else is ignored by the listeners.

use crate::ads::CacheKind;

/// Decode a cache-invalidation payload into the snapshot it names.
pub fn parse_invalidation(payload: &[u8]) -> Option<CacheKind> {
    match payload {
        b"1" => Some(CacheKind::Keyword),
        b"2" => Some(CacheKind::Ad),
        b"3" => Some(CacheKind::Association),
        _ => None,
    }
}

/// Decode an impression payload into the ad id it carries.
pub fn parse_impression(payload: &[u8]) -> Option<u64> {
    std::str::from_utf8(payload).ok()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalidation_codes_map_to_snapshots() {
        assert_eq!(parse_invalidation(b"1"), Some(CacheKind::Keyword));
        assert_eq!(parse_invalidation(b"2"), Some(CacheKind::Ad));
        assert_eq!(parse_invalidation(b"3"), Some(CacheKind::Association));
    }

    #[test]
    fn unknown_invalidation_payloads_are_ignored() {
        assert_eq!(parse_invalidation(b"0"), None);
        assert_eq!(parse_invalidation(b"4"), None);
        assert_eq!(parse_invalidation(b""), None);
        assert_eq!(parse_invalidation(b"keyword"), None);
    }

    #[test]
    fn impression_payload_is_a_decimal_ad_id() {
        assert_eq!(parse_impression(b"42"), Some(42));
        assert_eq!(parse_impression(b" 7\n"), Some(7));
        assert_eq!(parse_impression(b""), None);
        assert_eq!(parse_impression(b"-1"), None);
        assert_eq!(parse_impression(b"abc"), None);
    }
}
