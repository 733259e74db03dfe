//! Internal helpers for credentials and reporting windows.
//!
//! These utilities are **not** part of the public API, except for
//! [`shift_window`] which the gateway exposes for reporting.

use base64::Engine as _;
use chrono::{DateTime, Duration, FixedOffset, TimeZone, Timelike, Utc};
use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ResultEngine};

/// Local hour the staff shift rolls over.
pub const SHIFT_ANCHOR_HOUR: u32 = 9;

/// Digest a password for storage. SHA-256, base64-encoded.
pub(crate) fn password_digest(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    base64::engine::general_purpose::STANDARD.encode(digest)
}

/// Constant-shape comparison of a password against a stored digest.
pub(crate) fn password_matches(password: &str, stored_digest: &str) -> bool {
    password_digest(password) == stored_digest
}

/// Normalize a login handle: NFKC, trimmed.
pub(crate) fn normalize_login(value: &str) -> ResultEngine<String> {
    let normalized: String = value.trim().nfkc().collect();
    if normalized.is_empty() {
        return Err(EngineError::InvalidAmount(
            "login must not be empty".to_string(),
        ));
    }
    Ok(normalized)
}

pub(crate) fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidAmount(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The rolling 24-hour reporting bucket containing `now`, anchored at
/// [`SHIFT_ANCHOR_HOUR`] in the given local offset.
///
/// Returns `[start, end)` in UTC. Before 09:00 local the bucket started at
/// 09:00 the previous day. Reporting only; no state transition depends on
/// this.
pub fn shift_window(
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> ResultEngine<(DateTime<Utc>, DateTime<Utc>)> {
    let local = now.with_timezone(&offset);
    let mut anchor_date = local.date_naive();
    if local.hour() < SHIFT_ANCHOR_HOUR {
        anchor_date = anchor_date
            .pred_opt()
            .ok_or_else(|| EngineError::InvalidAmount("date out of range".to_string()))?;
    }
    let anchor_naive = anchor_date
        .and_hms_opt(SHIFT_ANCHOR_HOUR, 0, 0)
        .ok_or_else(|| EngineError::InvalidAmount("invalid shift anchor".to_string()))?;
    let start = offset
        .from_local_datetime(&anchor_naive)
        .single()
        .ok_or_else(|| EngineError::InvalidAmount("ambiguous shift anchor".to_string()))?
        .with_timezone(&Utc);

    Ok((start, start + Duration::hours(24)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc_plus_3() -> FixedOffset {
        FixedOffset::east_opt(3 * 3600).unwrap()
    }

    #[test]
    fn window_after_anchor_starts_same_day() {
        // 12:00 local on 2026-03-10 (+03:00).
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();
        let (start, end) = shift_window(now, utc_plus_3()).unwrap();

        // 09:00 local is 06:00 UTC.
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 10, 6, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 3, 11, 6, 0, 0).unwrap());
    }

    #[test]
    fn window_before_anchor_starts_previous_day() {
        // 08:30 local on 2026-03-10 (+03:00) is 05:30 UTC.
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 5, 30, 0).unwrap();
        let (start, end) = shift_window(now, utc_plus_3()).unwrap();

        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 9, 6, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 3, 10, 6, 0, 0).unwrap());
    }

    #[test]
    fn window_contains_now() {
        let now = Utc.with_ymd_and_hms(2026, 7, 1, 23, 59, 0).unwrap();
        let (start, end) = shift_window(now, utc_plus_3()).unwrap();
        assert!(start <= now && now < end);
    }

    #[test]
    fn digest_is_stable_and_distinct() {
        assert_eq!(password_digest("hunter2"), password_digest("hunter2"));
        assert_ne!(password_digest("hunter2"), password_digest("hunter3"));
        assert!(password_matches("hunter2", &password_digest("hunter2")));
        assert!(!password_matches("hunter2", &password_digest("hunter3")));
    }

    #[test]
    fn login_normalization() {
        assert_eq!(normalize_login("  mario ").unwrap(), "mario");
        assert!(normalize_login("   ").is_err());
        // NFKC folds fullwidth forms.
        assert_eq!(normalize_login("ｍａｒｉｏ").unwrap(), "mario");
    }
}
