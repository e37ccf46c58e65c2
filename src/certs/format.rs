//! Human readable formatting of dates, serials and expiration state.

use chrono::{DateTime, Utc};

use super::model::Certificate;
use super::query::{is_expired, life_remaining_percentage_truncated, Thresholds};

/// Date format used in reports.
pub const CERT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

/// Formats a timestamp with [`CERT_DATE_FORMAT`].
pub fn format_date(t: DateTime<Utc>) -> String {
    t.format(CERT_DATE_FORMAT).to_string()
}

/// Time until (or since) `t`: "Nd Mh remaining", "Mh remaining" or "Nd Mh ago".
pub fn formatted_expiration(t: DateTime<Utc>) -> String {
    let delta = t - Utc::now();
    let past = delta.num_seconds() < 0;
    let hours = delta.num_hours().abs();
    let (days, hours) = (hours / 24, hours % 24);

    if past {
        format!("{days}d {hours}h ago")
    } else if days == 0 {
        format!("{hours}h remaining")
    } else {
        format!("{days}d {hours}h remaining")
    }
}

/// Formats a certificate serial from its DER integer bytes.
///
/// Every byte is printed as two uppercase hex digits joined by colons, so a leading
/// zero byte survives. Negative serials print as `-` followed by the magnitude.
pub fn format_cert_serial(serial: &[u8]) -> String {
    let negative = serial.first().is_some_and(|b| b & 0x80 != 0);
    let bytes = if negative {
        twos_complement_magnitude(serial)
    } else {
        serial.to_vec()
    };

    let hex = bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(":");

    if negative {
        format!("-{hex}")
    } else {
        hex
    }
}

fn twos_complement_magnitude(bytes: &[u8]) -> Vec<u8> {
    let mut out: Vec<u8> = bytes.iter().map(|b| !b).collect();
    for byte in out.iter_mut().rev() {
        let (sum, carry) = byte.overflowing_add(1);
        *byte = sum;
        if !carry {
            break;
        }
    }
    let first_nonzero = out.iter().position(|b| *b != 0).unwrap_or(out.len().saturating_sub(1));
    out.split_off(first_nonzero)
}

/// One-line expiration status for a certificate.
///
/// The prefix is `[EXPIRED]` (or `[EXPIRED, IGNORED]` when `ignore_expired` is set),
/// `[CRITICAL]`, `[WARNING]` or `[OK]`, followed by the time remaining or elapsed and
/// the percentage of the validity period left.
pub fn expiration_status(cert: &Certificate, thresholds: &Thresholds, ignore_expired: bool) -> String {
    let not_after = cert.not_after();
    let remaining = life_remaining_percentage_truncated(cert);

    if is_expired(cert) {
        let prefix = if ignore_expired {
            "[EXPIRED, IGNORED]"
        } else {
            "[EXPIRED]"
        };
        return format!(
            "{prefix} {} (on {}) [{remaining}% life remaining]",
            formatted_expiration(not_after),
            format_date(not_after)
        );
    }

    let prefix = if not_after < thresholds.critical {
        "[CRITICAL]"
    } else if not_after < thresholds.warning {
        "[WARNING]"
    } else {
        "[OK]"
    };

    format!(
        "{prefix} {} (until {}) [{remaining}% life remaining]",
        formatted_expiration(not_after),
        format_date(not_after)
    )
}
