// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel identity normalization.
//!
//! A channel address is an opaque string: either a phone number in whatever
//! format a human typed it, or the synthetic marker the web channel derives
//! from a trip's share token. [`normalize_address`] canonicalizes both into
//! one stable form so a participant's stored number and a later inbound
//! contact from the "same" number resolve to the same session.
//!
//! The function is pure and idempotent; it touches no storage and no
//! network. Two distinct real-world numbers that normalize identically (a
//! misconfigured country code, say) will merge into one session -- that is
//! a known limitation, not a special case.

/// Prefix marking a synthetic web-channel address.
pub const WEB_CHANNEL_PREFIX: &str = "web:";

/// Build the synthetic web-channel address for a trip's share token.
pub fn web_address(share_token: &str) -> String {
    format!("{WEB_CHANNEL_PREFIX}{share_token}")
}

/// Canonicalize a raw channel address.
///
/// Rules, applied in order:
/// 1. A web-channel marker passes through unchanged.
/// 2. Whitespace is stripped.
/// 3. A leading `00` international escape becomes `+`.
/// 4. A single leading national zero becomes `+` plus the default country code.
/// 5. A bare number gains a leading `+`.
///
/// Normalizing an already-normalized address returns it unchanged.
pub fn normalize_address(raw: &str, default_country_code: &str) -> String {
    if raw.starts_with(WEB_CHANNEL_PREFIX) {
        return raw.to_string();
    }

    let stripped: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

    if let Some(rest) = stripped.strip_prefix("00") {
        return format!("+{rest}");
    }
    if stripped.starts_with('+') {
        return stripped;
    }
    if let Some(rest) = stripped.strip_prefix('0') {
        return format!("+{default_country_code}{rest}");
    }
    format!("+{stripped}")
}
