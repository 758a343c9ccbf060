//! Logo URIs hosted on the asset CDN
//!
//! The file name after the CDN prefix must be exactly what JavaScript's
//! `encodeURIComponent` produces for the decoded name, so that front ends
//! never see a partially escaped URL.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use thiserror::Error;

pub const LOGO_CDN_PREFIX: &str = "https://cdn.morpho.org/assets/logos/";

/// Everything `encodeURIComponent` escapes
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LogoError {
    #[error("'{0}' is not a valid percent-encoded URI component")]
    MalformedEscape(String),
}

pub fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, COMPONENT).to_string()
}

/// Strict decode: a stray `%` or an escape that is not UTF-8 is an error
pub fn decode_component(input: &str) -> Result<String, LogoError> {
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return Err(LogoError::MalformedEscape(input.to_string()));
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    percent_decode_str(input)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| LogoError::MalformedEscape(input.to_string()))
}

pub fn is_cdn_hosted(uri: &str) -> bool {
    uri.starts_with(LOGO_CDN_PREFIX)
}

/// Canonical form of a CDN logo URI; `Ok(None)` for URIs hosted elsewhere.
pub fn canonical_logo_uri(uri: &str) -> Result<Option<String>, LogoError> {
    let Some(name) = uri.strip_prefix(LOGO_CDN_PREFIX) else {
        return Ok(None);
    };
    let decoded = decode_component(name)?;
    Ok(Some(format!("{LOGO_CDN_PREFIX}{}", encode_component(&decoded))))
}
