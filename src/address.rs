//! Mixed-case checksum addresses (EIP-55)
//!
//! The canonical form is computed by hashing the lowercase hex digits with
//! Keccak-256 and upper-casing every letter whose matching hash nibble is 8 or
//! higher. Downstream checks compare stored strings against this form exactly.

use once_cell::sync::Lazy;
use regex::Regex;
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Placeholder used by the registries for the chain's native asset / USD.
pub const NATIVE_PLACEHOLDER: &str = "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE";

static ADDRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(0x)?[0-9a-fA-F]{40}$").expect("address regex is valid"));

static MARKET_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{64}$").expect("market id regex is valid"));

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("malformed address '{0}': expected 40 hex digits after an optional 0x prefix")]
    Malformed(String),
}

/// An address rendered in its canonical checksum form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChecksummedAddress(String);

impl ChecksummedAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ChecksummedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ChecksummedAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ChecksummedAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        checksum(s)
    }
}

/// Compute the canonical checksum form of `input`.
pub fn checksum(input: &str) -> Result<ChecksummedAddress, AddressError> {
    if !ADDRESS_RE.is_match(input) {
        return Err(AddressError::Malformed(input.to_string()));
    }

    let digits = input
        .strip_prefix("0x")
        .unwrap_or(input)
        .to_ascii_lowercase();
    let hash = Keccak256::digest(digits.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in digits.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }

    Ok(ChecksummedAddress(out))
}

/// Validator form: `Ok(())` when `stored` already equals its checksum form,
/// otherwise a message describing the expected value.
pub fn verify_checksum(stored: &str) -> Result<(), String> {
    match checksum(stored) {
        Ok(canonical) if canonical.as_str() == stored => Ok(()),
        Ok(canonical) => Err(format!("{stored} should be {canonical}")),
        Err(e) => Err(e.to_string()),
    }
}

pub fn is_native_placeholder(address: &str) -> bool {
    address.eq_ignore_ascii_case(NATIVE_PLACEHOLDER)
}

/// Market unique keys are 32-byte hex strings.
pub fn is_market_id(value: &str) -> bool {
    MARKET_ID_RE.is_match(value)
}
