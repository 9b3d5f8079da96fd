// SPDX-License-Identifier: Apache-2.0

use crate::product::{ParseError, ID_HEX_LEN};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const AD_TEXT_MAX_LEN: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
#[non_exhaustive]
pub struct AdvertisementId(String);

impl AdvertisementId {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        if input.is_empty() {
            return Err(ParseError::Empty("advertisement_id"));
        }
        if input.len() != ID_HEX_LEN {
            return Err(ParseError::InvalidFormat(
                "advertisement_id must be 24 hex characters",
            ));
        }
        if !input
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            return Err(ParseError::InvalidFormat(
                "advertisement_id must be lowercase hex",
            ));
        }
        Ok(Self(input.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for AdvertisementId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// `#rgb` or `#rrggbb` color literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[non_exhaustive]
pub struct HexColor(String);

impl HexColor {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let Some(digits) = input.strip_prefix('#') else {
            return Err(ParseError::InvalidFormat("color must start with '#'"));
        };
        if digits.len() != 3 && digits.len() != 6 {
            return Err(ParseError::InvalidFormat(
                "color must be #rgb or #rrggbb",
            ));
        }
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseError::InvalidFormat("color must be hex digits"));
        }
        Ok(Self(input.to_ascii_uppercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for HexColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A promotional banner. The UI shows active ones; nothing enforces that at
/// most one is active at a time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Advertisement {
    pub id: AdvertisementId,
    pub text: String,
    pub background_color: HexColor,
    pub text_color: HexColor,
    pub is_active: bool,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl Advertisement {
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.text.is_empty() {
            return Err(ParseError::Empty("text"));
        }
        if self.text.len() > AD_TEXT_MAX_LEN {
            return Err(ParseError::TooLong("text", AD_TEXT_MAX_LEN));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_color_accepts_short_and_long_forms() {
        assert_eq!(HexColor::parse("#000").unwrap().as_str(), "#000");
        assert_eq!(HexColor::parse("#ffffff").unwrap().as_str(), "#FFFFFF");
    }

    #[test]
    fn hex_color_rejects_bad_lengths_and_digits() {
        assert!(HexColor::parse("000000").is_err());
        assert!(HexColor::parse("#0000").is_err());
        assert!(HexColor::parse("#gggggg").is_err());
    }
}
