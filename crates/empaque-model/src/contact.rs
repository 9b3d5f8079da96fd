// SPDX-License-Identifier: Apache-2.0

use crate::product::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const RUT_BODY_MAX_DIGITS: usize = 8;
pub const NAME_PART_MAX_LEN: usize = 128;

/// Chilean tax identifier with its modulo-11 check digit.
///
/// Stored normalized (digits plus check character); `Display` renders the
/// canonical dotted form, e.g. `12.345.678-5`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[non_exhaustive]
pub struct Rut(String);

impl Rut {
    /// Strips `.` separators and an optional `-` before the check character,
    /// then verifies the weighted modulo-11 checksum.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let compact: String = input
            .trim()
            .chars()
            .filter(|c| *c != '.' && *c != '-')
            .collect();
        if compact.len() < 2 {
            return Err(ParseError::InvalidFormat(
                "rut requires a body and a check digit",
            ));
        }
        let (body, check) = compact.split_at(compact.len() - 1);
        if body.is_empty() || body.len() > RUT_BODY_MAX_DIGITS {
            return Err(ParseError::InvalidFormat(
                "rut body must be 1 to 8 digits",
            ));
        }
        if !body.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::InvalidFormat("rut body must be digits"));
        }
        let check = check
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('?');
        if !check.is_ascii_digit() && check != 'K' {
            return Err(ParseError::InvalidFormat(
                "rut check character must be a digit or K",
            ));
        }
        if check != check_digit(body) {
            return Err(ParseError::InvalidFormat("rut check digit mismatch"));
        }
        let mut normalized = body.to_string();
        normalized.push(check);
        Ok(Self(normalized))
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.0[..self.0.len() - 1]
    }

    #[must_use]
    pub fn check_char(&self) -> char {
        self.0.chars().last().unwrap_or('?')
    }
}

impl Display for Rut {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let body = self.body();
        let mut grouped = String::with_capacity(body.len() + 3);
        let lead = body.len() % 3;
        for (i, ch) in body.chars().enumerate() {
            if i != 0 && (i + 3 - lead) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        write!(f, "{grouped}-{}", self.check_char())
    }
}

/// Weighted modulo-11 check character for a digit body: weights 2..=7 cycle
/// from the rightmost digit; `11 - (sum % 11)` maps 11 to `0` and 10 to `K`.
#[must_use]
pub fn check_digit(body: &str) -> char {
    let mut sum: u32 = 0;
    let mut weight: u32 = 2;
    for b in body.bytes().rev() {
        sum += u32::from(b - b'0') * weight;
        weight = if weight == 7 { 2 } else { weight + 1 };
    }
    match 11 - (sum % 11) {
        11 => '0',
        10 => 'K',
        d => char::from(b'0' + d as u8),
    }
}

/// `+CC` country code plus a 6-12 digit local number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[non_exhaustive]
pub struct PhoneNumber {
    pub country_code: String,
    pub local: String,
}

impl PhoneNumber {
    pub fn parse(country_code: &str, local: &str) -> Result<Self, ParseError> {
        let Some(cc_digits) = country_code.strip_prefix('+') else {
            return Err(ParseError::InvalidFormat(
                "country code must start with '+'",
            ));
        };
        if cc_digits.is_empty()
            || cc_digits.len() > 3
            || !cc_digits.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(ParseError::InvalidFormat(
                "country code must be 1 to 3 digits",
            ));
        }
        let local: String = local.chars().filter(|c| !c.is_whitespace()).collect();
        if local.len() < 6 || local.len() > 12 || !local.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::InvalidFormat(
                "phone number must be 6 to 12 digits",
            ));
        }
        Ok(Self {
            country_code: country_code.to_string(),
            local,
        })
    }
}

impl Display for PhoneNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.country_code, self.local)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[non_exhaustive]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let input = input.trim();
        let mut parts = input.splitn(2, '@');
        let local = parts.next().unwrap_or_default();
        let domain = parts.next().unwrap_or_default();
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(ParseError::InvalidFormat(
                "email must be of the form local@domain",
            ));
        }
        if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
            return Err(ParseError::InvalidFormat(
                "email domain must contain a dot",
            ));
        }
        Ok(Self(input.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for EmailAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Visitor contact block attached to a quotation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[non_exhaustive]
pub struct ContactDetails {
    pub rut: Rut,
    pub first_name: String,
    pub last_name: String,
    pub phone: PhoneNumber,
    pub email: EmailAddress,
}

impl ContactDetails {
    pub fn new(
        rut: Rut,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone: PhoneNumber,
        email: EmailAddress,
    ) -> Result<Self, ParseError> {
        let first_name = first_name.into();
        let last_name = last_name.into();
        if first_name.trim().is_empty() {
            return Err(ParseError::Empty("first_name"));
        }
        if first_name.len() > NAME_PART_MAX_LEN {
            return Err(ParseError::TooLong("first_name", NAME_PART_MAX_LEN));
        }
        if last_name.trim().is_empty() {
            return Err(ParseError::Empty("last_name"));
        }
        if last_name.len() > NAME_PART_MAX_LEN {
            return Err(ParseError::TooLong("last_name", NAME_PART_MAX_LEN));
        }
        Ok(Self {
            rut,
            first_name,
            last_name,
            phone,
            email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn known_valid_ruts_parse() {
        assert!(Rut::parse("12345678-5").is_ok());
        assert!(Rut::parse("12.345.675-0").is_ok());
        assert!(Rut::parse("12345670-K").is_ok());
        assert!(Rut::parse("12345670-k").is_ok());
        assert!(Rut::parse("11.111.111-1").is_ok());
    }

    #[test]
    fn mutated_check_digit_is_rejected() {
        assert!(Rut::parse("12345678-4").is_err());
        assert!(Rut::parse("12345678-K").is_err());
        assert!(Rut::parse("12.345.675-9").is_err());
    }

    #[test]
    fn malformed_ruts_are_rejected() {
        assert!(Rut::parse("").is_err());
        assert!(Rut::parse("5").is_err());
        assert!(Rut::parse("abcdefgh-5").is_err());
        assert!(Rut::parse("123456789-1").is_err());
    }

    #[test]
    fn canonical_display_groups_thousands() {
        let rut = Rut::parse("12345678-5").unwrap();
        assert_eq!(rut.to_string(), "12.345.678-5");
        let short = Rut::parse("6-K").unwrap();
        assert_eq!(short.to_string(), "6-K");
    }

    #[test]
    fn phone_requires_plus_prefix_and_digits() {
        assert!(PhoneNumber::parse("+56", "912345678").is_ok());
        assert!(PhoneNumber::parse("56", "912345678").is_err());
        assert!(PhoneNumber::parse("+56", "12345").is_err());
        assert!(PhoneNumber::parse("+56", "91234abcd").is_err());
        let p = PhoneNumber::parse("+56", "9 1234 5678").unwrap();
        assert_eq!(p.local, "912345678");
    }

    #[test]
    fn email_needs_local_domain_and_dot() {
        assert!(EmailAddress::parse("ventas@example.cl").is_ok());
        assert!(EmailAddress::parse("ventas@example").is_err());
        assert!(EmailAddress::parse("@example.cl").is_err());
        assert!(EmailAddress::parse("ventas").is_err());
    }

    proptest! {
        #[test]
        fn computed_check_digit_always_round_trips(body in 1_000_000u32..100_000_000u32) {
            let body = body.to_string();
            let check = check_digit(&body);
            let raw = format!("{body}-{check}");
            prop_assert!(Rut::parse(&raw).is_ok());
        }

        #[test]
        fn wrong_check_digit_never_parses(body in 1_000_000u32..100_000_000u32, bump in 1u8..10u8) {
            let body = body.to_string();
            let check = check_digit(&body);
            // Shift into a different check character; 'K' maps onto the digit ring.
            let wrong = match check {
                'K' => char::from(b'0' + (bump - 1)),
                d => {
                    let shifted = (d as u8 - b'0' + bump) % 11;
                    if shifted == 10 { 'K' } else { char::from(b'0' + shifted) }
                }
            };
            prop_assume!(wrong != check);
            let raw = format!("{body}-{wrong}");
            prop_assert!(Rut::parse(&raw).is_err());
        }
    }
}
