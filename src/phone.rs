//! Strict US phone number parsing.
//!
//! Unlike the phone noiser, which only needs digit positions, this parser
//! extracts every component and rejects anything it cannot fully account for.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

static PHONE_RE: OnceLock<Regex> = OnceLock::new();

fn phone_re() -> &'static Regex {
    PHONE_RE.get_or_init(|| {
        Regex::new(
            r"(?x)
            ^\s*
            (?P<country_code>\+?1[-.\s]?)?
            \(?(?P<area_code>\d{3})\)?[-.\s]?
            (?P<first_part>\d{3})[-.\s]?
            (?P<second_part>\d{4})
            (?:\s*(?:x|ext\.?)\s*(?P<extension>\d+))?
            \s*$",
        )
        .expect("phone pattern is valid")
    })
}

/// A North American phone number split into its parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UsPhoneNumber {
    /// Always "1" when present.
    pub country_code: Option<String>,
    pub area_code: String,
    /// Exchange code.
    pub first_part: String,
    /// Line number.
    pub second_part: String,
    pub extension: Option<String>,
}

impl UsPhoneNumber {
    /// Parses "555-123-4567", "(555) 123-4567", "+1 555 123 4567 x89" and similar.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidPhoneNumber` if the input is not a
    /// complete US phone number.
    ///
    /// # Examples
    ///
    /// ```
    /// use idnoise::UsPhoneNumber;
    ///
    /// let number = UsPhoneNumber::parse("+1 (555) 123-4567 x89").unwrap();
    /// assert_eq!(number.area_code, "555");
    /// assert_eq!(number.extension.as_deref(), Some("89"));
    /// assert!(UsPhoneNumber::parse("555-1234").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let caps = phone_re()
            .captures(input)
            .ok_or_else(|| ParseError::InvalidPhoneNumber {
                input: input.to_string(),
            })?;
        let group = |name: &str| caps.name(name).map(|m| m.as_str().to_string());
        let required = |name: &str| {
            group(name).ok_or_else(|| ParseError::InvalidPhoneNumber {
                input: input.to_string(),
            })
        };

        Ok(Self {
            country_code: group("country_code").map(|_| "1".to_string()),
            area_code: required("area_code")?,
            first_part: required("first_part")?,
            second_part: required("second_part")?,
            extension: group("extension"),
        })
    }

    /// The ten national digits.
    #[must_use]
    pub fn national_digits(&self) -> String {
        format!("{}{}{}", self.area_code, self.first_part, self.second_part)
    }
}

impl FromStr for UsPhoneNumber {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for UsPhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.country_code.is_some() {
            write!(f, "+1 ")?;
        }
        write!(f, "{}-{}-{}", self.area_code, self.first_part, self.second_part)?;
        if let Some(ext) = &self.extension {
            write!(f, " x{ext}")?;
        }
        Ok(())
    }
}
