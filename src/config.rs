//! Noise configuration.
//!
//! Every random branch taken by a field noiser is governed by a named
//! probability in [`NoiseConfig`]. Chains of cumulative thresholds (one draw
//! compared against `p_a`, `p_a + p_b`, ...) must sum to at most 1.0; this is
//! checked once at construction time so noising itself never fails.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{NoiseResult, ValidationError};

fn check_probability(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_nan() || !(0.0..=1.0).contains(&value) {
        return Err(ValidationError::ProbabilityOutOfRange {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

fn check_chain(chain: &str, values: &[(&str, f64)]) -> Result<(), ValidationError> {
    for (field, value) in values {
        check_probability(&format!("{chain}.{field}"), *value)?;
    }
    let total: f64 = values.iter().map(|(_, v)| v).sum();
    // Tolerate float accumulation error on chains that sum to exactly 1.0.
    if total > 1.0 + 1e-9 {
        return Err(ValidationError::ThresholdChainExceedsOne {
            chain: chain.to_string(),
            total,
        });
    }
    Ok(())
}

/// Field-missingness decisions applied by the person noiser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonMissingConfig {
    pub p_missing_ssn: f64,
    pub p_missing_middlename: f64,
    pub p_missing_dob: f64,
    pub p_missing_prefix: f64,
    pub p_missing_suffix: f64,
    /// Applied independently to the personal and the corporate email.
    pub p_missing_email: f64,
    pub p_missing_sex: f64,
    pub p_missing_phone: f64,
    /// Probability a kept sex value is re-drawn at random.
    pub p_wrong_sex: f64,
}

impl Default for PersonMissingConfig {
    fn default() -> Self {
        Self {
            p_missing_ssn: 0.4,
            p_missing_middlename: 0.2,
            p_missing_dob: 0.25,
            p_missing_prefix: 0.2,
            p_missing_suffix: 0.2,
            p_missing_email: 0.2,
            p_missing_sex: 0.3,
            p_missing_phone: 0.2,
            p_wrong_sex: 0.2,
        }
    }
}

impl PersonMissingConfig {
    /// Validates every probability.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::ProbabilityOutOfRange` for any value outside [0, 1].
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_probability("missing.p_missing_ssn", self.p_missing_ssn)?;
        check_probability("missing.p_missing_middlename", self.p_missing_middlename)?;
        check_probability("missing.p_missing_dob", self.p_missing_dob)?;
        check_probability("missing.p_missing_prefix", self.p_missing_prefix)?;
        check_probability("missing.p_missing_suffix", self.p_missing_suffix)?;
        check_probability("missing.p_missing_email", self.p_missing_email)?;
        check_probability("missing.p_missing_sex", self.p_missing_sex)?;
        check_probability("missing.p_missing_phone", self.p_missing_phone)?;
        check_probability("missing.p_wrong_sex", self.p_wrong_sex)
    }
}

/// Branch weights of a name noiser.
///
/// The variant, phonetic and typo branches share one draw compared against
/// the cumulative thresholds `p_phonetic`, `p_phonetic + p_variant`,
/// `p_phonetic + p_variant + p_typo`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameNoiseConfig {
    pub p_nickname: f64,
    pub p_variant: f64,
    pub p_phonetic: f64,
    pub p_typo: f64,
    /// Probability of collapsing the name to "X.".
    pub p_initial: f64,
    /// Probability the final name is emitted fully uppercased.
    pub p_uppercase: f64,
}

impl NameNoiseConfig {
    /// Defaults for a first name.
    #[must_use]
    pub const fn first_name() -> Self {
        Self {
            p_nickname: 0.15,
            p_variant: 0.15,
            p_phonetic: 0.15,
            p_typo: 0.15,
            p_initial: 0.0,
            p_uppercase: 0.0,
        }
    }

    /// Defaults for a middle name: initials and nicknames are more common.
    #[must_use]
    pub const fn middle_name() -> Self {
        Self {
            p_nickname: 0.2,
            p_initial: 0.2,
            ..Self::first_name()
        }
    }

    /// Defaults for a last name.
    #[must_use]
    pub const fn last_name() -> Self {
        Self {
            p_nickname: 0.0,
            p_variant: 0.0,
            p_uppercase: 0.5,
            ..Self::first_name()
        }
    }

    /// Validates the branch weights.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if a probability is out of range or the
    /// variant/phonetic/typo chain exceeds 1.0.
    pub fn validate(&self, section: &str) -> Result<(), ValidationError> {
        check_probability(&format!("{section}.p_nickname"), self.p_nickname)?;
        check_probability(&format!("{section}.p_initial"), self.p_initial)?;
        check_probability(&format!("{section}.p_uppercase"), self.p_uppercase)?;
        check_chain(
            section,
            &[
                ("p_phonetic", self.p_phonetic),
                ("p_variant", self.p_variant),
                ("p_typo", self.p_typo),
            ],
        )
    }
}

impl Default for NameNoiseConfig {
    fn default() -> Self {
        Self::first_name()
    }
}

/// A name section as written in a config file; absent keys keep the
/// defaults of the section it is merged over.
#[derive(Debug, Deserialize)]
struct NameNoiseOverrides {
    p_nickname: Option<f64>,
    p_variant: Option<f64>,
    p_phonetic: Option<f64>,
    p_typo: Option<f64>,
    p_initial: Option<f64>,
    p_uppercase: Option<f64>,
}

impl NameNoiseOverrides {
    fn merge_over(self, base: NameNoiseConfig) -> NameNoiseConfig {
        NameNoiseConfig {
            p_nickname: self.p_nickname.unwrap_or(base.p_nickname),
            p_variant: self.p_variant.unwrap_or(base.p_variant),
            p_phonetic: self.p_phonetic.unwrap_or(base.p_phonetic),
            p_typo: self.p_typo.unwrap_or(base.p_typo),
            p_initial: self.p_initial.unwrap_or(base.p_initial),
            p_uppercase: self.p_uppercase.unwrap_or(base.p_uppercase),
        }
    }
}

fn first_name_section<'de, D: Deserializer<'de>>(d: D) -> Result<NameNoiseConfig, D::Error> {
    NameNoiseOverrides::deserialize(d).map(|o| o.merge_over(NameNoiseConfig::first_name()))
}

fn middle_name_section<'de, D: Deserializer<'de>>(d: D) -> Result<NameNoiseConfig, D::Error> {
    NameNoiseOverrides::deserialize(d).map(|o| o.merge_over(NameNoiseConfig::middle_name()))
}

fn last_name_section<'de, D: Deserializer<'de>>(d: D) -> Result<NameNoiseConfig, D::Error> {
    NameNoiseOverrides::deserialize(d).map(|o| o.merge_over(NameNoiseConfig::last_name()))
}

/// Probabilities of the typo sub-chain used by the name noisers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypoConfig {
    /// Gate applied independently to every phonetic substitution rule.
    pub p_phonetic_replacement: f64,
    pub p_rem_duplicate_char: f64,
    pub p_add_duplicate_char: f64,
    pub p_random_augment: f64,
}

impl Default for TypoConfig {
    fn default() -> Self {
        Self {
            p_phonetic_replacement: 0.5,
            p_rem_duplicate_char: 0.2,
            p_add_duplicate_char: 0.1,
            p_random_augment: 0.05,
        }
    }
}

impl TypoConfig {
    /// Validates the typo chain.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if a probability is out of range or the
    /// duplicate/augment chain exceeds 1.0.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_probability("typo.p_phonetic_replacement", self.p_phonetic_replacement)?;
        check_chain(
            "typo",
            &[
                ("p_rem_duplicate_char", self.p_rem_duplicate_char),
                ("p_add_duplicate_char", self.p_add_duplicate_char),
                ("p_random_augment", self.p_random_augment),
            ],
        )
    }
}

/// Keyboard-typo augmentation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardConfig {
    /// Share of a word's characters to replace.
    pub aug_char_p: f64,
    pub aug_char_min: usize,
    pub aug_char_max: usize,
    /// Words shorter than this are left untouched.
    pub min_char: usize,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            aug_char_p: 0.15,
            aug_char_min: 1,
            aug_char_max: 3,
            min_char: 4,
        }
    }
}

impl KeyboardConfig {
    /// Validates the augmentation bounds.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if `aug_char_p` is out of range or the
    /// minimum exceeds the maximum.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_probability("keyboard.aug_char_p", self.aug_char_p)?;
        if self.aug_char_min > self.aug_char_max {
            return Err(ValidationError::InvalidAugmentBounds {
                min: self.aug_char_min,
                max: self.aug_char_max,
            });
        }
        Ok(())
    }
}

/// Date-of-birth branch weights, evaluated as one cumulative chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DobNoiseConfig {
    pub p_not_set: f64,
    pub p_swap_month_day: f64,
    pub p_swap_days: f64,
    pub p_off_year: f64,
}

impl Default for DobNoiseConfig {
    fn default() -> Self {
        Self {
            p_not_set: 0.25,
            p_swap_month_day: 0.15,
            p_swap_days: 0.1,
            p_off_year: 0.1,
        }
    }
}

impl DobNoiseConfig {
    /// Validates the chain.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if the chain is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_chain(
            "dob",
            &[
                ("p_not_set", self.p_not_set),
                ("p_swap_month_day", self.p_swap_month_day),
                ("p_swap_days", self.p_swap_days),
                ("p_off_year", self.p_off_year),
            ],
        )
    }
}

/// Address corruption settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressNoiseConfig {
    /// Cap on structural fields dropped from one address.
    pub max_missing: usize,
    /// Drop probability of each droppable structural field.
    pub p_missing: f64,
    /// Typo probability of house and secondary numbers (after the drop share).
    pub p_number_typo: f64,
    /// Abbreviation toggle probability of suffix, directional, occupancy (after the drop share).
    pub p_toggle: f64,
    pub p_street_typo: f64,
    pub p_po_box_typo: f64,
    pub p_town_typo: f64,
    pub p_postcode_typo: f64,
    /// Shares of the short-number typo kinds.
    pub p_digit_delete: f64,
    pub p_digit_transpose: f64,
    pub p_digit_substitute: f64,
}

impl Default for AddressNoiseConfig {
    fn default() -> Self {
        Self {
            max_missing: 2,
            p_missing: 0.1,
            p_number_typo: 0.1,
            p_toggle: 0.2,
            p_street_typo: 0.15,
            p_po_box_typo: 0.1,
            p_town_typo: 0.2,
            p_postcode_typo: 0.2,
            p_digit_delete: 0.4,
            p_digit_transpose: 0.5,
            p_digit_substitute: 0.1,
        }
    }
}

impl AddressNoiseConfig {
    /// Validates the address chains.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if a probability or chain is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_chain(
            "address.numbers",
            &[("p_missing", self.p_missing), ("p_number_typo", self.p_number_typo)],
        )?;
        check_chain(
            "address.labels",
            &[("p_missing", self.p_missing), ("p_toggle", self.p_toggle)],
        )?;
        check_probability("address.p_street_typo", self.p_street_typo)?;
        check_probability("address.p_po_box_typo", self.p_po_box_typo)?;
        check_probability("address.p_town_typo", self.p_town_typo)?;
        check_probability("address.p_postcode_typo", self.p_postcode_typo)?;
        check_chain(
            "address.digit_typo",
            &[
                ("p_digit_delete", self.p_digit_delete),
                ("p_digit_transpose", self.p_digit_transpose),
                ("p_digit_substitute", self.p_digit_substitute),
            ],
        )
    }
}

/// Email perturbation probabilities. Each group draws independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailNoiseConfig {
    /// Keyboard typo in the local part (shares one draw with `p_wrong_separator`).
    pub p_localpart_typo: f64,
    pub p_wrong_separator: f64,
    pub p_extension: f64,
    pub p_domain_separator: f64,
}

impl Default for EmailNoiseConfig {
    fn default() -> Self {
        Self {
            p_localpart_typo: 0.05,
            p_wrong_separator: 0.1,
            p_extension: 0.15,
            p_domain_separator: 0.1,
        }
    }
}

impl EmailNoiseConfig {
    /// Validates the email probabilities.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if a probability or chain is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_chain(
            "email.localpart",
            &[
                ("p_localpart_typo", self.p_localpart_typo),
                ("p_wrong_separator", self.p_wrong_separator),
            ],
        )?;
        check_probability("email.p_extension", self.p_extension)?;
        check_probability("email.p_domain_separator", self.p_domain_separator)
    }
}

/// Phone digit-swap probabilities, one per pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhoneNoiseConfig {
    pub p_swap_first: f64,
    pub p_swap_second: f64,
}

impl Default for PhoneNoiseConfig {
    fn default() -> Self {
        Self {
            p_swap_first: 0.2,
            p_swap_second: 0.2,
        }
    }
}

impl PhoneNoiseConfig {
    /// Validates the pass probabilities.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::ProbabilityOutOfRange` for any value outside [0, 1].
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_probability("phone.p_swap_first", self.p_swap_first)?;
        check_probability("phone.p_swap_second", self.p_swap_second)
    }
}

/// Complete noising configuration.
///
/// # Examples
///
/// ```
/// use idnoise::NoiseConfig;
///
/// let config = NoiseConfig::default();
/// assert!(config.validate().is_ok());
/// assert_eq!(config.address.max_missing, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    pub missing: PersonMissingConfig,
    #[serde(deserialize_with = "first_name_section")]
    pub first_name: NameNoiseConfig,
    /// Keys left out of a partial section keep the middle-name defaults.
    #[serde(deserialize_with = "middle_name_section")]
    pub middle_name: NameNoiseConfig,
    /// Keys left out of a partial section keep the last-name defaults.
    #[serde(deserialize_with = "last_name_section")]
    pub last_name: NameNoiseConfig,
    pub typo: TypoConfig,
    pub keyboard: KeyboardConfig,
    pub dob: DobNoiseConfig,
    pub address: AddressNoiseConfig,
    pub email: EmailNoiseConfig,
    pub phone: PhoneNoiseConfig,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            missing: PersonMissingConfig::default(),
            first_name: NameNoiseConfig::first_name(),
            middle_name: NameNoiseConfig::middle_name(),
            last_name: NameNoiseConfig::last_name(),
            typo: TypoConfig::default(),
            keyboard: KeyboardConfig::default(),
            dob: DobNoiseConfig::default(),
            address: AddressNoiseConfig::default(),
            email: EmailNoiseConfig::default(),
            phone: PhoneNoiseConfig::default(),
        }
    }
}

impl NoiseConfig {
    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.missing.validate()?;
        self.first_name.validate("first_name")?;
        self.middle_name.validate("middle_name")?;
        self.last_name.validate("last_name")?;
        self.typo.validate()?;
        self.keyboard.validate()?;
        self.dob.validate()?;
        self.address.validate()?;
        self.email.validate()?;
        self.phone.validate()
    }

    /// Decodes and validates a JSON configuration. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `NoiseError::ConfigFormat` for malformed JSON and
    /// `NoiseError::Validation` for invalid probabilities.
    pub fn from_json_str(json: &str) -> NoiseResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, decodes and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns `NoiseError::Io` if the file cannot be read, otherwise the
    /// errors of [`NoiseConfig::from_json_str`].
    pub fn from_json_file(path: impl AsRef<Path>) -> NoiseResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// A configuration where no random branch ever fires.
    #[must_use]
    pub fn quiet() -> Self {
        let quiet_name = NameNoiseConfig {
            p_nickname: 0.0,
            p_variant: 0.0,
            p_phonetic: 0.0,
            p_typo: 0.0,
            p_initial: 0.0,
            p_uppercase: 0.0,
        };
        Self {
            missing: PersonMissingConfig {
                p_missing_ssn: 0.0,
                p_missing_middlename: 0.0,
                p_missing_dob: 0.0,
                p_missing_prefix: 0.0,
                p_missing_suffix: 0.0,
                p_missing_email: 0.0,
                p_missing_sex: 0.0,
                p_missing_phone: 0.0,
                p_wrong_sex: 0.0,
            },
            first_name: quiet_name.clone(),
            middle_name: quiet_name.clone(),
            last_name: quiet_name,
            typo: TypoConfig {
                p_phonetic_replacement: 0.0,
                p_rem_duplicate_char: 0.0,
                p_add_duplicate_char: 0.0,
                p_random_augment: 0.0,
            },
            keyboard: KeyboardConfig::default(),
            dob: DobNoiseConfig {
                p_not_set: 0.0,
                p_swap_month_day: 0.0,
                p_swap_days: 0.0,
                p_off_year: 0.0,
            },
            address: AddressNoiseConfig {
                p_missing: 0.0,
                p_number_typo: 0.0,
                p_toggle: 0.0,
                p_street_typo: 0.0,
                p_po_box_typo: 0.0,
                p_town_typo: 0.0,
                p_postcode_typo: 0.0,
                ..AddressNoiseConfig::default()
            },
            email: EmailNoiseConfig {
                p_localpart_typo: 0.0,
                p_wrong_separator: 0.0,
                p_extension: 0.0,
                p_domain_separator: 0.0,
            },
            phone: PhoneNoiseConfig {
                p_swap_first: 0.0,
                p_swap_second: 0.0,
            },
        }
    }
}
