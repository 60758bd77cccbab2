//! Address noiser: parse, corrupt components, reassemble.

use std::sync::Arc;

use rand::{Rng, RngCore};

use super::keyboard::KeyboardAugmenter;
use super::{draw, Noiser};
use crate::address::{
    parse_address_with, AbbreviationTable, AddressTagger, ParsedAddress, RuleTagger, DIRECTIONALS,
    OCCUPANCY_TYPES, STREET_SUFFIXES,
};
use crate::config::{AddressNoiseConfig, KeyboardConfig};
use crate::error::ValidationError;

/// Corrupts one digit position of a short number.
///
/// Picks a position and, by `p_delete` / `p_transpose` / `p_substitute`
/// shares of one draw, deletes that character, swaps it with the next one,
/// or replaces it with a random digit. Values shorter than two characters
/// are returned unchanged.
pub fn typo_in_short_number(
    value: &str,
    p_delete: f64,
    p_transpose: f64,
    p_substitute: f64,
    rng: &mut dyn RngCore,
) -> String {
    let mut chars: Vec<char> = value.chars().collect();
    if chars.len() < 2 {
        return value.to_string();
    }
    let pos = rng.gen_range(0..chars.len() - 1);
    let u = draw(rng);
    if u < p_delete {
        chars.remove(pos);
    } else if u < p_delete + p_transpose {
        chars.swap(pos, pos + 1);
    } else if u < p_delete + p_transpose + p_substitute {
        chars[pos] = char::from(b'0' + rng.gen_range(0..10u8));
    }
    chars.into_iter().collect()
}

/// Per-address drop budget. A drop drawn after the budget is spent leaves
/// the component as it is.
struct DropBudget {
    used: usize,
    max: usize,
}

impl DropBudget {
    fn try_take(&mut self) -> bool {
        if self.used < self.max {
            self.used += 1;
            true
        } else {
            false
        }
    }
}

/// Noises US addresses component by component.
///
/// At most `max_missing` components are dropped per address. Numbers get
/// digit typos, suffix/directional/occupancy toggle between abbreviation
/// and full word, street name and town get keyboard slips.
#[derive(Clone)]
pub struct AddressNoiser {
    config: AddressNoiseConfig,
    keyboard: KeyboardAugmenter,
    tagger: Arc<dyn AddressTagger>,
}

impl std::fmt::Debug for AddressNoiser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressNoiser")
            .field("config", &self.config)
            .field("keyboard", &self.keyboard)
            .finish_non_exhaustive()
    }
}

impl AddressNoiser {
    /// Creates a noiser parsing with the built-in [`RuleTagger`].
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` for invalid probabilities or chains.
    pub fn new(config: AddressNoiseConfig, keyboard: KeyboardConfig) -> Result<Self, ValidationError> {
        Self::with_tagger(config, keyboard, Arc::new(RuleTagger))
    }

    /// Creates a noiser parsing with a caller-supplied tagger.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` for invalid probabilities or chains.
    pub fn with_tagger(
        config: AddressNoiseConfig,
        keyboard: KeyboardConfig,
        tagger: Arc<dyn AddressTagger>,
    ) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self {
            config,
            keyboard: KeyboardAugmenter::new(keyboard)?,
            tagger,
        })
    }

    fn number_typo(&self, value: &str, rng: &mut dyn RngCore) -> String {
        typo_in_short_number(
            value,
            self.config.p_digit_delete,
            self.config.p_digit_transpose,
            self.config.p_digit_substitute,
            rng,
        )
    }

    /// Drop, else digit typo.
    fn noise_number(&self, field: &mut Option<String>, budget: &mut DropBudget, rng: &mut dyn RngCore) {
        let Some(value) = field.as_deref() else {
            return;
        };
        let u = draw(rng);
        if u < self.config.p_missing {
            if budget.try_take() {
                *field = None;
            }
        } else if u < self.config.p_missing + self.config.p_number_typo {
            *field = Some(self.number_typo(value, rng));
        }
    }

    /// Drop, else abbreviation toggle.
    fn noise_abbreviated(
        &self,
        field: &mut Option<String>,
        table: &AbbreviationTable,
        budget: &mut DropBudget,
        rng: &mut dyn RngCore,
    ) {
        let Some(value) = field.as_deref() else {
            return;
        };
        let u = draw(rng);
        if u < self.config.p_missing {
            if budget.try_take() {
                *field = None;
            }
        } else if u < self.config.p_missing + self.config.p_toggle {
            *field = Some(table.toggle(value));
        }
    }

    /// Noises an already parsed address.
    pub fn noise_parsed(&self, parsed: &ParsedAddress, rng: &mut dyn RngCore) -> ParsedAddress {
        let c = &self.config;
        let mut out = parsed.clone();
        let mut budget = DropBudget {
            used: 0,
            max: c.max_missing,
        };

        self.noise_number(&mut out.house_number, &mut budget, rng);
        if !out.street_name.is_empty() && draw(rng) < c.p_street_typo {
            out.street_name = self.keyboard.augment(&out.street_name, rng);
        }
        self.noise_abbreviated(&mut out.street_suffix, &STREET_SUFFIXES, &mut budget, rng);
        self.noise_abbreviated(&mut out.post_directional, &DIRECTIONALS, &mut budget, rng);
        self.noise_abbreviated(&mut out.occupancy_type, &OCCUPANCY_TYPES, &mut budget, rng);
        self.noise_number(&mut out.secondary_number, &mut budget, rng);

        if let Some(box_id) = out.po_box_id.as_deref() {
            if draw(rng) < c.p_po_box_typo {
                out.po_box_id = Some(self.number_typo(box_id, rng));
            }
        }
        if !out.town.is_empty() && draw(rng) < c.p_town_typo {
            out.town = self.keyboard.augment(&out.town, rng);
        }
        if !out.postcode.is_empty() && draw(rng) < c.p_postcode_typo {
            out.postcode = self.number_typo(&out.postcode, rng);
        }

        if budget.used > 0 {
            log::trace!("address: dropped {} components", budget.used);
        }
        out
    }
}

impl Noiser<str> for AddressNoiser {
    type Output = String;

    fn noise(&self, value: &str, rng: &mut dyn RngCore) -> String {
        let parsed = parse_address_with(self.tagger.as_ref(), value);
        self.noise_parsed(&parsed, rng).to_line_string()
    }
}
