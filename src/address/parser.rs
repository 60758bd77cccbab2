//! Structured addresses and their canonical one-line form.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::tables::{AbbreviationTable, DIRECTIONALS, MILITARY_MARKERS, OCCUPANCY_TYPES, STREET_SUFFIXES};
use super::tagger::{AddressLabel, AddressTagger, RuleTagger, TaggedToken};

/// A US address split into components.
///
/// Suffix, directional and occupancy type are stored as capitalized full
/// words ("Street", "North", "Apartment") when recognized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedAddress {
    pub house_number: Option<String>,
    pub street_name: String,
    pub street_suffix: Option<String>,
    pub post_directional: Option<String>,
    pub occupancy_type: Option<String>,
    pub secondary_number: Option<String>,
    pub po_box_type: Option<String>,
    pub po_box_id: Option<String>,
    /// APO/DPO/FPO marker of a military address.
    pub fpo_apo: Option<String>,
    pub town: String,
    pub state: String,
    pub postcode: String,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl ParsedAddress {
    /// Returns true if no component is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_line_string().is_empty()
    }

    /// Canonical one-line form.
    ///
    /// PO boxes render as `"{box type} {box id}, {state} {postcode}"`. Street
    /// addresses render as number, street, suffix, occupancy, unit,
    /// directional and town separated by spaces, the military marker if any,
    /// then `", {state} {postcode}"`. Empty components are skipped, so an
    /// empty address yields an empty string.
    #[must_use]
    pub fn to_line_string(&self) -> String {
        let head = if let Some(box_id) = present(&self.po_box_id) {
            let box_type = present(&self.po_box_type).unwrap_or("PO Box");
            format!("{box_type} {box_id}")
        } else {
            let street = Some(self.street_name.trim()).filter(|s| !s.is_empty());
            let town = Some(self.town.trim()).filter(|s| !s.is_empty());
            [
                present(&self.house_number),
                street,
                present(&self.street_suffix),
                present(&self.occupancy_type),
                present(&self.secondary_number),
                present(&self.post_directional),
                town,
                present(&self.fpo_apo),
            ]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
        };

        let tail = [self.state.trim(), self.postcode.trim()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        match (head.is_empty(), tail.is_empty()) {
            (true, _) => tail,
            (false, true) => head,
            (false, false) => format!("{head}, {tail}"),
        }
    }
}

impl fmt::Display for ParsedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line_string())
    }
}

fn tokens_with(tags: &[TaggedToken], label: AddressLabel) -> Vec<&str> {
    tags.iter()
        .filter(|(_, l)| *l == label)
        .map(|(text, _)| text.trim_matches(','))
        .filter(|text| !text.is_empty())
        .collect()
}

fn joined(tokens: &[&str]) -> Option<String> {
    (!tokens.is_empty()).then(|| tokens.join(" "))
}

fn display_or_raw(table: &AbbreviationTable, text: String) -> String {
    table.expanded_display(&text).unwrap_or(text)
}

/// Position and text of the first " APO"/" DPO"/" FPO" in `raw`.
fn find_military_marker(raw: &str) -> Option<(usize, &'static str)> {
    let upper = raw.to_ascii_uppercase();
    MILITARY_MARKERS
        .iter()
        .filter_map(|marker| upper.find(&format!(" {marker}")).map(|pos| (pos, *marker)))
        .min_by_key(|(pos, _)| *pos)
}

/// Parses an address with the built-in [`RuleTagger`].
///
/// # Examples
///
/// ```
/// use idnoise::parse_address;
///
/// let parsed = parse_address("123 N Main St Apt 4B, Springfield, IL 62704");
/// assert_eq!(parsed.street_suffix.as_deref(), Some("Street"));
/// assert_eq!(
///     parsed.to_line_string(),
///     "123 Main Street Apartment 4B North Springfield, IL 62704"
/// );
/// ```
#[must_use]
pub fn parse_address(raw: &str) -> ParsedAddress {
    parse_address_with(&RuleTagger, raw)
}

/// Parses an address with a caller-supplied tagger.
///
/// A tagging failure is logged and yields an empty [`ParsedAddress`].
#[must_use]
pub fn parse_address_with(tagger: &dyn AddressTagger, raw: &str) -> ParsedAddress {
    let tags = match tagger.tag(raw) {
        Ok(tags) => tags,
        Err(err) => {
            log::warn!("address {raw:?} left unparsed: {err}");
            return ParsedAddress::default();
        }
    };

    let mut place = tokens_with(&tags, AddressLabel::PlaceName);
    let mut street = tokens_with(&tags, AddressLabel::StreetName);
    let mut suffix = joined(&tokens_with(&tags, AddressLabel::StreetNamePostType));

    // "N Springfield": a directional that the tagger left at the start of the town.
    let mut place_directional = None;
    if place.len() > 1 && DIRECTIONALS.contains(place[0]) {
        place_directional = Some(place.remove(0));
    }

    // "Main St" tagged as a street name without a separate suffix.
    if suffix.is_none() && street.len() > 1 {
        if let Some(last) = street.last().copied().filter(|t| STREET_SUFFIXES.contains(t)) {
            street.pop();
            suffix = Some(last.to_string());
        }
    }

    let post_directional = joined(&tokens_with(&tags, AddressLabel::StreetNamePostDirectional));
    // An explicit post-directional wins; the split word belongs to the town again ("West Chester").
    if post_directional.is_some() {
        if let Some(word) = place_directional.take() {
            place.insert(0, word);
        }
    }
    let directional = post_directional
        .or_else(|| place_directional.map(str::to_string))
        .or_else(|| joined(&tokens_with(&tags, AddressLabel::StreetNamePreDirectional)));

    let mut parsed = ParsedAddress {
        house_number: joined(&tokens_with(&tags, AddressLabel::AddressNumber)),
        street_name: street.join(" "),
        street_suffix: suffix.map(|s| display_or_raw(&STREET_SUFFIXES, s)),
        post_directional: directional.map(|d| display_or_raw(&DIRECTIONALS, d)),
        occupancy_type: joined(&tokens_with(&tags, AddressLabel::OccupancyType))
            .map(|o| display_or_raw(&OCCUPANCY_TYPES, o)),
        secondary_number: joined(&tokens_with(&tags, AddressLabel::OccupancyIdentifier)),
        po_box_type: joined(&tokens_with(&tags, AddressLabel::UspsBoxType)),
        po_box_id: joined(&tokens_with(&tags, AddressLabel::UspsBoxId)),
        fpo_apo: None,
        town: place.join(" "),
        state: tokens_with(&tags, AddressLabel::StateName).join(" "),
        postcode: tokens_with(&tags, AddressLabel::ZipCode).join(" "),
    };

    if parsed.street_name.is_empty() {
        if let Some((pos, marker)) = find_military_marker(raw) {
            parsed.fpo_apo = Some(marker.to_string());
            parsed.town = raw[..pos].trim().trim_end_matches(',').to_string();
        }
    }

    parsed
}
