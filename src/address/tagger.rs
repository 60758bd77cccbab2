//! Address token tagging.
//!
//! A tagger splits a one-line US address into tokens and labels each with
//! the component it belongs to. The parser consumes labeled tokens; any
//! tagger producing these labels can be plugged in.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use super::tables::{is_state_code, DIRECTIONALS, MILITARY_MARKERS, OCCUPANCY_TYPES, STREET_SUFFIXES};

/// Address component labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressLabel {
    /// House number.
    AddressNumber,
    /// Directional before the street name ("N").
    StreetNamePreDirectional,
    StreetName,
    /// Street suffix ("St", "Avenue").
    StreetNamePostType,
    StreetNamePostDirectional,
    /// Unit designator ("Apt", "Suite").
    OccupancyType,
    OccupancyIdentifier,
    /// Town or city.
    PlaceName,
    /// Two-letter state or military state code.
    StateName,
    ZipCode,
    /// "PO Box" and its variants.
    UspsBoxType,
    UspsBoxId,
    /// Addressee text such as a ship or unit name.
    Recipient,
    /// Recognized but unused, e.g. a military box group ("PSC 1234").
    Other,
}

/// A token and its label.
pub type TaggedToken = (String, AddressLabel);

/// Tagging failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaggerError {
    #[error("address is empty")]
    Empty,

    #[error("address could not be tagged: {reason}")]
    Unparseable { reason: String },
}

/// Labels the tokens of a raw address string.
pub trait AddressTagger: Send + Sync {
    /// Tags `raw`, returning tokens in input order.
    ///
    /// # Errors
    ///
    /// Returns `TaggerError` when the input cannot be labeled at all.
    fn tag(&self, raw: &str) -> Result<Vec<TaggedToken>, TaggerError>;
}

/// Rule-based tagger for USPS-style one-line addresses.
///
/// Expected shape: `[number] [predir] street... [suffix] [unit type id], town, ST zip`,
/// plus PO boxes and APO/DPO/FPO military addresses.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleTagger;

static ZIP_RE: OnceLock<Regex> = OnceLock::new();
static HOUSE_NUMBER_RE: OnceLock<Regex> = OnceLock::new();

fn zip_re() -> &'static Regex {
    ZIP_RE.get_or_init(|| Regex::new(r"^\d{5}(?:-\d{4})?$").expect("zip pattern is valid"))
}

fn house_number_re() -> &'static Regex {
    HOUSE_NUMBER_RE
        .get_or_init(|| Regex::new(r"^\d+[A-Za-z]?(?:-\d+)?$").expect("house number pattern is valid"))
}

#[derive(Debug)]
struct Token {
    text: String,
    comma_after: bool,
}

fn tokenize(raw: &str) -> Vec<Token> {
    raw.split_whitespace()
        .filter_map(|word| {
            let comma_after = word.ends_with(',');
            let text = word.trim_matches(',').to_string();
            (!text.is_empty()).then_some(Token { text, comma_after })
        })
        .collect()
}

fn is_po_prefix(token: &str) -> bool {
    matches!(
        token.to_ascii_lowercase().replace('.', "").as_str(),
        "po" | "pob" | "post"
    )
}

fn is_box_word(token: &str) -> bool {
    token.eq_ignore_ascii_case("box") || token.eq_ignore_ascii_case("office")
}

fn is_military_marker(token: &str) -> bool {
    MILITARY_MARKERS.iter().any(|m| m.eq_ignore_ascii_case(token))
}

fn label_all(tokens: &[Token], label: AddressLabel, out: &mut Vec<TaggedToken>) {
    out.extend(tokens.iter().map(|t| (t.text.clone(), label)));
}

impl RuleTagger {
    /// Splits trailing "ST 12345" off the token list.
    fn tag_tail(tokens: &[Token]) -> (usize, Vec<TaggedToken>) {
        let mut end = tokens.len();
        let mut tail = Vec::new();
        if end > 1 && zip_re().is_match(&tokens[end - 1].text) {
            tail.push((tokens[end - 1].text.clone(), AddressLabel::ZipCode));
            end -= 1;
        }
        if end > 1 && is_state_code(&tokens[end - 1].text) {
            tail.push((tokens[end - 1].text.to_uppercase(), AddressLabel::StateName));
            end -= 1;
        }
        tail.reverse();
        (end, tail)
    }

    /// "Box 5678" anywhere in the head; everything else is a recipient or box group.
    fn tag_military_head(tokens: &[Token], out: &mut Vec<TaggedToken>) {
        let mut idx = 0;
        while idx < tokens.len() {
            let text = &tokens[idx].text;
            if text.eq_ignore_ascii_case("box") && idx + 1 < tokens.len() {
                out.push((text.clone(), AddressLabel::UspsBoxType));
                out.push((tokens[idx + 1].text.clone(), AddressLabel::UspsBoxId));
                idx += 2;
                continue;
            }
            let is_group = ["psc", "cmr", "unit"].iter().any(|g| g.eq_ignore_ascii_case(text));
            if is_group && idx + 1 < tokens.len() {
                out.push((text.clone(), AddressLabel::Other));
                out.push((tokens[idx + 1].text.clone(), AddressLabel::Other));
                idx += 2;
                continue;
            }
            out.push((text.clone(), AddressLabel::Recipient));
            idx += 1;
        }
    }

    /// "PO Box 123" at the start; returns the number of tokens consumed.
    fn tag_po_box(tokens: &[Token], out: &mut Vec<TaggedToken>) -> usize {
        let mut idx = 0;
        let mut box_type = Vec::new();
        while idx < tokens.len() && idx < 3 && (is_po_prefix(&tokens[idx].text) || is_box_word(&tokens[idx].text)) {
            box_type.push(tokens[idx].text.as_str());
            idx += 1;
        }
        let ends_with_box = box_type.last().is_some_and(|w| w.eq_ignore_ascii_case("box"));
        if !ends_with_box || idx >= tokens.len() {
            return 0;
        }
        out.push((box_type.join(" "), AddressLabel::UspsBoxType));
        out.push((tokens[idx].text.clone(), AddressLabel::UspsBoxId));
        idx + 1
    }

    fn tag_street(tokens: &[Token], out: &mut Vec<TaggedToken>) {
        let mut idx = 0;
        if idx < tokens.len() && house_number_re().is_match(&tokens[idx].text) {
            out.push((tokens[idx].text.clone(), AddressLabel::AddressNumber));
            idx += 1;
        }

        let followed_by_name = |i: usize| {
            i + 1 < tokens.len()
                && !tokens[i].comma_after
                && !STREET_SUFFIXES.contains(&tokens[i + 1].text)
        };
        if idx < tokens.len() && DIRECTIONALS.contains(&tokens[idx].text) && followed_by_name(idx) {
            out.push((tokens[idx].text.clone(), AddressLabel::StreetNamePreDirectional));
            idx += 1;
        }

        let street_start = out.len();
        let mut street_tokens = 0usize;
        let mut closed = false;
        while idx < tokens.len() {
            let token = &tokens[idx];
            if street_tokens > 0 && STREET_SUFFIXES.contains(&token.text) {
                out.push((token.text.clone(), AddressLabel::StreetNamePostType));
                idx += 1;
                closed = true;
                break;
            }
            if street_tokens > 0 && OCCUPANCY_TYPES.contains(&token.text) {
                break;
            }
            out.push((token.text.clone(), AddressLabel::StreetName));
            street_tokens += 1;
            idx += 1;
            if token.comma_after {
                closed = true;
                break;
            }
        }

        if idx < tokens.len() && OCCUPANCY_TYPES.contains(&tokens[idx].text) && idx + 1 < tokens.len() {
            out.push((tokens[idx].text.clone(), AddressLabel::OccupancyType));
            out.push((tokens[idx + 1].text.clone(), AddressLabel::OccupancyIdentifier));
            idx += 2;
        } else if idx < tokens.len() && tokens[idx].text.starts_with('#') {
            out.push((tokens[idx].text.clone(), AddressLabel::OccupancyIdentifier));
            idx += 1;
        }

        // A street that ran to the end without a suffix or comma swallowed the town.
        if !closed && idx >= tokens.len() && street_tokens > 1 {
            if let Some(last) = out[street_start..]
                .iter()
                .rposition(|(_, label)| *label == AddressLabel::StreetName)
            {
                out[street_start + last].1 = AddressLabel::PlaceName;
            }
        }

        label_all(&tokens[idx..], AddressLabel::PlaceName, out);
    }
}

impl AddressTagger for RuleTagger {
    fn tag(&self, raw: &str) -> Result<Vec<TaggedToken>, TaggerError> {
        let tokens = tokenize(raw);
        match tokens.len() {
            0 => return Err(TaggerError::Empty),
            // A lone word is read as a town ("Chicago").
            1 => return Ok(vec![(tokens[0].text.clone(), AddressLabel::PlaceName)]),
            _ => {}
        }

        let (end, tail) = Self::tag_tail(&tokens);
        let head = &tokens[..end];
        let mut out = Vec::with_capacity(tokens.len());

        if let Some(marker) = head.iter().rposition(|t| is_military_marker(&t.text)) {
            Self::tag_military_head(&head[..marker], &mut out);
            label_all(&head[marker..], AddressLabel::PlaceName, &mut out);
        } else {
            let consumed = Self::tag_po_box(head, &mut out);
            if consumed > 0 {
                label_all(&head[consumed..], AddressLabel::PlaceName, &mut out);
            } else {
                Self::tag_street(head, &mut out);
            }
        }

        out.extend(tail);
        Ok(out)
    }
}
