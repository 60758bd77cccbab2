//! US address parsing.
//!
//! Raw one-line addresses are tagged token by token, assembled into a
//! [`ParsedAddress`] with canonical full-word components, and rendered back
//! with [`ParsedAddress::to_line_string`].

pub mod parser;
pub mod tables;
pub mod tagger;

pub use parser::{parse_address, parse_address_with, ParsedAddress};
pub use tables::{AbbrevStyle, AbbreviationTable, DIRECTIONALS, OCCUPANCY_TYPES, STREET_SUFFIXES};
pub use tagger::{AddressLabel, AddressTagger, RuleTagger, TaggedToken, TaggerError};
