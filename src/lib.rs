//! # idnoise - Synthetic dirty duplicates of identity records
//!
//! idnoise takes clean ("golden") person records and produces realistic noisy
//! duplicates of them, the kind of variation found when the same person is
//! entered into several systems: nicknames, misspellings, phonetic respellings,
//! keyboard slips, swapped date parts, re-abbreviated addresses and missing
//! fields. Every duplicate keeps a link back to its source record, which makes
//! the output usable as labelled data for record-linkage systems.
//!
//! ## Core Concepts
//!
//! - **PhoneticIndex**: Consensus phonetic lookup over a name corpus
//! - **NameMatcher**: Classifies a name as exact, nickname, phonetic or no match
//! - **ParsedAddress**: Component-level view of a US address
//! - **Noiser**: One implementation per field kind, all drawing from an explicit random stream
//! - **PersonNoiser**: Orchestrates the field noisers into a [`NoisedPerson`]
//! - **BatchNoiser**: Parallel driver with reproducible per-record streams
//!
//! ## Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use idnoise::{NameTables, NoiseConfig, Noiser, Person, PersonId, PersonNoiser, Sex};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let tables = NameTables::from_corpora(
//!     ["katherine", "catherine", "kathryn"],
//!     ["smith", "smyth"],
//!     Default::default(),
//!     Default::default(),
//! );
//! let noiser = PersonNoiser::new(&NoiseConfig::default(), tables)?;
//!
//! let person = Person {
//!     unique_id: PersonId::new(),
//!     first_name: "Katherine".into(),
//!     middle_name: None,
//!     last_name: "Smith".into(),
//!     prefix: None,
//!     suffix: None,
//!     date_of_birth: NaiveDate::from_ymd_opt(1990, 4, 2).unwrap(),
//!     raw_address: "42 W Elm Ave, Madison, WI 53703".into(),
//!     social_security_number: "123-45-6789".into(),
//!     sex: Sex::Female,
//!     phone: "608-555-0142".into(),
//!     personal_email: "kate.smith@example.com".into(),
//!     corporate_email: None,
//! };
//!
//! let duplicate = noiser.noise(&person, &mut StdRng::seed_from_u64(2024));
//! assert!(duplicate.is_duplicate_of(&person));
//! # Ok::<(), idnoise::ValidationError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod config;
pub mod error;
pub mod person;

// Reference data and lookup
pub mod corpus;
pub mod matcher;
pub mod names;
pub mod phonetic;

// Structured parsing
pub mod address;
pub mod phone;

// Noising
pub mod batch;
pub mod noise;

// Re-export primary types at crate root for convenience
pub use address::{parse_address, AddressTagger, ParsedAddress, RuleTagger};
pub use batch::{BatchConfig, BatchFailure, BatchNoiser, BatchOutput, DuplicateCountConfig};
pub use config::{
    AddressNoiseConfig, DobNoiseConfig, EmailNoiseConfig, KeyboardConfig, NameNoiseConfig,
    NoiseConfig, PersonMissingConfig, PhoneNoiseConfig, TypoConfig,
};
pub use error::{CorpusError, NoiseError, NoiseResult, ParseError, ValidationError};
pub use matcher::{closest_match, NameMatch, NameMatcher};
pub use names::{make_name, NameVariantMap, NicknameTable};
pub use noise::{
    AddressNoiser, DobNoiser, EmailNoiser, FirstNameNoiser, KeyboardAugmenter, LastNameNoiser,
    NameTables, Noiser, PersonNoiser, PhoneNoiser, TypoNoiser,
};
pub use person::{NoisedPerson, Person, PersonId, Sex};
pub use phone::UsPhoneNumber;
pub use phonetic::{normalize_name, PhoneticCodes, PhoneticEncoder, PhoneticIndex, PhoneticIndexBuilder};
