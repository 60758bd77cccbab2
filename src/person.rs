//! Person records and their noised duplicates.
//!
//! A [`Person`] is a golden record: clean, authoritative, never mutated.
//! A [`NoisedPerson`] is a dirty duplicate that always links back to the
//! golden record it was derived from through `origin_id`.

use std::fmt;

use chrono::{Datelike, Local, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Globally unique person identifier.
///
/// # Examples
///
/// ```
/// use idnoise::PersonId;
///
/// let id = PersonId::new();
/// assert!(!id.is_nil());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(Uuid);

impl PersonId {
    /// Creates a new random person ID from the OS entropy source.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a version 4 ID drawn from the given random stream.
    ///
    /// Used by the noisers so a fixed seed reproduces identical IDs.
    pub fn from_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let bytes: [u8; 16] = rng.gen();
        Self(uuid::Builder::from_random_bytes(bytes).into_uuid())
    }

    /// Creates a person ID from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Returns true if this is a nil (all zeros) UUID.
    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for PersonId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for PersonId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Recorded sex of a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Female,
    Male,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Female => write!(f, "female"),
            Self::Male => write!(f, "male"),
        }
    }
}

fn display_name(
    prefix: Option<&str>,
    first: &str,
    middle: Option<&str>,
    last: &str,
    suffix: Option<&str>,
) -> String {
    [prefix, Some(first), middle, Some(last), suffix]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Completed years between `dob` and `on`.
fn completed_years(dob: NaiveDate, on: NaiveDate) -> i32 {
    let mut years = on.year() - dob.year();
    if (on.month(), on.day()) < (dob.month(), dob.day()) {
        years -= 1;
    }
    years
}

/// A golden identity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub unique_id: PersonId,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    pub date_of_birth: NaiveDate,
    pub raw_address: String,
    pub social_security_number: String,
    pub sex: Sex,
    pub phone: String,
    pub personal_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corporate_email: Option<String>,
}

impl Person {
    /// Full display name: prefix, first, middle, last and suffix, absent parts omitted.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use idnoise::{Person, PersonId, Sex};
    ///
    /// let person = Person {
    ///     unique_id: PersonId::new(),
    ///     first_name: "Jane".into(),
    ///     middle_name: None,
    ///     last_name: "Doe".into(),
    ///     prefix: Some("Dr.".into()),
    ///     suffix: None,
    ///     date_of_birth: NaiveDate::from_ymd_opt(1980, 5, 17).unwrap(),
    ///     raw_address: String::new(),
    ///     social_security_number: String::new(),
    ///     sex: Sex::Female,
    ///     phone: String::new(),
    ///     personal_email: String::new(),
    ///     corporate_email: None,
    /// };
    /// assert_eq!(person.full_name(), "Dr. Jane Doe");
    /// ```
    #[must_use]
    pub fn full_name(&self) -> String {
        display_name(
            self.prefix.as_deref(),
            &self.first_name,
            self.middle_name.as_deref(),
            &self.last_name,
            self.suffix.as_deref(),
        )
    }

    /// Age in completed years on the given date.
    #[must_use]
    pub fn age_on(&self, on: NaiveDate) -> i32 {
        completed_years(self.date_of_birth, on)
    }

    /// Age in completed years today.
    #[must_use]
    pub fn age(&self) -> i32 {
        self.age_on(Local::now().date_naive())
    }

    /// Returns a copy with a different last name (e.g. after marriage).
    #[must_use]
    pub fn with_last_name(&self, last_name: impl Into<String>) -> Self {
        Self {
            last_name: last_name.into(),
            ..self.clone()
        }
    }

    /// Returns a copy living at a different address.
    #[must_use]
    pub fn move_to(&self, raw_address: impl Into<String>) -> Self {
        Self {
            raw_address: raw_address.into(),
            ..self.clone()
        }
    }
}

/// A noised duplicate of a [`Person`].
///
/// Every field the person noiser may null is optional. `unique_id` is always
/// freshly generated; `origin_id` is the `unique_id` of the source record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoisedPerson {
    pub unique_id: PersonId,
    pub origin_id: PersonId,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub raw_address: String,
    pub social_security_number: Option<String>,
    pub sex: Option<Sex>,
    pub phone: Option<String>,
    pub personal_email: Option<String>,
    pub corporate_email: Option<String>,
}

impl NoisedPerson {
    /// Full display name, absent parts omitted.
    #[must_use]
    pub fn full_name(&self) -> String {
        display_name(
            self.prefix.as_deref(),
            &self.first_name,
            self.middle_name.as_deref(),
            &self.last_name,
            self.suffix.as_deref(),
        )
    }

    /// Age in completed years on the given date, if the date of birth survived.
    #[must_use]
    pub fn age_on(&self, on: NaiveDate) -> Option<i32> {
        self.date_of_birth.map(|dob| completed_years(dob, on))
    }

    /// Returns true if this duplicate was derived from `person`.
    #[must_use]
    pub fn is_duplicate_of(&self, person: &Person) -> bool {
        self.origin_id == person.unique_id && self.unique_id != person.unique_id
    }
}
