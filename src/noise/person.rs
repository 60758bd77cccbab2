//! Whole-record noising.

use std::sync::Arc;

use rand::{Rng, RngCore};

use super::address::AddressNoiser;
use super::dob::DobNoiser;
use super::email::EmailNoiser;
use super::name::{FirstNameNoiser, LastNameNoiser, TypoNoiser};
use super::phone::PhoneNoiser;
use super::{draw, Noiser};
use crate::address::{AddressTagger, RuleTagger};
use crate::config::{NoiseConfig, PersonMissingConfig};
use crate::error::ValidationError;
use crate::names::{NameVariantMap, NicknameTable};
use crate::person::{NoisedPerson, Person, PersonId, Sex};
use crate::phonetic::PhoneticIndex;

/// Read-only lookup tables shared by the name noisers.
#[derive(Debug, Clone, Default)]
pub struct NameTables {
    /// Alternate spellings of given names.
    pub given_name_variants: Arc<NameVariantMap>,
    pub nicknames: Arc<NicknameTable>,
    /// Phonetic index over the first-name corpus.
    pub first_names: Arc<PhoneticIndex>,
    /// Phonetic index over the surname corpus.
    pub last_names: Arc<PhoneticIndex>,
}

impl NameTables {
    /// Builds the tables from loaded corpora.
    #[must_use]
    pub fn from_corpora<F, L, S, T>(
        first_names: F,
        last_names: L,
        given_name_variants: NameVariantMap,
        nicknames: NicknameTable,
    ) -> Self
    where
        F: IntoIterator<Item = S>,
        S: AsRef<str>,
        L: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        Self {
            given_name_variants: Arc::new(given_name_variants),
            nicknames: Arc::new(nicknames),
            first_names: Arc::new(PhoneticIndex::from_names(first_names)),
            last_names: Arc::new(PhoneticIndex::from_names(last_names)),
        }
    }
}

/// Turns a golden [`Person`] into a [`NoisedPerson`].
///
/// Fields are handled in a fixed order (honorifics, emails, date of birth,
/// sex, phone, names, address, SSN, new ID) so a given random stream always
/// yields the same duplicate.
///
/// # Examples
///
/// ```
/// use idnoise::{NameTables, NoiseConfig, Noiser, PersonNoiser};
/// # use idnoise::{Person, PersonId, Sex};
/// # use chrono::NaiveDate;
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// let noiser = PersonNoiser::new(&NoiseConfig::default(), NameTables::default())?;
/// # let person = Person {
/// #     unique_id: PersonId::new(),
/// #     first_name: "Ada".into(),
/// #     middle_name: None,
/// #     last_name: "Lovelace".into(),
/// #     prefix: None,
/// #     suffix: None,
/// #     date_of_birth: NaiveDate::from_ymd_opt(1815, 12, 10).unwrap(),
/// #     raw_address: "12 St James Sq, London, KY 40741".into(),
/// #     social_security_number: "000-00-0000".into(),
/// #     sex: Sex::Female,
/// #     phone: "555-010-0199".into(),
/// #     personal_email: "ada@example.org".into(),
/// #     corporate_email: None,
/// # };
/// let duplicate = noiser.noise(&person, &mut StdRng::seed_from_u64(1));
/// assert_eq!(duplicate.origin_id, person.unique_id);
/// assert_ne!(duplicate.unique_id, person.unique_id);
/// # Ok::<(), idnoise::ValidationError>(())
/// ```
#[derive(Debug, Clone)]
pub struct PersonNoiser {
    missing: PersonMissingConfig,
    first_name: FirstNameNoiser,
    middle_name: FirstNameNoiser,
    last_name: LastNameNoiser,
    dob: DobNoiser,
    address: AddressNoiser,
    email: EmailNoiser,
    phone: PhoneNoiser,
}

impl PersonNoiser {
    /// Builds every field noiser from one configuration.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` found in `config`.
    pub fn new(config: &NoiseConfig, tables: NameTables) -> Result<Self, ValidationError> {
        Self::with_tagger(config, tables, Arc::new(RuleTagger))
    }

    /// Like [`PersonNoiser::new`], but addresses are parsed with `tagger`.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` found in `config`.
    pub fn with_tagger(
        config: &NoiseConfig,
        tables: NameTables,
        tagger: Arc<dyn AddressTagger>,
    ) -> Result<Self, ValidationError> {
        config.validate()?;
        let typo = TypoNoiser::new(config.typo.clone(), config.keyboard.clone())?;
        let given = |section| {
            FirstNameNoiser::new(
                section,
                typo.clone(),
                Arc::clone(&tables.given_name_variants),
                Arc::clone(&tables.nicknames),
                Arc::clone(&tables.first_names),
            )
        };

        Ok(Self {
            missing: config.missing.clone(),
            first_name: given(config.first_name.clone())?,
            middle_name: given(config.middle_name.clone())?,
            last_name: LastNameNoiser::new(
                config.last_name.clone(),
                typo.clone(),
                Arc::clone(&tables.last_names),
            )?,
            dob: DobNoiser::new(config.dob.clone())?,
            address: AddressNoiser::with_tagger(
                config.address.clone(),
                config.keyboard.clone(),
                tagger,
            )?,
            email: EmailNoiser::new(config.email.clone(), config.keyboard.clone())?,
            phone: PhoneNoiser::new(config.phone.clone())?,
        })
    }

    /// Keeps `value` unless a draw falls below `p_missing`.
    fn keep<T>(value: T, p_missing: f64, rng: &mut dyn RngCore) -> Option<T> {
        (draw(rng) >= p_missing).then_some(value)
    }

    fn noise_sex(&self, sex: Sex, rng: &mut dyn RngCore) -> Option<Sex> {
        let sex = Self::keep(sex, self.missing.p_missing_sex, rng)?;
        if draw(rng) < self.missing.p_wrong_sex {
            Some(if rng.gen::<bool>() { Sex::Female } else { Sex::Male })
        } else {
            Some(sex)
        }
    }

    fn fresh_id(original: PersonId, rng: &mut dyn RngCore) -> PersonId {
        loop {
            let id = PersonId::from_rng(rng);
            if id != original {
                return id;
            }
        }
    }
}

impl Noiser<Person> for PersonNoiser {
    type Output = NoisedPerson;

    fn noise(&self, person: &Person, rng: &mut dyn RngCore) -> NoisedPerson {
        let m = &self.missing;

        let prefix = person
            .prefix
            .clone()
            .and_then(|p| Self::keep(p, m.p_missing_prefix, rng));
        let suffix = person
            .suffix
            .clone()
            .and_then(|s| Self::keep(s, m.p_missing_suffix, rng));

        let personal_email = Self::keep(&person.personal_email, m.p_missing_email, rng)
            .map(|email| self.email.noise(email, rng));
        let corporate_email = person
            .corporate_email
            .as_deref()
            .and_then(|email| Self::keep(email, m.p_missing_email, rng))
            .map(|email| self.email.noise(email, rng));

        let date_of_birth = Self::keep(person.date_of_birth, m.p_missing_dob, rng)
            .map(|dob| self.dob.noise(&dob, rng));
        let sex = self.noise_sex(person.sex, rng);
        let phone = Self::keep(&person.phone, m.p_missing_phone, rng)
            .map(|phone| self.phone.noise(phone, rng));

        let first_name = self.first_name.noise(&person.first_name, rng);
        let middle_name = person
            .middle_name
            .as_deref()
            .and_then(|middle| Self::keep(middle, m.p_missing_middlename, rng))
            .map(|middle| self.middle_name.noise(middle, rng));
        let last_name = self.last_name.noise(&person.last_name, rng);
        let raw_address = self.address.noise(&person.raw_address, rng);
        let social_security_number =
            Self::keep(person.social_security_number.clone(), m.p_missing_ssn, rng);

        NoisedPerson {
            unique_id: Self::fresh_id(person.unique_id, rng),
            origin_id: person.unique_id,
            first_name,
            middle_name,
            last_name,
            prefix,
            suffix,
            date_of_birth,
            raw_address,
            social_security_number,
            sex,
            phone,
            personal_email,
            corporate_email,
        }
    }
}
