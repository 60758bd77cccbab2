//! Consensus phonetic index over a name corpus.
//!
//! Names are accumulated in a [`PhoneticIndexBuilder`] and frozen into an
//! immutable [`PhoneticIndex`] before any lookup happens, so a built index
//! can be shared across worker threads without locking.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use super::codes::{normalize_name, PhoneticCodes, PhoneticEncoder};

/// Minimum number of agreeing encoders for a lookup hit.
pub const CONSENSUS_VOTES: usize = 2;

type CodeTable = HashMap<String, BTreeSet<String>>;

fn insert_code(table: &mut CodeTable, code: &str, name: &str) {
    table
        .entry(code.to_string())
        .or_default()
        .insert(name.to_string());
}

/// Mutable accumulation stage of a [`PhoneticIndex`].
#[derive(Default)]
pub struct PhoneticIndexBuilder {
    encoder: PhoneticEncoder,
    metaphone: CodeTable,
    soundex: CodeTable,
    nysiis: CodeTable,
    names: BTreeSet<String>,
}

impl PhoneticIndexBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a name into all three encoder tables.
    ///
    /// The name is normalized first. Names no encoder can handle are still
    /// recorded as corpus members but are unreachable by phonetic lookup.
    pub fn add(&mut self, name: &str) -> &mut Self {
        let name = normalize_name(name);
        if name.is_empty() {
            return self;
        }
        let codes = self.encoder.encode(&name);
        for code in &codes.metaphone {
            insert_code(&mut self.metaphone, code, &name);
        }
        if let Some(code) = &codes.soundex {
            insert_code(&mut self.soundex, code, &name);
        }
        if let Some(code) = &codes.nysiis {
            insert_code(&mut self.nysiis, code, &name);
        }
        self.names.insert(name);
        self
    }

    /// Inserts every name of an iterator.
    pub fn extend<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.add(name.as_ref());
        }
        self
    }

    /// Freezes the builder into a read-only index.
    #[must_use]
    pub fn build(self) -> PhoneticIndex {
        log::debug!(
            "phonetic index frozen: {} names, {} metaphone / {} soundex / {} nysiis codes",
            self.names.len(),
            self.metaphone.len(),
            self.soundex.len(),
            self.nysiis.len()
        );
        PhoneticIndex {
            encoder: self.encoder,
            metaphone: self.metaphone,
            soundex: self.soundex,
            nysiis: self.nysiis,
            names: self.names,
        }
    }
}

/// Immutable three-encoder phonetic index.
///
/// # Examples
///
/// ```
/// use idnoise::PhoneticIndex;
///
/// let index = PhoneticIndex::from_names(["catherine", "katherine", "robert"]);
/// let hits = index.lookup("Kathryn");
/// assert!(!hits.contains("robert"));
/// ```
pub struct PhoneticIndex {
    encoder: PhoneticEncoder,
    metaphone: CodeTable,
    soundex: CodeTable,
    nysiis: CodeTable,
    names: BTreeSet<String>,
}

impl PhoneticIndex {
    /// Builds and freezes an index over a corpus in one step.
    #[must_use]
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = PhoneticIndexBuilder::new();
        builder.extend(names);
        builder.build()
    }

    /// Encodes a name with this index's encoders.
    #[must_use]
    pub fn codes(&self, name: &str) -> PhoneticCodes {
        self.encoder.encode(name)
    }

    /// Names for which at least two of the three encoders agree with `name`.
    ///
    /// Each encoder casts at most one vote per indexed name, whichever of its
    /// codes matched. The result is sorted.
    #[must_use]
    pub fn lookup(&self, name: &str) -> BTreeSet<String> {
        let codes = self.encoder.encode(name);
        if codes.is_empty() {
            return BTreeSet::new();
        }

        let metaphone_hits: BTreeSet<&String> = codes
            .metaphone
            .iter()
            .filter_map(|code| self.metaphone.get(code))
            .flatten()
            .collect();

        let mut votes: HashMap<&String, usize> = HashMap::new();
        for hit in metaphone_hits {
            *votes.entry(hit).or_default() += 1;
        }
        for (table, code) in [(&self.soundex, &codes.soundex), (&self.nysiis, &codes.nysiis)] {
            let Some(code) = code else { continue };
            for hit in table.get(code).into_iter().flatten() {
                *votes.entry(hit).or_default() += 1;
            }
        }

        votes
            .into_iter()
            .filter(|(_, count)| *count >= CONSENSUS_VOTES)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Returns true if any Double Metaphone code of `name` is indexed.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.encoder
            .encode(name)
            .metaphone
            .iter()
            .any(|code| self.metaphone.contains_key(code))
    }

    /// Returns true if the normalized name was inserted verbatim.
    #[must_use]
    pub fn is_member(&self, name: &str) -> bool {
        self.names.contains(&normalize_name(name))
    }

    /// Iterates over the indexed names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Number of indexed names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no name was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for PhoneticIndex {
    fn default() -> Self {
        PhoneticIndexBuilder::new().build()
    }
}

impl fmt::Debug for PhoneticIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhoneticIndex")
            .field("names", &self.names.len())
            .field("metaphone_codes", &self.metaphone.len())
            .field("soundex_codes", &self.soundex.len())
            .field("nysiis_codes", &self.nysiis.len())
            .finish()
    }
}
