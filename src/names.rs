//! Name variant and nickname tables.
//!
//! Both tables are keyed by the normalized (lowercase, trimmed) name and
//! store their values in sorted sets, so picking "a random entry" with a
//! seeded stream is reproducible.

use std::collections::{BTreeMap, BTreeSet};

use crate::phonetic::normalize_name;

/// Capitalizes each space-separated part of a name: "mary ann" → "Mary Ann".
#[must_use]
pub fn make_name(name: &str) -> String {
    name.split(' ')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Symmetric map from a name to its alternate spellings and nicknames.
///
/// If a row lists `b` as a variant of `a`, then `b` lists `a` (and every
/// other variant of the row) as its variants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameVariantMap {
    variants: BTreeMap<String, BTreeSet<String>>,
}

impl NameVariantMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one synonym row: a name and its alternates.
    pub fn add_row<I, S>(&mut self, name: &str, alternates: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = normalize_name(name);
        let alternates: BTreeSet<String> = alternates
            .into_iter()
            .map(|alt| normalize_name(alt.as_ref()))
            .filter(|alt| !alt.is_empty() && *alt != name)
            .collect();
        if name.is_empty() || alternates.is_empty() {
            return;
        }

        for alt in &alternates {
            let others = self.variants.entry(alt.clone()).or_default();
            others.extend(alternates.iter().filter(|other| *other != alt).cloned());
            others.insert(name.clone());
        }
        self.variants.entry(name).or_default().extend(alternates);
    }

    /// Builds a map from synonym rows.
    #[must_use]
    pub fn from_rows<I, N, A, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = (N, A)>,
        N: AsRef<str>,
        A: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = Self::new();
        for (name, alternates) in rows {
            map.add_row(name.as_ref(), alternates);
        }
        map
    }

    /// Variants of a name, if any are known.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.variants
            .get(&normalize_name(name))
            .filter(|set| !set.is_empty())
    }

    /// Every name that has variants, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variants.keys().map(String::as_str)
    }

    /// Number of names with variants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Returns true if the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

/// Canonical name ↔ nickname lookup ("robert" ↔ "bob", "rob", "bobby").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NicknameTable {
    nicknames: BTreeMap<String, BTreeSet<String>>,
    canonicals: BTreeMap<String, BTreeSet<String>>,
}

impl NicknameTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers nicknames of a canonical name.
    pub fn add<I, S>(&mut self, canonical: &str, nicknames: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let canonical = normalize_name(canonical);
        if canonical.is_empty() {
            return;
        }
        for nickname in nicknames {
            let nickname = normalize_name(nickname.as_ref());
            if nickname.is_empty() || nickname == canonical {
                continue;
            }
            self.nicknames
                .entry(canonical.clone())
                .or_default()
                .insert(nickname.clone());
            self.canonicals
                .entry(nickname)
                .or_default()
                .insert(canonical.clone());
        }
    }

    /// Nicknames of a canonical name ("robert" → {"bob", "rob"}).
    #[must_use]
    pub fn nicknames_of(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.nicknames.get(&normalize_name(name))
    }

    /// Canonical forms of a nickname ("bob" → {"robert"}).
    #[must_use]
    pub fn canonicals_of(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.canonicals.get(&normalize_name(name))
    }

    /// Number of canonical names with nicknames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nicknames.len()
    }

    /// Returns true if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nicknames.is_empty()
    }
}
