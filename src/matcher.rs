//! First-name classification against a reference corpus.
//!
//! A candidate is resolved by exact membership first, then by nickname
//! canonicalization, then by phonetic consensus. Ambiguous nickname and
//! phonetic hits are narrowed down with [`closest_match`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::names::NicknameTable;
use crate::phonetic::{normalize_name, PhoneticIndex};

/// Outcome of classifying a candidate name.
///
/// Every variant except `Unknown` carries the corpus name it resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum NameMatch {
    /// The normalized candidate is in the corpus.
    Exact(String),
    /// The candidate is a nickname of this corpus name.
    Nickname(String),
    /// The candidate sounds like this corpus name.
    Phonetic(String),
    /// No resolution.
    Unknown,
}

impl NameMatch {
    /// The resolved corpus name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Exact(name) | Self::Nickname(name) | Self::Phonetic(name) => Some(name),
            Self::Unknown => None,
        }
    }

    /// Returns true unless the match is `Unknown`.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for NameMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(name) => write!(f, "exact:{name}"),
            Self::Nickname(name) => write!(f, "nickname:{name}"),
            Self::Phonetic(name) => write!(f, "phonetic:{name}"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Picks the candidate most similar to `target` (normalized Levenshtein).
///
/// Candidates are considered in lexicographic order and the first maximum
/// wins, so ties resolve to the smallest name regardless of input order.
#[must_use]
pub fn closest_match<'a, I>(target: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let ordered: BTreeSet<&str> = candidates.into_iter().collect();
    let mut best: Option<(&str, f64)> = None;
    for candidate in ordered {
        let score = strsim::normalized_levenshtein(target, candidate);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((candidate, score)),
        }
    }
    best.map(|(name, _)| name)
}

/// Classifies candidate first names against a corpus.
#[derive(Debug)]
pub struct NameMatcher {
    phonetics: PhoneticIndex,
    nickname_canonicals: BTreeMap<String, BTreeSet<String>>,
}

impl NameMatcher {
    /// Builds a matcher over a corpus of first names.
    ///
    /// Only canonical names that are themselves in the corpus are kept in
    /// the nickname reverse lookup.
    #[must_use]
    pub fn new<I, S>(corpus: I, nicknames: &NicknameTable) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let phonetics = PhoneticIndex::from_names(corpus);
        let mut nickname_canonicals: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for canonical in phonetics.names() {
            let Some(nicks) = nicknames.nicknames_of(canonical) else {
                continue;
            };
            for nick in nicks {
                nickname_canonicals
                    .entry(nick.clone())
                    .or_default()
                    .insert(canonical.to_string());
            }
        }
        Self {
            phonetics,
            nickname_canonicals,
        }
    }

    /// The phonetic index over the corpus.
    #[must_use]
    pub const fn phonetics(&self) -> &PhoneticIndex {
        &self.phonetics
    }

    /// Classifies a candidate: exact, then nickname, then phonetic.
    ///
    /// # Examples
    ///
    /// ```
    /// use idnoise::{NameMatch, NameMatcher, NicknameTable};
    ///
    /// let mut nicknames = NicknameTable::new();
    /// nicknames.add("robert", ["bob"]);
    /// let matcher = NameMatcher::new(["robert", "mary"], &nicknames);
    ///
    /// assert_eq!(matcher.classify(" Mary"), NameMatch::Exact("mary".into()));
    /// assert_eq!(matcher.classify("Bob"), NameMatch::Nickname("robert".into()));
    /// assert_eq!(matcher.classify(""), NameMatch::Unknown);
    /// ```
    #[must_use]
    pub fn classify(&self, candidate: &str) -> NameMatch {
        let normalized = normalize_name(candidate);
        if normalized.is_empty() {
            return NameMatch::Unknown;
        }
        if self.phonetics.is_member(&normalized) {
            return NameMatch::Exact(normalized);
        }

        if let Some(canonicals) = self.nickname_canonicals.get(&normalized) {
            if let Some(best) = closest_match(&normalized, canonicals.iter().map(String::as_str)) {
                return NameMatch::Nickname(best.to_string());
            }
        }

        let sounds_like = self.phonetics.lookup(&normalized);
        match closest_match(&normalized, sounds_like.iter().map(String::as_str)) {
            Some(best) => NameMatch::Phonetic(best.to_string()),
            None => NameMatch::Unknown,
        }
    }
}
