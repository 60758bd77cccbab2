//! USPS abbreviation tables.
//!
//! Each table maps an abbreviation to its full word and can be queried in
//! both directions. Lookups ignore case and a trailing period.

/// How an abbreviation is written when toggling from the full word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbbrevStyle {
    /// "N", "NE".
    Upper,
    /// "St.", "Apt.".
    Dotted,
}

/// Bidirectional abbreviation ↔ full word table.
#[derive(Debug)]
pub struct AbbreviationTable {
    pairs: &'static [(&'static str, &'static str)],
    style: AbbrevStyle,
}

/// Uppercases the first character and lowercases the rest.
pub(crate) fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

fn normalize_token(token: &str) -> String {
    let lower = token.trim().trim_matches(',').to_lowercase();
    lower.strip_suffix('.').unwrap_or(&lower).to_string()
}

impl AbbreviationTable {
    /// Full word of an abbreviation.
    #[must_use]
    pub fn expand(&self, abbreviation: &str) -> Option<&'static str> {
        let key = normalize_token(abbreviation);
        self.pairs.iter().find(|(abbr, _)| *abbr == key).map(|(_, full)| *full)
    }

    /// Abbreviation of a full word.
    #[must_use]
    pub fn abbreviate(&self, full: &str) -> Option<&'static str> {
        let key = normalize_token(full);
        self.pairs.iter().find(|(_, f)| *f == key).map(|(abbr, _)| *abbr)
    }

    /// Full lowercase word for a token in either form.
    #[must_use]
    pub fn canonical(&self, token: &str) -> Option<&'static str> {
        let key = normalize_token(token);
        self.pairs
            .iter()
            .find(|(abbr, full)| *abbr == key || *full == key)
            .map(|(_, full)| *full)
    }

    /// Returns true if the token is an abbreviation or a full word of this table.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.canonical(token).is_some()
    }

    /// Capitalized full word for a token in either form ("st." → "Street").
    #[must_use]
    pub fn expanded_display(&self, token: &str) -> Option<String> {
        self.canonical(token).map(capitalize)
    }

    /// Switches a value to its other form.
    ///
    /// An abbreviation becomes the capitalized full word; a full word becomes
    /// the abbreviation written in this table's style. Unknown text is
    /// returned unchanged.
    #[must_use]
    pub fn toggle(&self, text: &str) -> String {
        if let Some(full) = self.expand(text) {
            return capitalize(full);
        }
        match (self.abbreviate(text), self.style) {
            (Some(abbr), AbbrevStyle::Upper) => abbr.to_uppercase(),
            (Some(abbr), AbbrevStyle::Dotted) => format!("{}.", capitalize(abbr)),
            (None, _) => text.to_string(),
        }
    }
}

/// Compass directions.
pub static DIRECTIONALS: AbbreviationTable = AbbreviationTable {
    pairs: &[
        ("n", "north"),
        ("s", "south"),
        ("e", "east"),
        ("w", "west"),
        ("ne", "northeast"),
        ("se", "southeast"),
        ("nw", "northwest"),
        ("sw", "southwest"),
    ],
    style: AbbrevStyle::Upper,
};

/// Street suffixes.
pub static STREET_SUFFIXES: AbbreviationTable = AbbreviationTable {
    pairs: &[
        ("st", "street"),
        ("rd", "road"),
        ("ave", "avenue"),
        ("blvd", "boulevard"),
        ("ln", "lane"),
        ("dr", "drive"),
        ("ct", "court"),
        ("cir", "circle"),
        ("wy", "way"),
        ("pl", "place"),
        ("ter", "terrace"),
        ("hwy", "highway"),
        ("aly", "alley"),
        ("pkwy", "parkway"),
    ],
    style: AbbrevStyle::Dotted,
};

/// Secondary-unit designators.
pub static OCCUPANCY_TYPES: AbbreviationTable = AbbreviationTable {
    pairs: &[
        ("apt", "apartment"),
        ("bsmt", "basement"),
        ("bldg", "building"),
        ("dept", "department"),
        ("fl", "floor"),
        ("frnt", "front"),
        ("hngr", "hanger"),
        ("key", "key"),
        ("lbby", "lobby"),
        ("lot", "lot"),
        ("lowr", "lower"),
        ("ofc", "office"),
        ("ph", "penthouse"),
        ("pier", "pier"),
        ("rear", "rear"),
        ("rm", "room"),
        ("side", "side"),
        ("slip", "slip"),
        ("spc", "space"),
        ("stop", "stop"),
        ("ste", "suite"),
        ("trlr", "trailer"),
        ("unit", "unit"),
        ("uppr", "upper"),
    ],
    style: AbbrevStyle::Dotted,
};

/// Two-letter state, territory and military state codes.
pub static STATE_CODES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ",
    "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT",
    "VA", "WA", "WV", "WI", "WY", "DC", "AS", "GU", "MP", "PR", "VI", "AA", "AE", "AP",
];

/// Military post office markers.
pub static MILITARY_MARKERS: &[&str] = &["APO", "DPO", "FPO"];

/// Returns true for a known two-letter state code (any case).
#[must_use]
pub fn is_state_code(token: &str) -> bool {
    let token = token.trim_matches(|c: char| c == ',' || c == '.');
    token.len() == 2 && STATE_CODES.iter().any(|s| s.eq_ignore_ascii_case(token))
}
