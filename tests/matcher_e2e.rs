use std::io::Write;

use idnoise::corpus::{load_given_name_synonyms, load_name_list, load_nicknames, load_surnames};
use idnoise::{
    closest_match, CorpusError, NameMatch, NameMatcher, NameTables, NicknameTable, PhoneticIndex,
    PhoneticIndexBuilder,
};

fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn index_lookup_ignores_case_and_whitespace() {
    let index = PhoneticIndex::from_names(["Smith", "smyth", "Jones"]);
    for query in ["smith", "SMITH", "  Smith\t"] {
        assert_eq!(index.lookup(query), index.lookup("smith"), "{query:?}");
    }
    assert!(index.lookup("smith").contains("smyth"));
}

#[test]
fn every_indexed_name_finds_itself() {
    let names = ["anna", "hannah", "john", "jon", "geoffrey", "jeffrey", "mcdonald"];
    let mut builder = PhoneticIndexBuilder::new();
    builder.extend(names);
    let index = builder.build();
    for name in names {
        assert!(index.lookup(name).contains(name), "{name}");
        assert!(index.contains(name));
    }
}

#[test]
fn non_alphabetic_names_never_match() {
    let index = PhoneticIndex::from_names(["anna", "o'brien", "1234"]);
    assert!(index.lookup("").is_empty());
    assert!(index.lookup("---").is_empty());
    assert!(!index.contains("42"));
}

#[test]
fn classify_prefers_exact_over_nickname_over_phonetic() {
    let mut nicknames = NicknameTable::new();
    nicknames.add("robert", ["bob", "rob"]);
    // "mary" is both a corpus name and a listed nickname of "maria".
    nicknames.add("maria", ["mary"]);
    let matcher = NameMatcher::new(["robert", "maria", "mary", "smith"], &nicknames);

    assert_eq!(matcher.classify("Mary"), NameMatch::Exact("mary".into()));
    assert_eq!(matcher.classify("BOB"), NameMatch::Nickname("robert".into()));
    assert_eq!(matcher.classify("Smyth"), NameMatch::Phonetic("smith".into()));
    assert_eq!(matcher.classify("xq"), NameMatch::Unknown);
}

#[test]
fn closest_match_is_deterministic() {
    let candidates = vec!["jon", "joan", "john"];
    let mut reversed = candidates.clone();
    reversed.reverse();
    assert_eq!(closest_match("jhon", candidates), closest_match("jhon", reversed));
    assert_eq!(closest_match("john", ["jon", "john"]), Some("john"));
}

#[test]
fn corpora_load_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let synonyms = write_file(
        &dir,
        "given_names.tsv",
        "# name\tgender\tvariants\ncatherine\tF\tkatherine,kathryn\njohn\tM\tjon\n",
    );
    let nicknames = write_file(&dir, "nicknames.csv", "robert,bob,rob\nelizabeth,liz,beth\n");
    let surnames = write_file(&dir, "surnames.csv", "rank,name,count\n1,SMITH,2442977\n2,JOHNSON,1932812\n");
    let first_names = write_file(&dir, "first_names.txt", "Robert\nCatherine\n\nJohn\n");

    let variants = load_given_name_synonyms(&synonyms).unwrap();
    assert!(variants.get("kathryn").unwrap().contains("catherine"));
    assert!(variants.get("Katherine").unwrap().contains("kathryn"));

    let nicknames = load_nicknames(&nicknames).unwrap();
    assert!(nicknames.nicknames_of("robert").unwrap().contains("bob"));
    assert!(nicknames.canonicals_of("beth").unwrap().contains("elizabeth"));

    let surnames = load_surnames(&surnames).unwrap();
    assert_eq!(surnames, vec!["smith".to_string(), "johnson".to_string()]);

    let first_names = load_name_list(&first_names).unwrap();
    assert_eq!(first_names, vec!["robert", "catherine", "john"]);

    let tables = NameTables::from_corpora(&first_names, &surnames, variants, nicknames);
    assert_eq!(tables.first_names.len(), 3);
    assert!(tables.last_names.is_member("Smith"));
}

#[test]
fn corpus_errors_are_typed() {
    let dir = tempfile::tempdir().unwrap();
    let no_name = write_file(&dir, "surnames.csv", "rank,surname\n1,smith\n");
    assert!(matches!(load_surnames(&no_name), Err(CorpusError::MissingColumn { .. })));

    let short = write_file(&dir, "given.tsv", "catherine\tF\n");
    assert!(matches!(
        load_given_name_synonyms(&short),
        Err(CorpusError::Malformed { line: 1, .. })
    ));

    let missing = dir.path().join("does-not-exist.txt");
    assert!(matches!(load_name_list(&missing), Err(CorpusError::Io(_))));
}
