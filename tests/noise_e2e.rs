use chrono::{Datelike, NaiveDate};
use idnoise::{
    AddressNoiseConfig, AddressNoiser, DobNoiseConfig, DobNoiser, EmailNoiseConfig, EmailNoiser,
    KeyboardConfig, NameTables, NameVariantMap, NicknameTable, NoiseConfig, Noiser, Person,
    PersonId, PersonNoiser, PhoneNoiseConfig, PhoneNoiser, Sex,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

const ADDRESS: &str = "123 N Main St Apt 4B, Springfield, IL 62704";

fn golden() -> Person {
    Person {
        unique_id: PersonId::new(),
        first_name: "Robert".to_string(),
        middle_name: Some("James".to_string()),
        last_name: "Smith".to_string(),
        prefix: Some("Mr.".to_string()),
        suffix: None,
        date_of_birth: NaiveDate::from_ymd_opt(1985, 8, 3).unwrap(),
        raw_address: ADDRESS.to_string(),
        social_security_number: "123-45-6789".to_string(),
        sex: Sex::Male,
        phone: "555-123-4567".to_string(),
        personal_email: "rob.smith@gmail.com".to_string(),
        corporate_email: Some("rsmith@acme-corp.com".to_string()),
    }
}

fn tables() -> NameTables {
    let mut nicknames = NicknameTable::new();
    nicknames.add("robert", ["bob", "rob", "bobby"]);
    nicknames.add("james", ["jim", "jimmy"]);
    NameTables::from_corpora(
        ["robert", "roberta", "james", "mary", "catherine", "katherine"],
        ["smith", "smyth", "schmidt", "jones"],
        NameVariantMap::from_rows([("catherine", vec!["katherine", "kathryn"])]),
        nicknames,
    )
}

fn quiet_address() -> AddressNoiseConfig {
    AddressNoiseConfig {
        p_missing: 0.0,
        p_number_typo: 0.0,
        p_toggle: 0.0,
        p_street_typo: 0.0,
        p_po_box_typo: 0.0,
        p_town_typo: 0.0,
        p_postcode_typo: 0.0,
        ..AddressNoiseConfig::default()
    }
}

fn dob_only(p_swap_month_day: f64, p_swap_days: f64) -> DobNoiser {
    DobNoiser::new(DobNoiseConfig {
        p_not_set: 0.0,
        p_swap_month_day,
        p_swap_days,
        p_off_year: 0.0,
    })
    .unwrap()
}

#[test]
fn person_noise_is_reproducible_under_fixed_seed() {
    let noiser = PersonNoiser::new(&NoiseConfig::default(), tables()).unwrap();
    let person = golden();

    let run = |seed| {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..25).map(|_| noiser.noise(&person, &mut rng)).collect::<Vec<_>>()
    };
    assert_eq!(run(11), run(11));
    assert_ne!(run(11), run(12));
}

#[test]
fn every_duplicate_links_to_its_golden_record() {
    let noiser = PersonNoiser::new(&NoiseConfig::default(), tables()).unwrap();
    let person = golden();
    let mut rng = StdRng::seed_from_u64(77);

    let mut ids = std::collections::HashSet::new();
    for _ in 0..200 {
        let dup = noiser.noise(&person, &mut rng);
        assert!(dup.is_duplicate_of(&person));
        assert!(ids.insert(dup.unique_id), "duplicate ids must be fresh");
        assert!(!dup.first_name.is_empty());
        assert!(!dup.last_name.is_empty());
    }
}

#[test]
fn golden_record_is_never_mutated() {
    let noiser = PersonNoiser::new(&NoiseConfig::default(), tables()).unwrap();
    let person = golden();
    let before = person.clone();
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..50 {
        let _ = noiser.noise(&person, &mut rng);
    }
    assert_eq!(person, before);
}

#[test]
fn forced_nickname_and_uppercase_surname() {
    let mut config = NoiseConfig::quiet();
    config.first_name.p_nickname = 1.0;
    config.last_name.p_uppercase = 1.0;
    let noiser = PersonNoiser::new(&config, tables()).unwrap();
    let person = golden();
    let mut rng = StdRng::seed_from_u64(5);

    for _ in 0..20 {
        let dup = noiser.noise(&person, &mut rng);
        assert!(["Bob", "Rob", "Bobby"].contains(&dup.first_name.as_str()), "{}", dup.first_name);
        assert_eq!(dup.middle_name.as_deref(), Some("James"));
        assert_eq!(dup.last_name, "SMITH");
    }
}

#[test]
fn address_quiet_config_reassembles_canonical_line() {
    let noiser = AddressNoiser::new(quiet_address(), KeyboardConfig::default()).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    assert_eq!(
        noiser.noise(ADDRESS, &mut rng),
        "123 Main Street Apartment 4B North Springfield, IL 62704"
    );
}

#[test]
fn address_drops_stop_at_budget() {
    let config = AddressNoiseConfig {
        p_missing: 1.0,
        ..quiet_address()
    };
    let noiser = AddressNoiser::new(config, KeyboardConfig::default()).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    // House number and suffix are dropped; the remaining drops are refused.
    assert_eq!(
        noiser.noise(ADDRESS, &mut rng),
        "Main Apartment 4B North Springfield, IL 62704"
    );
}

#[test]
fn address_noise_on_unparseable_input_is_empty() {
    let noiser = AddressNoiser::new(AddressNoiseConfig::default(), KeyboardConfig::default()).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    assert_eq!(noiser.noise("   ", &mut rng), "");
}

#[test]
fn email_extension_always_replaced_when_forced() {
    let noiser = EmailNoiser::new(
        EmailNoiseConfig {
            p_localpart_typo: 0.0,
            p_wrong_separator: 0.0,
            p_extension: 1.0,
            p_domain_separator: 0.0,
        },
        KeyboardConfig::default(),
    )
    .unwrap();
    let mut rng = StdRng::seed_from_u64(9);
    for _ in 0..40 {
        let out = noiser.noise("jane.doe@example.org", &mut rng);
        let (local, domain) = out.split_once('@').unwrap();
        assert_eq!(local, "jane.doe");
        let (base, ext) = domain.rsplit_once('.').unwrap();
        assert_eq!(base, "example");
        assert!(["com", "net", "org", "co"].contains(&ext), "{out}");
    }
}

#[test]
fn phone_double_swap_keeps_digits_and_endpoints() {
    let noiser = PhoneNoiser::new(PhoneNoiseConfig {
        p_swap_first: 1.0,
        p_swap_second: 1.0,
    })
    .unwrap();
    let mut rng = StdRng::seed_from_u64(31);
    let original = "(312) 555-0198";
    let mut expected: Vec<char> = original.chars().filter(char::is_ascii_digit).collect();
    expected.sort_unstable();

    for _ in 0..100 {
        let out = noiser.noise(original, &mut rng);
        let mut digits: Vec<char> = out.chars().filter(char::is_ascii_digit).collect();
        digits.sort_unstable();
        assert_eq!(digits, expected);
        assert!(out.starts_with("(3") && out.ends_with('8'), "{out}");
        assert_eq!(out.len(), original.len());
    }
}

#[test]
fn dob_day_month_swap_only_for_small_days() {
    let swap = dob_only(1.0, 0.0);
    let mut rng = StdRng::seed_from_u64(2);

    let early = NaiveDate::from_ymd_opt(1990, 3, 8).unwrap();
    assert_eq!(swap.noise(&early, &mut rng), NaiveDate::from_ymd_opt(1990, 8, 3).unwrap());

    // Day 15 cannot be a month, so the draw falls through to the day branch.
    let late = NaiveDate::from_ymd_opt(1990, 3, 15).unwrap();
    let out = swap.noise(&late, &mut rng);
    assert_eq!((out.year(), out.month(), out.day()), (1990, 3, 16));
}

#[test]
fn dob_day_digit_swap() {
    let swap = dob_only(0.0, 1.0);
    let mut rng = StdRng::seed_from_u64(2);

    let twelve = NaiveDate::from_ymd_opt(2001, 6, 12).unwrap();
    assert_eq!(swap.noise(&twelve, &mut rng), NaiveDate::from_ymd_opt(2001, 6, 21).unwrap());

    let eighth = NaiveDate::from_ymd_opt(2001, 6, 8).unwrap();
    assert_eq!(swap.noise(&eighth, &mut rng), NaiveDate::from_ymd_opt(2001, 6, 9).unwrap());

    let late = NaiveDate::from_ymd_opt(2001, 1, 29).unwrap();
    assert_eq!(swap.noise(&late, &mut rng), late);
}

#[test]
fn config_loads_from_json_with_defaults() {
    let config = NoiseConfig::from_json_str(r#"{"address": {"max_missing": 1}, "phone": {"p_swap_first": 0.5}}"#)
        .unwrap();
    assert_eq!(config.address.max_missing, 1);
    assert!((config.phone.p_swap_first - 0.5).abs() < f64::EPSILON);
    assert_eq!(config.dob, DobNoiseConfig::default());

    let err = NoiseConfig::from_json_str(r#"{"dob": {"p_not_set": 2.0}}"#).unwrap_err();
    assert!(err.is_validation());

    let err = NoiseConfig::from_json_str("{not json").unwrap_err();
    assert!(!err.is_validation());
}

#[test]
fn config_round_trips_through_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("noise.json");
    let mut config = NoiseConfig::default();
    config.missing.p_missing_ssn = 0.9;
    std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

    let loaded = NoiseConfig::from_json_file(&path).unwrap();
    assert_eq!(loaded, config);
}
