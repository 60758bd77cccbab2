//! Field noisers.
//!
//! Every noiser is a pure transformation: it holds its configuration and
//! read-only lookup tables, and draws all randomness from the stream passed
//! to [`Noiser::noise`]. Constructors validate their configuration, so a
//! built noiser never fails at run time.

pub mod address;
pub mod dob;
pub mod email;
pub mod keyboard;
pub mod name;
pub mod person;
pub mod phone;

use std::collections::BTreeSet;

use rand::{Rng, RngCore};

pub use address::{typo_in_short_number, AddressNoiser};
pub use dob::{unknown_date_of_birth, DobNoiser};
pub use email::{wrong_separator, EmailNoiser, COMMON_EXTENSIONS, SEPARATORS};
pub use keyboard::KeyboardAugmenter;
pub use name::{FirstNameNoiser, LastNameNoiser, TypoNoiser, PHONETIC_RULES};
pub use person::{NameTables, PersonNoiser};
pub use phone::PhoneNoiser;

/// Corrupts a value of type `T`.
pub trait Noiser<T: ?Sized> {
    /// Produced value.
    type Output;

    /// Returns a noised copy of `value`; `value` is never modified.
    fn noise(&self, value: &T, rng: &mut dyn RngCore) -> Self::Output;
}

/// Uniform draw in `[0, 1)`.
pub(crate) fn draw(rng: &mut dyn RngCore) -> f64 {
    rng.gen::<f64>()
}

/// Uniformly picks an element of a sorted set.
pub(crate) fn pick<'a>(set: &'a BTreeSet<String>, rng: &mut dyn RngCore) -> Option<&'a str> {
    if set.is_empty() {
        return None;
    }
    let idx = rng.gen_range(0..set.len());
    set.iter().nth(idx).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_pick_is_reproducible() {
        let set: BTreeSet<String> = ["c", "a", "b"].iter().map(|s| s.to_string()).collect();
        let first: Vec<_> = {
            let mut rng = StdRng::seed_from_u64(9);
            (0..8).map(|_| pick(&set, &mut rng).unwrap().to_string()).collect()
        };
        let second: Vec<_> = {
            let mut rng = StdRng::seed_from_u64(9);
            (0..8).map(|_| pick(&set, &mut rng).unwrap().to_string()).collect()
        };
        assert_eq!(first, second);
        assert!(first.iter().all(|s| set.contains(s)));
    }

    #[test]
    fn test_pick_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(pick(&BTreeSet::new(), &mut rng), None);
    }

    #[test]
    fn test_draw_in_unit_interval() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let u = draw(&mut rng);
            assert!((0.0..1.0).contains(&u));
        }
    }
}
