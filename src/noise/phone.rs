//! Phone noiser.

use rand::{Rng, RngCore};

use super::{draw, Noiser};
use crate::config::PhoneNoiseConfig;
use crate::error::ValidationError;

/// Swaps adjacent interior digits of a phone number.
///
/// Each of two passes, gated by its own probability, picks an interior digit
/// (neither the first nor the last digit) and swaps it with a neighboring
/// interior digit. Formatting characters never move. Numbers with fewer than
/// four digits are returned unchanged.
#[derive(Debug, Clone)]
pub struct PhoneNoiser {
    config: PhoneNoiseConfig,
}

impl PhoneNoiser {
    /// # Errors
    ///
    /// Returns a `ValidationError` if a probability is out of range.
    pub fn new(config: PhoneNoiseConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self { config })
    }
}

impl Noiser<str> for PhoneNoiser {
    type Output = String;

    fn noise(&self, value: &str, rng: &mut dyn RngCore) -> String {
        let mut chars: Vec<char> = value.chars().collect();
        let digits: Vec<usize> = chars
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_ascii_digit())
            .map(|(idx, _)| idx)
            .collect();
        if digits.len() < 4 {
            return value.to_string();
        }
        let last_interior = digits.len() - 2;

        for p in [self.config.p_swap_first, self.config.p_swap_second] {
            if draw(rng) >= p {
                continue;
            }
            let k = rng.gen_range(1..=last_interior);
            let neighbor = match (k > 1, k < last_interior) {
                (true, true) => {
                    if rng.gen::<bool>() {
                        k - 1
                    } else {
                        k + 1
                    }
                }
                (true, false) => k - 1,
                (false, _) => k + 1,
            };
            chars.swap(digits[k], digits[neighbor]);
        }
        chars.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn noiser(p_swap_first: f64, p_swap_second: f64) -> PhoneNoiser {
        PhoneNoiser::new(PhoneNoiseConfig {
            p_swap_first,
            p_swap_second,
        })
        .unwrap()
    }

    fn sorted_digits(s: &str) -> Vec<char> {
        let mut d: Vec<char> = s.chars().filter(char::is_ascii_digit).collect();
        d.sort_unstable();
        d
    }

    #[test]
    fn test_swaps_keep_format_and_endpoints() {
        let n = noiser(1.0, 1.0);
        let mut rng = StdRng::seed_from_u64(12);
        for _ in 0..200 {
            let out = n.noise("555-123-4567", &mut rng);
            assert_eq!(out.len(), 12);
            assert_eq!(sorted_digits(&out), sorted_digits("555-123-4567"));
            assert_eq!(&out[3..4], "-");
            assert_eq!(&out[7..8], "-");
            assert!(out.starts_with('5') && out.ends_with('7'), "{out}");
        }
    }

    #[test]
    fn test_single_pass_changes_number() {
        let n = noiser(1.0, 0.0);
        let mut rng = StdRng::seed_from_u64(12);
        // All interior digits are distinct from their neighbors here.
        let out = n.noise("(212) 345-6789", &mut rng);
        assert_ne!(out, "(212) 345-6789");
    }

    #[test]
    fn test_short_numbers_untouched() {
        let n = noiser(1.0, 1.0);
        let mut rng = StdRng::seed_from_u64(12);
        assert_eq!(n.noise("911", &mut rng), "911");
        assert_eq!(n.noise("", &mut rng), "");
    }

    #[test]
    fn test_quiet_is_identity() {
        let mut rng = StdRng::seed_from_u64(12);
        assert_eq!(noiser(0.0, 0.0).noise("555-123-4567", &mut rng), "555-123-4567");
    }
}
