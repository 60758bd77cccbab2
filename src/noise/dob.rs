//! Date-of-birth noiser.

use chrono::{Datelike, NaiveDate};
use rand::{Rng, RngCore};

use super::{draw, Noiser};
use crate::config::DobNoiseConfig;
use crate::error::ValidationError;

/// Placeholder written when the date is "not set": 1970-01-01.
#[must_use]
pub fn unknown_date_of_birth() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

/// Corrupts a date of birth with one draw over the cumulative chain
/// not-set, day/month swap, day-digit swap, year shift.
#[derive(Debug, Clone)]
pub struct DobNoiser {
    config: DobNoiseConfig,
}

impl DobNoiser {
    /// # Errors
    ///
    /// Returns a `ValidationError` if the chain is invalid.
    pub fn new(config: DobNoiseConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Swaps the digits of the day ("12" → "21"), or moves the day forward
    /// by one when swapping would not give a valid day.
    fn swap_day_digits(date: NaiveDate, rng: &mut dyn RngCore) -> NaiveDate {
        let day = date.day();
        let (tens, units) = (day / 10, day % 10);
        let new_day = if units <= 2 {
            units * 10 + tens
        } else if (3..=26).contains(&day) {
            // A coin is drawn, but either side moves the day forward.
            let _coin: bool = rng.gen();
            day + 1
        } else {
            day
        };
        date.with_day(new_day).unwrap_or(date)
    }

    fn shift_year(date: NaiveDate, rng: &mut dyn RngCore) -> NaiveDate {
        let year = if rng.gen::<bool>() {
            date.year() + 1
        } else {
            date.year() - 1
        };
        NaiveDate::from_ymd_opt(year, date.month(), date.day())
            .or_else(|| NaiveDate::from_ymd_opt(year, date.month(), 28))
            .unwrap_or(date)
    }
}

impl Noiser<NaiveDate> for DobNoiser {
    type Output = NaiveDate;

    fn noise(&self, value: &NaiveDate, rng: &mut dyn RngCore) -> NaiveDate {
        let c = &self.config;
        let date = *value;
        let not_set = c.p_not_set;
        let swap_month_day = not_set + c.p_swap_month_day;
        let swap_days = swap_month_day + c.p_swap_days;
        let off_year = swap_days + c.p_off_year;

        let u = draw(rng);
        if u < not_set {
            log::trace!("dob {date}: not set");
            unknown_date_of_birth()
        } else if u < swap_month_day && date.day() <= 12 {
            NaiveDate::from_ymd_opt(date.year(), date.day(), date.month()).unwrap_or(date)
        } else if u < swap_days {
            Self::swap_day_digits(date, rng)
        } else if u < off_year {
            Self::shift_year(date, rng)
        } else {
            date
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn only(field: &str) -> DobNoiser {
        let mut config = DobNoiseConfig {
            p_not_set: 0.0,
            p_swap_month_day: 0.0,
            p_swap_days: 0.0,
            p_off_year: 0.0,
        };
        match field {
            "not_set" => config.p_not_set = 1.0,
            "swap_month_day" => config.p_swap_month_day = 1.0,
            "swap_days" => config.p_swap_days = 1.0,
            "off_year" => config.p_off_year = 1.0,
            _ => {}
        }
        DobNoiser::new(config).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_not_set() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(only("not_set").noise(&ymd(1990, 5, 17), &mut rng), ymd(1970, 1, 1));
    }

    #[test]
    fn test_swap_month_day_when_day_at_most_twelve() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(only("swap_month_day").noise(&ymd(1990, 3, 8), &mut rng), ymd(1990, 8, 3));
    }

    #[test]
    fn test_swap_month_day_never_fires_for_day_fifteen() {
        let noiser = only("swap_month_day");
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            // The draw falls through to later branches, which never touch the month.
            let out = noiser.noise(&ymd(1990, 3, 15), &mut rng);
            assert_eq!(out.month(), 3, "{out}");
            assert_eq!(out.year(), 1990);
        }
    }

    #[test]
    fn test_swap_day_digits() {
        let noiser = only("swap_days");
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(noiser.noise(&ymd(1990, 3, 12), &mut rng), ymd(1990, 3, 21));
        assert_eq!(noiser.noise(&ymd(1990, 3, 20), &mut rng), ymd(1990, 3, 2));
        assert_eq!(noiser.noise(&ymd(1990, 3, 1), &mut rng), ymd(1990, 3, 10));
        assert_eq!(noiser.noise(&ymd(1990, 3, 15), &mut rng), ymd(1990, 3, 16));
        assert_eq!(noiser.noise(&ymd(1990, 3, 29), &mut rng), ymd(1990, 3, 29));
    }

    #[test]
    fn test_swap_day_digits_in_february() {
        let mut rng = StdRng::seed_from_u64(1);
        // Feb 2 becomes Feb 20; swapping the digits of 22 changes nothing.
        assert_eq!(only("swap_days").noise(&ymd(1990, 2, 2), &mut rng), ymd(1990, 2, 20));
        assert_eq!(only("swap_days").noise(&ymd(1990, 2, 22), &mut rng), ymd(1990, 2, 22));
    }

    #[test]
    fn test_off_year_moves_one_year() {
        let noiser = only("off_year");
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            let out = noiser.noise(&ymd(1990, 6, 30), &mut rng);
            assert!(out == ymd(1991, 6, 30) || out == ymd(1989, 6, 30), "{out}");
        }
    }

    #[test]
    fn test_off_year_leap_day_clamps() {
        let noiser = only("off_year");
        let mut rng = StdRng::seed_from_u64(1);
        let out = noiser.noise(&ymd(2000, 2, 29), &mut rng);
        assert!(out == ymd(2001, 2, 28) || out == ymd(1999, 2, 28), "{out}");
    }

    #[test]
    fn test_quiet_is_identity() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(only("none").noise(&ymd(1990, 6, 30), &mut rng), ymd(1990, 6, 30));
    }
}
