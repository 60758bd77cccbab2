//! Parallel batch driver.
//!
//! Golden records are fanned out to a small pool of named worker threads
//! over a bounded channel. Every record draws from its own random stream,
//! seeded from the batch seed and the record's position, so the output is
//! identical for any worker count and any scheduling.
//!
//! A record whose noising panics is reported in [`BatchOutput::failures`];
//! the remaining records are still processed.

use std::any::Any;
use std::f64::consts::PI;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

use blake3::Hasher;
use crossbeam_channel::{bounded, unbounded};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{NoiseError, NoiseResult, ValidationError};
use crate::noise::{Noiser, PersonNoiser};
use crate::person::{NoisedPerson, Person, PersonId};

/// Distribution of the number of duplicates produced per golden record.
///
/// Counts are drawn from a normal distribution, rounded, then clamped to
/// `[min, max]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplicateCountConfig {
    pub mean: f64,
    pub std_dev: f64,
    pub min: usize,
    pub max: usize,
}

impl Default for DuplicateCountConfig {
    fn default() -> Self {
        Self {
            mean: 10.0,
            std_dev: 5.0,
            min: 5,
            max: 50,
        }
    }
}

impl DuplicateCountConfig {
    /// Always produces exactly `count` duplicates.
    #[must_use]
    pub const fn fixed(count: usize) -> Self {
        Self {
            mean: 0.0,
            std_dev: 0.0,
            min: count,
            max: count,
        }
    }

    /// # Errors
    ///
    /// Returns `ValidationError::InvalidDuplicateBounds` if `min > max`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.min > self.max {
            return Err(ValidationError::InvalidDuplicateBounds {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Batch driver configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of worker threads.
    pub workers: usize,
    /// Maximum queued records.
    pub queue_capacity: usize,
    pub duplicates: DuplicateCountConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: thread::available_parallelism().map_or(4, std::num::NonZeroUsize::get),
            queue_capacity: 1024,
            duplicates: DuplicateCountConfig::default(),
        }
    }
}

impl BatchConfig {
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidWorkerCount` for zero workers and
    /// `ValidationError::InvalidDuplicateBounds` for inverted duplicate bounds.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.workers == 0 {
            return Err(ValidationError::InvalidWorkerCount);
        }
        self.duplicates.validate()
    }
}

/// A golden record that could not be noised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    /// Position of the record in the input slice.
    pub index: usize,
    pub origin_id: PersonId,
    /// Panic message.
    pub message: String,
}

/// Result of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchOutput {
    /// Duplicates grouped by golden record, in input order.
    pub duplicates: Vec<NoisedPerson>,
    pub failures: Vec<BatchFailure>,
}

impl BatchOutput {
    /// True if every record was noised.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Duplicates derived from one golden record.
    pub fn duplicates_of(&self, origin_id: PersonId) -> impl Iterator<Item = &NoisedPerson> {
        self.duplicates
            .iter()
            .filter(move |dup| dup.origin_id == origin_id)
    }
}

/// Seed of the random stream owned by record `index`.
///
/// Derived with BLAKE3 over the little-endian batch seed followed by the
/// little-endian record index.
#[must_use]
pub fn record_seed(seed: u64, index: usize) -> u64 {
    let mut h = Hasher::new();
    h.update(&seed.to_le_bytes());
    h.update(&(index as u64).to_le_bytes());
    let hash = h.finalize();

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

/// Standard normal sample (Box-Muller).
fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1 = rng.gen::<f64>().clamp(f64::MIN_POSITIVE, 1.0);
    let u2 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "record noising panicked".to_string()
    }
}

type RecordOutcome = Result<Vec<NoisedPerson>, String>;

/// Noises a slice of golden records into duplicates.
///
/// # Examples
///
/// ```
/// use idnoise::{BatchConfig, BatchNoiser, DuplicateCountConfig, NameTables, NoiseConfig, PersonNoiser};
///
/// let noiser = PersonNoiser::new(&NoiseConfig::default(), NameTables::default())?;
/// let config = BatchConfig {
///     workers: 2,
///     duplicates: DuplicateCountConfig::fixed(3),
///     ..BatchConfig::default()
/// };
/// let batch = BatchNoiser::new(noiser, config)?;
/// let output = batch.run(&[], 7)?;
/// assert!(output.duplicates.is_empty() && output.is_complete());
/// # Ok::<(), idnoise::NoiseError>(())
/// ```
#[derive(Debug, Clone)]
pub struct BatchNoiser {
    noiser: PersonNoiser,
    config: BatchConfig,
}

impl BatchNoiser {
    /// # Errors
    ///
    /// Returns a `ValidationError` if `config` is invalid.
    pub fn new(noiser: PersonNoiser, config: BatchConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self { noiser, config })
    }

    /// Returns the batch configuration.
    #[must_use]
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Draws a duplicate count from the configured clamped normal.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn duplicate_count<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let d = &self.config.duplicates;
        if d.min == d.max {
            return d.min;
        }
        let sample = d.std_dev.mul_add(standard_normal(rng), d.mean).round();
        if !sample.is_finite() || sample <= d.min as f64 {
            return d.min;
        }
        if sample >= d.max as f64 {
            return d.max;
        }
        sample as usize
    }

    /// Noises one record on its own stream. Identical for a given
    /// `(person, index, seed)` regardless of which thread runs it.
    #[must_use]
    pub fn noise_record(&self, person: &Person, index: usize, seed: u64) -> Vec<NoisedPerson> {
        let mut rng = StdRng::seed_from_u64(record_seed(seed, index));
        let count = self.duplicate_count(&mut rng);
        (0..count)
            .map(|_| self.noiser.noise(person, &mut rng))
            .collect()
    }

    fn noise_isolated(&self, person: &Person, index: usize, seed: u64) -> RecordOutcome {
        panic::catch_unwind(AssertUnwindSafe(|| self.noise_record(person, index, seed)))
            .map_err(|payload| panic_message(payload.as_ref()))
    }

    /// Noises every record of `people` using a pool of worker threads.
    ///
    /// # Errors
    ///
    /// Returns `NoiseError::Io` if a worker thread cannot be spawned and
    /// `NoiseError::Internal` if the workers exit before the queue drains.
    pub fn run(&self, people: &[Person], seed: u64) -> NoiseResult<BatchOutput> {
        let workers = self.config.workers.clamp(1, people.len().max(1));
        let queue_capacity = self.config.queue_capacity.max(1);

        let slots = thread::scope(|scope| -> NoiseResult<Vec<Option<RecordOutcome>>> {
            let (job_tx, job_rx) = bounded::<usize>(queue_capacity);
            let (result_tx, result_rx) = unbounded::<(usize, RecordOutcome)>();

            for idx in 0..workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                thread::Builder::new()
                    .name(format!("idnoise-batch-{idx}"))
                    .spawn_scoped(scope, move || {
                        for index in job_rx {
                            let outcome = self.noise_isolated(&people[index], index, seed);
                            if result_tx.send((index, outcome)).is_err() {
                                break;
                            }
                        }
                    })?;
            }
            drop(job_rx);
            drop(result_tx);

            for index in 0..people.len() {
                job_tx
                    .send(index)
                    .map_err(|_| NoiseError::internal("batch workers exited before the queue drained"))?;
            }
            // Close the queue: workers drain it then exit.
            drop(job_tx);

            let mut slots: Vec<Option<RecordOutcome>> = (0..people.len()).map(|_| None).collect();
            for (index, outcome) in result_rx {
                slots[index] = Some(outcome);
            }
            Ok(slots)
        })?;

        let mut output = BatchOutput::default();
        for (index, slot) in slots.into_iter().enumerate() {
            let origin_id = people[index].unique_id;
            match slot {
                Some(Ok(duplicates)) => output.duplicates.extend(duplicates),
                Some(Err(message)) => {
                    log::warn!("batch: record {index} ({origin_id}) panicked: {message}");
                    output.failures.push(BatchFailure {
                        index,
                        origin_id,
                        message,
                    });
                }
                None => {
                    log::error!("batch: record {index} ({origin_id}) produced no result");
                    output.failures.push(BatchFailure {
                        index,
                        origin_id,
                        message: "no result".to_string(),
                    });
                }
            }
        }

        log::debug!(
            "batch: {} records, {} duplicates, {} failures, {workers} workers",
            people.len(),
            output.duplicates.len(),
            output.failures.len()
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use crate::address::{AddressTagger, RuleTagger, TaggedToken, TaggerError};
    use crate::config::NoiseConfig;
    use crate::noise::NameTables;
    use crate::person::tests::sample_person;

    fn noiser() -> PersonNoiser {
        PersonNoiser::new(&NoiseConfig::default(), NameTables::default()).unwrap()
    }

    fn people(n: usize) -> Vec<Person> {
        (0..n)
            .map(|i| {
                let mut p = sample_person();
                p.unique_id = PersonId::new();
                p.first_name = format!("Robert{i}");
                p
            })
            .collect()
    }

    fn batch(workers: usize, duplicates: DuplicateCountConfig) -> BatchNoiser {
        BatchNoiser::new(
            noiser(),
            BatchConfig {
                workers,
                queue_capacity: 4,
                duplicates,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_record_seed_depends_on_both_inputs() {
        assert_eq!(record_seed(1, 2), record_seed(1, 2));
        assert_ne!(record_seed(1, 2), record_seed(1, 3));
        assert_ne!(record_seed(1, 2), record_seed(2, 2));
    }

    #[test]
    fn test_duplicate_count_within_bounds() {
        let b = batch(1, DuplicateCountConfig::default());
        let mut rng = StdRng::seed_from_u64(4);
        let counts: Vec<usize> = (0..2000).map(|_| b.duplicate_count(&mut rng)).collect();
        assert!(counts.iter().all(|c| (5..=50).contains(c)));
        assert!(counts.contains(&5));
        let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
        assert!((9.0..13.0).contains(&mean), "mean {mean}");
    }

    #[test]
    fn test_fixed_duplicate_count() {
        let b = batch(1, DuplicateCountConfig::fixed(3));
        let mut rng = StdRng::seed_from_u64(4);
        assert_eq!(b.duplicate_count(&mut rng), 3);
    }

    #[test]
    fn test_output_independent_of_worker_count() {
        let input = people(12);
        let one = batch(1, DuplicateCountConfig::default()).run(&input, 42).unwrap();
        let four = batch(4, DuplicateCountConfig::default()).run(&input, 42).unwrap();
        assert_eq!(one, four);
        assert!(one.is_complete());
    }

    #[test]
    fn test_output_in_record_order() {
        let input = people(9);
        let output = batch(3, DuplicateCountConfig::fixed(2)).run(&input, 1).unwrap();
        let origins: Vec<PersonId> = output.duplicates.iter().map(|d| d.origin_id).collect();
        let expected: Vec<PersonId> = input
            .iter()
            .flat_map(|p| [p.unique_id, p.unique_id])
            .collect();
        assert_eq!(origins, expected);
        assert_eq!(output.duplicates_of(input[4].unique_id).count(), 2);
    }

    #[test]
    fn test_different_seeds_differ() {
        let input = people(3);
        let b = batch(2, DuplicateCountConfig::fixed(4));
        assert_ne!(b.run(&input, 1).unwrap(), b.run(&input, 2).unwrap());
    }

    struct PanickingTagger;

    impl AddressTagger for PanickingTagger {
        fn tag(&self, raw: &str) -> Result<Vec<TaggedToken>, TaggerError> {
            assert!(!raw.contains("Nowhere"), "cannot tag {raw}");
            RuleTagger.tag(raw)
        }
    }

    #[test]
    fn test_panicking_record_is_reported() {
        let noiser =
            PersonNoiser::with_tagger(&NoiseConfig::default(), NameTables::default(), Arc::new(PanickingTagger))
                .unwrap();
        let config = BatchConfig {
            workers: 2,
            queue_capacity: 2,
            duplicates: DuplicateCountConfig::fixed(2),
        };
        let b = BatchNoiser::new(noiser, config).unwrap();
        let mut input = people(4);
        input[1].raw_address = "1 Nowhere Rd, Springfield, IL 62704".to_string();

        let output = b.run(&input, 3).unwrap();
        assert_eq!(output.failures.len(), 1);
        assert_eq!(output.failures[0].index, 1);
        assert_eq!(output.failures[0].origin_id, input[1].unique_id);
        assert!(output.failures[0].message.contains("Nowhere"));
        assert_eq!(output.duplicates.len(), 6);
        assert_eq!(output.duplicates_of(input[1].unique_id).count(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let zero_workers = BatchConfig {
            workers: 0,
            ..BatchConfig::default()
        };
        assert!(matches!(
            BatchNoiser::new(noiser(), zero_workers),
            Err(ValidationError::InvalidWorkerCount)
        ));

        let inverted = BatchConfig {
            duplicates: DuplicateCountConfig {
                min: 9,
                max: 3,
                ..DuplicateCountConfig::default()
            },
            ..BatchConfig::default()
        };
        assert!(matches!(
            BatchNoiser::new(noiser(), inverted),
            Err(ValidationError::InvalidDuplicateBounds { min: 9, max: 3 })
        ));
    }

    #[test]
    fn test_empty_batch() {
        let output = batch(4, DuplicateCountConfig::default()).run(&[], 0).unwrap();
        assert_eq!(output, BatchOutput::default());
    }
}
