use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::FetchConfig;
use crate::constants::fetch::FETCH_PANICKED_REASON;
use crate::data::{CountryDetail, CountrySummary};
use crate::errors::PairsError;
use crate::source::CountrySource;

/// Concurrent, all-or-nothing detail fetcher.
///
/// One detail read is issued per sampled country on a scoped thread, at most
/// `max_in_flight` at a time. Every spawned read is joined before returning;
/// if any read failed, the first failure in sample order is returned and no
/// details are handed on.
#[derive(Clone, Debug)]
pub struct DetailFetcher {
    max_in_flight: usize,
}

impl DetailFetcher {
    /// Create a fetcher running at most `max_in_flight` reads at once (minimum 1).
    pub fn new(max_in_flight: usize) -> Self {
        Self {
            max_in_flight: max_in_flight.max(1),
        }
    }

    /// Create a fetcher from fetch configuration.
    pub fn from_config(config: &FetchConfig) -> Self {
        Self::new(config.max_in_flight)
    }

    /// Fetch the detail record for every country in `sample`, in sample order.
    pub fn fetch_all<S>(
        &self,
        source: &S,
        sample: &[CountrySummary],
    ) -> Result<Vec<CountryDetail>, PairsError>
    where
        S: CountrySource + ?Sized,
    {
        let started = Instant::now();
        let mut results: Vec<Option<(Result<CountryDetail, PairsError>, Duration)>> =
            Vec::with_capacity(sample.len());
        results.resize_with(sample.len(), || None);

        for (wave_idx, wave) in sample.chunks(self.max_in_flight).enumerate() {
            let offset = wave_idx * self.max_in_flight;
            thread::scope(|scope| {
                let mut handles = Vec::with_capacity(wave.len());
                for (idx, country) in wave.iter().enumerate() {
                    handles.push((
                        offset + idx,
                        scope.spawn(move || {
                            let start = Instant::now();
                            let result = source.fetch_detail(&country.locator);
                            (result, start.elapsed())
                        }),
                    ));
                }
                for (idx, handle) in handles {
                    let country = &sample[idx];
                    let result = match handle.join() {
                        Ok((result, elapsed)) => {
                            debug!(
                                source_id = %source.id(),
                                country = %country.name,
                                ok = result.is_ok(),
                                fetch_ms = elapsed.as_millis(),
                                "detail fetch completed"
                            );
                            (result, elapsed)
                        }
                        Err(_) => (
                            Err(PairsError::FetchFailure {
                                source_id: source.id().to_string(),
                                locator: country.locator.clone(),
                                reason: FETCH_PANICKED_REASON.into(),
                            }),
                            Duration::from_secs(0),
                        ),
                    };
                    results[idx] = Some(result);
                }
            });
        }

        let mut details = Vec::with_capacity(sample.len());
        let mut failures = 0usize;
        let mut first_failure = None;
        for (idx, slot) in results.into_iter().enumerate() {
            let Some((result, _)) = slot else {
                // Every index is covered by exactly one wave.
                continue;
            };
            match result {
                Ok(detail) => details.push(detail),
                Err(err) => {
                    failures += 1;
                    warn!(
                        source_id = %source.id(),
                        country = %sample[idx].name,
                        error = %err,
                        "detail fetch failed"
                    );
                    if first_failure.is_none() {
                        first_failure = Some(err);
                    }
                }
            }
        }
        if let Some(err) = first_failure {
            debug!(
                failures,
                requested = sample.len(),
                "discarding partial detail results"
            );
            return Err(err);
        }
        debug!(
            source_id = %source.id(),
            fetched = details.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "all detail fetches completed"
        );
        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemorySource;
    use crate::types::Locator;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Source that tracks peak concurrency and fails or panics on chosen locators.
    struct ProbeSource {
        inner: InMemorySource,
        active: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
        fail_on: Option<&'static str>,
        panic_on: Option<&'static str>,
    }

    impl ProbeSource {
        fn new(details: Vec<CountryDetail>) -> Self {
            Self {
                inner: InMemorySource::from_details("probe", details),
                active: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
                fail_on: None,
                panic_on: None,
            }
        }
    }

    impl CountrySource for ProbeSource {
        fn id(&self) -> &str {
            self.inner.id()
        }

        fn list_countries(&self) -> Result<Arc<Vec<CountrySummary>>, PairsError> {
            self.inner.list_countries()
        }

        fn fetch_detail(&self, locator: &Locator) -> Result<CountryDetail, PairsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(20));
            self.active.fetch_sub(1, Ordering::SeqCst);
            if self.panic_on == Some(locator.as_str()) {
                panic!("probe panic");
            }
            if self.fail_on == Some(locator.as_str()) {
                return Err(PairsError::FetchFailure {
                    source_id: "probe".into(),
                    locator: locator.clone(),
                    reason: "scripted failure".into(),
                });
            }
            self.inner.fetch_detail(locator)
        }
    }

    fn details(count: usize) -> Vec<CountryDetail> {
        (0..count)
            .map(|idx| CountryDetail::new(format!("c{idx}"), Vec::<String>::new()))
            .collect()
    }

    #[test]
    fn returns_details_in_sample_order() {
        let source = ProbeSource::new(details(6));
        let mut sample: Vec<CountrySummary> = source.list_countries().unwrap().to_vec();
        sample.reverse();
        let fetched = DetailFetcher::new(4).fetch_all(&source, &sample).unwrap();
        let names: Vec<&str> = fetched.iter().map(|detail| detail.name.as_str()).collect();
        assert_eq!(names, vec!["c5", "c4", "c3", "c2", "c1", "c0"]);
    }

    #[test]
    fn concurrency_is_bounded_by_max_in_flight() {
        let source = ProbeSource::new(details(9));
        let sample = source.list_countries().unwrap();
        DetailFetcher::new(3).fetch_all(&source, &sample).unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 9);
        assert!(source.peak.load(Ordering::SeqCst) <= 3);
    }

    #[test]
    fn one_failure_fails_the_whole_fetch_after_joining_everything() {
        let mut source = ProbeSource::new(details(5));
        source.fail_on = Some("c2");
        let sample = source.list_countries().unwrap();
        let err = DetailFetcher::new(16)
            .fetch_all(&source, &sample)
            .unwrap_err();
        assert_eq!(source.calls.load(Ordering::SeqCst), 5);
        match err {
            PairsError::FetchFailure { locator, .. } => assert_eq!(locator, "c2"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn panicking_fetch_is_reported_as_fetch_failure() {
        let mut source = ProbeSource::new(details(3));
        source.panic_on = Some("c1");
        let sample = source.list_countries().unwrap();
        let err = DetailFetcher::new(2)
            .fetch_all(&source, &sample)
            .unwrap_err();
        match err {
            PairsError::FetchFailure { reason, .. } => {
                assert_eq!(reason, FETCH_PANICKED_REASON)
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_sample_fetches_nothing() {
        let source = ProbeSource::new(details(2));
        let fetched = DetailFetcher::new(1).fetch_all(&source, &[]).unwrap();
        assert!(fetched.is_empty());
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }
}
