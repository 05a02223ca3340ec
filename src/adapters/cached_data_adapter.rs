//! Time-bounded memoisation of bar fetches.
//!
//! Wraps any [`DataPort`] and serves repeat requests for the same
//! `(symbol, start, end)` from memory until the entry is older than the
//! TTL. Errors are never cached.

use crate::domain::error::BarsignalError;
use crate::domain::ohlcv::BarSeries;
use crate::ports::clock_port::{Clock, SystemClock};
use crate::ports::data_port::DataPort;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

pub const DEFAULT_TTL_SECS: i64 = 3600;

type CacheKey = (String, NaiveDate, NaiveDate);

struct CacheEntry {
    fetched_at: DateTime<Utc>,
    bars: BarSeries,
}

pub struct CachedDataPort<P, C = SystemClock> {
    inner: P,
    clock: C,
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl<P: DataPort> CachedDataPort<P, SystemClock> {
    pub fn new(inner: P) -> Self {
        Self::with_clock(inner, SystemClock, Duration::seconds(DEFAULT_TTL_SECS))
    }
}

impl<P: DataPort, C: Clock> CachedDataPort<P, C> {
    pub fn with_clock(inner: P, clock: C, ttl: Duration) -> Self {
        Self {
            inner,
            clock,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    fn lookup(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<BarSeries> {
        let entries = self.entries.lock().ok()?;
        let entry = entries.get(key)?;
        (now - entry.fetched_at < self.ttl).then(|| entry.bars.clone())
    }
}

impl<P: DataPort, C: Clock> DataPort for CachedDataPort<P, C> {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<BarSeries, BarsignalError> {
        let key = (symbol.to_string(), start_date, end_date);
        let now = self.clock.now();

        if let Some(bars) = self.lookup(&key, now) {
            debug!(symbol, %start_date, %end_date, "bar cache hit");
            return Ok(bars);
        }

        debug!(symbol, %start_date, %end_date, "bar cache miss");
        let bars = self.inner.fetch_bars(symbol, start_date, end_date)?;
        // Poisoned lock: skip the write, the fetched bars are still returned.
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(
                key,
                CacheEntry {
                    fetched_at: now,
                    bars: bars.clone(),
                },
            );
        }
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::Bar;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingPort {
        calls: Cell<usize>,
        fail: bool,
    }

    impl CountingPort {
        fn new() -> Self {
            Self {
                calls: Cell::new(0),
                fail: false,
            }
        }
    }

    impl DataPort for CountingPort {
        fn fetch_bars(
            &self,
            _symbol: &str,
            start_date: NaiveDate,
            _end_date: NaiveDate,
        ) -> Result<BarSeries, BarsignalError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(BarsignalError::Data {
                    reason: "offline".into(),
                });
            }
            BarSeries::new(vec![Bar {
                date: start_date,
                open: 1.0,
                high: 1.0,
                low: 1.0,
                close: 1.0,
                volume: None,
            }])
        }
    }

    #[derive(Clone)]
    struct FakeClock(Rc<Cell<DateTime<Utc>>>);

    impl FakeClock {
        fn new() -> Self {
            Self(Rc::new(Cell::new(
                DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            )))
        }

        fn advance(&self, secs: i64) {
            self.0.set(self.0.get() + Duration::seconds(secs));
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> DateTime<Utc> {
            self.0.get()
        }
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn cached(clock: &FakeClock) -> CachedDataPort<CountingPort, FakeClock> {
        CachedDataPort::with_clock(
            CountingPort::new(),
            clock.clone(),
            Duration::seconds(DEFAULT_TTL_SECS),
        )
    }

    #[test]
    fn repeat_fetch_served_from_cache() {
        let clock = FakeClock::new();
        let port = cached(&clock);
        let a = port.fetch_bars("EURUSD", d(1), d(31)).unwrap();
        clock.advance(DEFAULT_TTL_SECS - 1);
        let b = port.fetch_bars("EURUSD", d(1), d(31)).unwrap();
        assert_eq!(a, b);
        assert_eq!(port.inner().calls.get(), 1);
    }

    #[test]
    fn entry_expires_after_ttl() {
        let clock = FakeClock::new();
        let port = cached(&clock);
        port.fetch_bars("EURUSD", d(1), d(31)).unwrap();
        clock.advance(DEFAULT_TTL_SECS);
        port.fetch_bars("EURUSD", d(1), d(31)).unwrap();
        assert_eq!(port.inner().calls.get(), 2);
    }

    #[test]
    fn key_includes_range() {
        let clock = FakeClock::new();
        let port = cached(&clock);
        port.fetch_bars("EURUSD", d(1), d(31)).unwrap();
        port.fetch_bars("EURUSD", d(2), d(31)).unwrap();
        port.fetch_bars("GBPUSD", d(1), d(31)).unwrap();
        assert_eq!(port.inner().calls.get(), 3);
    }

    #[test]
    fn errors_are_not_cached() {
        let clock = FakeClock::new();
        let port = CachedDataPort::with_clock(
            CountingPort {
                calls: Cell::new(0),
                fail: true,
            },
            clock,
            Duration::seconds(60),
        );
        assert!(port.fetch_bars("X", d(1), d(2)).is_err());
        assert!(port.fetch_bars("X", d(1), d(2)).is_err());
        assert_eq!(port.inner().calls.get(), 2);
    }

    #[test]
    fn clear_forces_refetch() {
        let clock = FakeClock::new();
        let port = cached(&clock);
        port.fetch_bars("EURUSD", d(1), d(31)).unwrap();
        port.clear();
        port.fetch_bars("EURUSD", d(1), d(31)).unwrap();
        assert_eq!(port.inner().calls.get(), 2);
    }
}
