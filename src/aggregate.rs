//! Grouping and accumulation of parsed records.
//!
//! Aggregates are built by a single fold over the records and are never mutated afterwards. The
//! formatters in `report` only ever read from them.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::types::{Amount, ClimateReading, PhaseReading, Reservation, Timestamped};

/// Running totals for one grouping key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket<const N: usize> {
	pub sums: [f64; N],
	pub count: usize,
}

impl<const N: usize> Default for Bucket<N> {
	fn default() -> Self {
		Self {
			sums: [0.0; N],
			count: 0,
		}
	}
}

impl<const N: usize> Bucket<N> {
	pub fn add(&mut self, values: [f64; N]) {
		for (sum, value) in self.sums.iter_mut().zip(values) {
			*sum += value;
		}
		self.count += 1;
	}

	pub fn merge(&mut self, other: &Bucket<N>) {
		for (sum, value) in self.sums.iter_mut().zip(other.sums) {
			*sum += value;
		}
		self.count += other.count;
	}

	/// Mean of the `index`th field, `None` for an empty bucket.
	pub fn mean(&self, index: usize) -> Option<f64> {
		if self.count == 0 {
			None
		} else {
			Some(self.sums[index] / self.count as f64)
		}
	}
}

/// Buckets keyed by `K`, iterated in key order.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate<K: Ord, const N: usize> {
	buckets: BTreeMap<K, Bucket<N>>,
}

impl<K: Ord, const N: usize> Aggregate<K, N> {
	/// Build
	///
	/// Fold every record accepted by `filter` into the bucket for `key(record)`, adding the
	/// `N` values picked by `select`. Keys with no matching record are absent.
	pub fn build<'a, T: 'a, I>(
		records: I,
		key: impl Fn(&T) -> K,
		filter: impl Fn(&T) -> bool,
		select: impl Fn(&T) -> [f64; N],
	) -> Self
	where
		I: IntoIterator<Item = &'a T>,
	{
		let buckets = records
			.into_iter()
			.filter(|record| filter(record))
			.fold(BTreeMap::new(), |mut buckets, record| {
				buckets
					.entry(key(record))
					.or_insert_with(Bucket::default)
					.add(select(record));
				buckets
			});
		Self { buckets }
	}

	pub fn get(&self, key: &K) -> Option<&Bucket<N>> {
		self.buckets.get(key)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&K, &Bucket<N>)> {
		self.buckets.iter()
	}

	pub fn len(&self) -> usize {
		self.buckets.len()
	}

	pub fn is_empty(&self) -> bool {
		self.buckets.is_empty()
	}

	/// Sum of the buckets whose key satisfies `pred`. Zero totals when nothing matches.
	pub fn total_where(&self, pred: impl Fn(&K) -> bool) -> Bucket<N> {
		self.buckets
			.iter()
			.filter(|(key, _)| pred(key))
			.fold(Bucket::default(), |mut total, (_, bucket)| {
				total.merge(bucket);
				total
			})
	}

	pub fn total(&self) -> Bucket<N> {
		self.total_where(|_| true)
	}
}

pub fn by_date<T: Timestamped>(record: &T) -> NaiveDate {
	record.timestamp().date()
}

pub fn by_month<T: Timestamped>(record: &T) -> (i32, u32) {
	let ts = record.timestamp();
	(ts.year(), ts.month())
}

pub fn by_year<T: Timestamped>(record: &T) -> i32 {
	record.timestamp().year()
}

pub fn everything<T>(_: &T) -> bool {
	true
}

/// Per-day sums of the six phase values (Wh).
pub type DailyPhases = Aggregate<NaiveDate, 6>;

pub fn daily_phases(readings: &[PhaseReading]) -> DailyPhases {
	Aggregate::build(readings, by_date, everything, PhaseReading::values)
}

pub const CONSUMPTION: usize = 0;
pub const PRODUCTION: usize = 1;
pub const TEMPERATURE: usize = 2;

/// Per-day sums of consumption, production and temperature.
pub type DailyClimate = Aggregate<NaiveDate, 3>;

pub fn daily_climate(readings: &[ClimateReading]) -> DailyClimate {
	Aggregate::build(readings, by_date, everything, |r: &ClimateReading| {
		[r.consumption, r.production, r.temperature]
	})
}

/// Reservation totals split on the confirmation flag. The single value is the reservation price.
pub type ConfirmationBuckets = Aggregate<bool, 1>;

pub fn by_confirmation(reservations: &[Reservation]) -> ConfirmationBuckets {
	Aggregate::build(
		reservations,
		Reservation::is_confirmed,
		everything,
		|r: &Reservation| [r.total_price()],
	)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfirmationCounts {
	pub confirmed: usize,
	pub not_confirmed: usize,
}

impl ConfirmationCounts {
	pub fn from_buckets(buckets: &ConfirmationBuckets) -> Self {
		let count = |flag| buckets.get(&flag).map_or(0, |b| b.count);
		Self {
			confirmed: count(true),
			not_confirmed: count(false),
		}
	}
}

/// Sum of duration times hourly price over confirmed reservations.
pub fn confirmed_revenue(buckets: &ConfirmationBuckets) -> Amount {
	buckets.get(&true).map_or(0.0, |b| b.sums[0])
}

/// A reporting period over calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
	Range { start: NaiveDate, end: NaiveDate },
	Month { year: i32, month: u32 },
	Year(i32),
}

impl Period {
	/// Inclusive range; the bounds are swapped if given in reverse.
	pub fn range(a: NaiveDate, b: NaiveDate) -> Self {
		if b < a {
			Period::Range { start: b, end: a }
		} else {
			Period::Range { start: a, end: b }
		}
	}

	pub fn contains(&self, day: &NaiveDate) -> bool {
		match *self {
			Period::Range { start, end } => start <= *day && *day <= end,
			Period::Month { year, month } => day.year() == year && day.month() == month,
			Period::Year(year) => day.year() == year,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnergySummary {
	pub consumption: f64,
	pub production: f64,
	pub average_temperature: f64,
	pub readings: usize,
}

impl EnergySummary {
	/// Totals for `period`. The average temperature is per reading, and 0 for an empty period.
	pub fn for_period(daily: &DailyClimate, period: &Period) -> Self {
		let total = daily.total_where(|day| period.contains(day));
		Self {
			consumption: total.sums[CONSUMPTION],
			production: total.sums[PRODUCTION],
			average_temperature: total.mean(TEMPERATURE).unwrap_or(0.0),
			readings: total.count,
		}
	}
}
