//! Report rendering.
//!
//! Every report is a plain list of lines. Whether the lines end up on the console or in a file is
//! up to the caller.

use std::fmt;
use std::io::{self, Write};

use chrono::NaiveDate;

use crate::aggregate::{
	self, ConfirmationBuckets, ConfirmationCounts, DailyClimate, DailyPhases, EnergySummary, Period,
};
use crate::format::{self, Column};
use crate::parse::Record;
use crate::types::Reservation;

pub const WH_PER_KWH: f64 = 1000.0;

/// Ordered lines of display text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
	lines: Vec<String>,
}

impl Report {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, line: impl Into<String>) {
		self.lines.push(line.into());
	}

	pub fn append(&mut self, other: Report) {
		self.lines.extend(other.lines);
	}

	pub fn lines(&self) -> &[String] {
		&self.lines
	}

	pub fn is_empty(&self) -> bool {
		self.lines.is_empty()
	}

	/// Write every line, newline terminated, to `wtr`.
	pub fn write_to<W: Write>(&self, wtr: &mut W) -> io::Result<()> {
		for line in &self.lines {
			writeln!(wtr, "{}", line)?;
		}
		Ok(())
	}
}

impl fmt::Display for Report {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for line in &self.lines {
			writeln!(f, "{}", line)?;
		}
		Ok(())
	}
}

impl FromIterator<String> for Report {
	fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
		Self {
			lines: iter.into_iter().collect(),
		}
	}
}

/// `- name, resource, dd.mm.yyyy at HH.MM` for each confirmed reservation.
pub fn confirmed_listing(reservations: &[Reservation]) -> Report {
	reservations
		.iter()
		.filter(|r| r.is_confirmed())
		.map(|r| {
			format!(
				"- {}, {}, {} at {}",
				r.name,
				r.resource,
				format::date_fi(r.date),
				format::time_dotted(r.time)
			)
		})
		.collect()
}

pub fn long_listing(reservations: &[Reservation]) -> Report {
	reservations
		.iter()
		.filter(|r| r.is_long())
		.map(|r| {
			format!(
				"- {}, {} at {}, duration {} h, {}",
				r.name,
				format::date_fi(r.date),
				format::time_dotted(r.time),
				r.duration_hours,
				r.resource
			)
		})
		.collect()
}

pub fn status_listing(reservations: &[Reservation]) -> Report {
	reservations
		.iter()
		.map(|r| {
			let status = if r.is_confirmed() {
				"Confirmed"
			} else {
				"NOT Confirmed"
			};
			format!("{} → {}", r.name, status)
		})
		.collect()
}

pub fn confirmation_summary(buckets: &ConfirmationBuckets) -> Report {
	let counts = ConfirmationCounts::from_buckets(buckets);
	let mut report = Report::new();
	report.push(format!("- Confirmed reservations: {} pcs", counts.confirmed));
	report.push(format!(
		"- Not confirmed reservations: {} pcs",
		counts.not_confirmed
	));
	report
}

pub fn total_revenue(buckets: &ConfirmationBuckets) -> Report {
	let revenue = aggregate::confirmed_revenue(buckets);
	let mut report = Report::new();
	report.push(format!(
		"Total revenue from confirmed reservations: {} €",
		format::decimal_comma(revenue)
	));
	report
}

/// Every reservation as a ` | ` separated row under the column header.
pub fn record_dump(reservations: &[Reservation]) -> Report {
	let separator = "-".repeat(72);
	let mut report = Report::new();
	report.push(Reservation::COLUMNS.join(" | "));
	report.push(separator.clone());
	for r in reservations {
		report.push(r.fields().join(" | "));
		report.push(separator.clone());
	}
	report
}

/// Reservation Overview
///
/// The five numbered reservation sections, each followed by a blank line.
pub fn reservation_overview(reservations: &[Reservation]) -> Report {
	let buckets = aggregate::by_confirmation(reservations);
	let sections = [
		("1) Confirmed Reservations", confirmed_listing(reservations)),
		("2) Long Reservations (≥ 3 h)", long_listing(reservations)),
		(
			"3) Reservation Confirmation Status",
			status_listing(reservations),
		),
		("4) Confirmation Summary", confirmation_summary(&buckets)),
		(
			"5) Total Revenue from Confirmed Reservations",
			total_revenue(&buckets),
		),
	];

	let mut report = Report::new();
	for (title, body) in sections {
		report.push(title);
		report.append(body);
		report.push("");
	}
	report
}

const WEEK_COLUMNS: [Column; 8] = [
	Column::left(0, 11),
	Column::left(1, 12),
	Column::right(1, 5),
	Column::right(2, 5),
	Column::right(2, 7),
	Column::right(5, 10),
	Column::right(2, 5),
	Column::right(2, 5),
];

/// Weekly Table
///
/// Per-phase consumption and production in kWh for each of `days`, in the order given. Days
/// without readings are shown as zeros.
pub fn weekly_table(week: u32, days: &[NaiveDate], daily: &DailyPhases) -> Report {
	let mut report = Report::new();
	report.push(format!(
		"Week {} electricity consumption and production (kWh, by phase)",
		week
	));
	report.push("");
	report.push("Day          Date        Consumption [kWh]               Production [kWh]");
	report.push("            (dd.mm.yyyy)  v1      v2      v3             v1     v2     v3");
	report.push("-".repeat(75));

	for day in days {
		let bucket = daily.get(day).copied().unwrap_or_default();
		let values: Vec<String> = bucket
			.sums
			.iter()
			.map(|wh| format::decimal_comma(wh / WH_PER_KWH))
			.collect();
		let date = format::date_fi(*day);
		let mut cells = vec![format::weekday_fi(*day), date.as_str()];
		cells.extend(values.iter().map(String::as_str));
		report.push(format::row(&WEEK_COLUMNS, &cells));
	}

	report.push("");
	report
}

fn period_summary(title: String, summary: &EnergySummary) -> Report {
	let mut report = Report::new();
	report.push("-".repeat(50));
	report.push(title);
	report.push(format!(
		"- Total consumption: {} kWh",
		format::decimal_comma(summary.consumption)
	));
	report.push(format!(
		"- Total production: {} kWh",
		format::decimal_comma(summary.production)
	));
	report.push(format!(
		"- Average temperature: {} °C",
		format::decimal_comma(summary.average_temperature)
	));
	report
}

/// Totals for an inclusive date range; reversed bounds are swapped.
pub fn daily_range_summary(daily: &DailyClimate, start: NaiveDate, end: NaiveDate) -> Report {
	let (start, end) = if end < start {
		(end, start)
	} else {
		(start, end)
	};
	period_summary(
		format!(
			"Report for the period {}–{}",
			format::date_fi(start),
			format::date_fi(end)
		),
		&EnergySummary::for_period(daily, &Period::range(start, end)),
	)
}

/// Totals for one calendar month.
///
/// The average temperature is taken over every reading in the month, not as a mean of the daily
/// means, so days with more readings weigh more.
pub fn monthly_summary(daily: &DailyClimate, year: i32, month: u32) -> Report {
	let name = format::month_name(month).unwrap_or("unknown month");
	period_summary(
		format!("Report for the month: {} {}", name, year),
		&EnergySummary::for_period(daily, &Period::Month { year, month }),
	)
}

pub fn yearly_summary(daily: &DailyClimate, year: i32) -> Report {
	period_summary(
		format!("Report for the year {}", year),
		&EnergySummary::for_period(daily, &Period::Year(year)),
	)
}
