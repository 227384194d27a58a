//! Locale formatting shared by every report: decimal comma, Finnish dates and fixed-width columns.

use chrono::{Datelike, NaiveDate, NaiveTime};

/// Finnish weekday names, Monday first.
pub const WEEKDAYS_FI: [&str; 7] = [
	"maanantai",
	"tiistai",
	"keskiviikko",
	"torstai",
	"perjantai",
	"lauantai",
	"sunnuntai",
];

pub const MONTHS_EN: [&str; 12] = [
	"January",
	"February",
	"March",
	"April",
	"May",
	"June",
	"July",
	"August",
	"September",
	"October",
	"November",
	"December",
];

/// Two decimals with a decimal comma, e.g. `37,00`.
pub fn decimal_comma(value: f64) -> String {
	format!("{:.2}", value).replace('.', ",")
}

/// `dd.mm.yyyy`
pub fn date_fi(date: NaiveDate) -> String {
	date.format("%d.%m.%Y").to_string()
}

/// `HH.MM`
pub fn time_dotted(time: NaiveTime) -> String {
	time.format("%H.%M").to_string()
}

/// `HH:MM`
pub fn time_colon(time: NaiveTime) -> String {
	time.format("%H:%M").to_string()
}

pub fn weekday_fi(date: NaiveDate) -> &'static str {
	WEEKDAYS_FI[date.weekday().num_days_from_monday() as usize]
}

/// English month name for a 1-based month number.
pub fn month_name(month: u32) -> Option<&'static str> {
	let index = usize::try_from(month).ok()?.checked_sub(1)?;
	MONTHS_EN.get(index).copied()
}

/// Parse a `dd.mm.yyyy` date as typed at a prompt.
pub fn parse_date_fi(text: &str) -> Option<NaiveDate> {
	NaiveDate::parse_from_str(text.trim(), "%d.%m.%Y").ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
	Left,
	Right,
}

/// One fixed-width column, preceded by `gap` spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
	pub gap: usize,
	pub width: usize,
	pub align: Align,
}

impl Column {
	pub const fn left(gap: usize, width: usize) -> Self {
		Self {
			gap,
			width,
			align: Align::Left,
		}
	}

	pub const fn right(gap: usize, width: usize) -> Self {
		Self {
			gap,
			width,
			align: Align::Right,
		}
	}
}

/// Lay `cells` out in `columns`. Cells wider than their column are not truncated.
pub fn row(columns: &[Column], cells: &[&str]) -> String {
	let mut line = String::new();
	for (column, cell) in columns.iter().zip(cells) {
		line.push_str(&" ".repeat(column.gap));
		let padded = match column.align {
			Align::Left => format!("{:<width$}", cell, width = column.width),
			Align::Right => format!("{:>width$}", cell, width = column.width),
		};
		line.push_str(&padded);
	}
	line
}
