//! Record type definitions.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::Deserialize;

use crate::format;
use crate::parse::{self, Record};

pub type Amount = f64;
pub type Hours = u32;
pub type ReservationId = u32;

/// Reservations lasting at least this many hours are "long".
pub const LONG_RESERVATION_HOURS: Hours = 3;

/// One row of the pipe-delimited reservation file.
#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
	pub id: ReservationId,
	pub name: String,
	pub email: String,
	pub phone: String,
	pub date: NaiveDate,
	pub time: NaiveTime,
	pub duration_hours: Hours,
	pub price_per_hour: Amount,
	pub confirmed: bool,
	pub resource: String,
	pub created_at: NaiveDateTime,
}

/// Untyped reservation columns, in file order.
#[derive(Debug, Deserialize)]
pub struct RawReservation {
	id: String,
	name: String,
	email: String,
	phone: String,
	date: String,
	time: String,
	duration_hours: String,
	price_per_hour: String,
	confirmed: String,
	resource: String,
	created_at: String,
}

impl Reservation {
	pub fn is_confirmed(&self) -> bool {
		self.confirmed
	}

	pub fn is_long(&self) -> bool {
		self.duration_hours >= LONG_RESERVATION_HOURS
	}

	/// Duration times the hourly price.
	pub fn total_price(&self) -> Amount {
		self.duration_hours as Amount * self.price_per_hour
	}

	/// Field values in file order, formatted as they appear in the file.
	pub fn fields(&self) -> [String; 11] {
		let time = if self.time.second() == 0 {
			format::time_colon(self.time)
		} else {
			self.time.format("%H:%M:%S").to_string()
		};
		[
			self.id.to_string(),
			self.name.clone(),
			self.email.clone(),
			self.phone.clone(),
			self.date.format("%Y-%m-%d").to_string(),
			time,
			self.duration_hours.to_string(),
			self.price_per_hour.to_string(),
			if self.confirmed { "True" } else { "False" }.to_string(),
			self.resource.clone(),
			self.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
		]
	}
}

impl Record for Reservation {
	const COLUMNS: &'static [&'static str] = &[
		"reservationId",
		"name",
		"email",
		"phone",
		"reservationDate",
		"reservationTime",
		"durationHours",
		"price",
		"confirmed",
		"reservedResource",
		"createdAt",
	];
	type Raw = RawReservation;

	fn from_raw(raw: RawReservation) -> Result<Self, String> {
		Ok(Self {
			id: parse::integer("reservationId", &raw.id)?,
			name: raw.name,
			email: raw.email,
			phone: raw.phone,
			date: parse::date("reservationDate", &raw.date)?,
			time: parse::time("reservationTime", &raw.time)?,
			duration_hours: parse::integer("durationHours", &raw.duration_hours)?,
			price_per_hour: parse::decimal("price", &raw.price_per_hour)?,
			confirmed: parse::boolean(&raw.confirmed),
			resource: raw.resource,
			created_at: parse::date_time("createdAt", &raw.created_at)?,
		})
	}
}

/// Renders the reservation back into its pipe-delimited file form.
impl fmt::Display for Reservation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.fields().join("|"))
	}
}

/// Anything carrying a reading timestamp, used by the grouping keys.
pub trait Timestamped {
	fn timestamp(&self) -> NaiveDateTime;
}

/// Hourly per-phase meter reading, values in Wh.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseReading {
	pub timestamp: NaiveDateTime,
	pub consumption: [f64; 3],
	pub production: [f64; 3],
}

#[derive(Debug, Deserialize)]
pub struct RawPhaseReading {
	timestamp: String,
	consumption_1: String,
	consumption_2: String,
	consumption_3: String,
	production_1: String,
	production_2: String,
	production_3: String,
}

impl PhaseReading {
	/// Consumption phases followed by production phases.
	pub fn values(&self) -> [f64; 6] {
		let [c1, c2, c3] = self.consumption;
		let [p1, p2, p3] = self.production;
		[c1, c2, c3, p1, p2, p3]
	}
}

impl Timestamped for PhaseReading {
	fn timestamp(&self) -> NaiveDateTime {
		self.timestamp
	}
}

impl Record for PhaseReading {
	const COLUMNS: &'static [&'static str] = &["timestamp", "v1", "v2", "v3", "v4", "v5", "v6"];
	type Raw = RawPhaseReading;

	fn from_raw(raw: RawPhaseReading) -> Result<Self, String> {
		Ok(Self {
			timestamp: parse::date_time("timestamp", &raw.timestamp)?,
			consumption: [
				parse::decimal_or_zero("v1", &raw.consumption_1)?,
				parse::decimal_or_zero("v2", &raw.consumption_2)?,
				parse::decimal_or_zero("v3", &raw.consumption_3)?,
			],
			production: [
				parse::decimal_or_zero("v4", &raw.production_1)?,
				parse::decimal_or_zero("v5", &raw.production_2)?,
				parse::decimal_or_zero("v6", &raw.production_3)?,
			],
		})
	}
}

/// Hourly consumption/production in kWh with the outdoor temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct ClimateReading {
	pub timestamp: NaiveDateTime,
	pub consumption: f64,
	pub production: f64,
	pub temperature: f64,
}

#[derive(Debug, Deserialize)]
pub struct RawClimateReading {
	timestamp: String,
	consumption: String,
	production: String,
	temperature: String,
}

impl Timestamped for ClimateReading {
	fn timestamp(&self) -> NaiveDateTime {
		self.timestamp
	}
}

impl Record for ClimateReading {
	const COLUMNS: &'static [&'static str] = &[
		"timestamp",
		"consumption",
		"production",
		"temperature",
	];
	type Raw = RawClimateReading;

	fn from_raw(raw: RawClimateReading) -> Result<Self, String> {
		Ok(Self {
			timestamp: parse::date_time("timestamp", &raw.timestamp)?,
			consumption: parse::decimal_or_zero("consumption", &raw.consumption)?,
			production: parse::decimal_or_zero("production", &raw.production)?,
			temperature: parse::decimal_or_zero("temperature", &raw.temperature)?,
		})
	}
}
