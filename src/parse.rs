//! Delimited record parsing.
//!
//! Every input format is a fixed column schema: one record per non-blank line, fields split on a
//! single-byte delimiter. Parsing is fail-fast, the first malformed line aborts the whole read.

use std::fmt::{Debug, Display};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use csv::{StringRecord, Trim};
use serde::de::DeserializeOwned;

use crate::error::ReportError;

/// A record type with a fixed column schema.
pub trait Record: Debug + Sized {
	/// Column names in file order. The length is the required field count.
	const COLUMNS: &'static [&'static str];
	/// Named, untyped columns deserialized from a row.
	type Raw: DeserializeOwned;

	fn from_raw(raw: Self::Raw) -> Result<Self, String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordFormat {
	pub delimiter: u8,
	pub has_header: bool,
}

impl RecordFormat {
	/// `id|name|email|...`, no header line.
	pub const RESERVATIONS: RecordFormat = RecordFormat {
		delimiter: b'|',
		has_header: false,
	};
	/// `timestamp;v1;...`, first line is a header.
	pub const METER_READINGS: RecordFormat = RecordFormat {
		delimiter: b';',
		has_header: true,
	};
}

/// Read Records
///
/// Read every record from `input` (trait bound `std::io::Read`) using the delimiter and header
/// convention of `format`. Blank lines are skipped, all fields are trimmed. Returns
/// `ReportError::MalformedRecord` for the first line with the wrong field count or a field that
/// fails to convert; no partial result is returned in that case.
pub fn read_records<T: Record, R: Read>(
	input: &mut R,
	format: RecordFormat,
) -> Result<Vec<T>, ReportError> {
	let buffered = BufReader::new(input);
	let mut rdr = csv::ReaderBuilder::new()
		.delimiter(format.delimiter)
		.has_headers(format.has_header)
		.flexible(true)
		.quoting(false)
		.trim(Trim::All)
		.from_reader(buffered);

	let mut records = Vec::new();
	for result in rdr.records() {
		let row = result.map_err(undecodable_line)?;
		if is_blank(&row) {
			continue;
		}
		let line = row.position().map_or(0, |p| p.line());
		let record =
			parse_row::<T>(&row).map_err(|reason| ReportError::MalformedRecord { line, reason })?;
		log::debug!("{:?}", record);
		records.push(record);
	}

	Ok(records)
}

/// Read Records From Path
///
/// Open `path` and read all of its records. The file handle is released before returning, on
/// success and on failure alike.
pub fn read_records_from_path<T: Record>(
	path: &Path,
	format: RecordFormat,
) -> Result<Vec<T>, ReportError> {
	let mut file = open_input(path)?;
	let records = read_records(&mut file, format)?;
	log::info!("Read {} records from '{}'", records.len(), path.display());
	Ok(records)
}

/// Open an input file, mapping a missing file to `ReportError::MissingFile`.
pub fn open_input(path: &Path) -> Result<File, ReportError> {
	File::open(path).map_err(|e| match e.kind() {
		io::ErrorKind::NotFound => ReportError::MissingFile {
			path: path.to_path_buf(),
		},
		_ => ReportError::Io(e),
	})
}

// A line that is not valid UTF-8 cannot match any schema.
fn undecodable_line(err: csv::Error) -> ReportError {
	match err.kind() {
		csv::ErrorKind::Utf8 { pos, err: utf8 } => ReportError::MalformedRecord {
			line: pos.as_ref().map_or(0, |p| p.line()),
			reason: format!("invalid UTF-8: {utf8}"),
		},
		_ => ReportError::Csv(err),
	}
}

// A whitespace-only line trims down to a single empty field.
fn is_blank(row: &StringRecord) -> bool {
	row.len() == 1 && row.get(0).map_or(true, str::is_empty)
}

fn parse_row<T: Record>(row: &StringRecord) -> Result<T, String> {
	if row.len() != T::COLUMNS.len() {
		return Err(format!(
			"expected {} fields, found {}",
			T::COLUMNS.len(),
			row.len()
		));
	}
	let raw: T::Raw = row.deserialize(None).map_err(|e| e.to_string())?;
	T::from_raw(raw)
}

pub fn integer<N>(field: &str, value: &str) -> Result<N, String>
where
	N: FromStr,
	N::Err: Display,
{
	value
		.parse()
		.map_err(|e| format!("invalid {field} '{value}': {e}"))
}

/// Decimal with either `.` or `,` as the separator.
pub fn decimal(field: &str, value: &str) -> Result<f64, String> {
	value
		.replace(',', ".")
		.parse()
		.map_err(|e| format!("invalid {field} '{value}': {e}"))
}

/// Like `decimal`, but an empty field reads as 0.0.
pub fn decimal_or_zero(field: &str, value: &str) -> Result<f64, String> {
	if value.is_empty() {
		Ok(0.0)
	} else {
		decimal(field, value)
	}
}

/// Only the exact literal `True` is true.
pub fn boolean(value: &str) -> bool {
	value == "True"
}

pub fn date(field: &str, value: &str) -> Result<NaiveDate, String> {
	NaiveDate::parse_from_str(value, "%Y-%m-%d")
		.map_err(|e| format!("invalid {field} '{value}': {e}"))
}

/// `HH:MM:SS` or `HH:MM`.
pub fn time(field: &str, value: &str) -> Result<NaiveTime, String> {
	NaiveTime::parse_from_str(value, "%H:%M:%S")
		.or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
		.map_err(|e| format!("invalid {field} '{value}': {e}"))
}

/// `YYYY-MM-DDTHH:MM:SS` or `YYYY-MM-DD HH:MM:SS`. Anything after the seconds (UTC offset,
/// fraction) is ignored.
pub fn date_time(field: &str, value: &str) -> Result<NaiveDateTime, String> {
	let trimmed = value.get(..19).unwrap_or(value);
	NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
		.or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S"))
		.map_err(|e| format!("invalid {field} '{value}': {e}"))
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::types::{ClimateReading, PhaseReading, Reservation};
	use rstest::*;

	const MOOMIN: &str = "201|Moomin Valley|moomin@whitevalley.org|0509876543|2025-11-12|09:00|2|18.50|True|Forest Area 1|2025-08-12 14:33:20\n";

	fn reservations(text: &str) -> Result<Vec<Reservation>, ReportError> {
		read_records(&mut text.as_bytes(), RecordFormat::RESERVATIONS)
	}

	#[rstest]
	fn reads_reservation_fields() {
		let records = reservations(MOOMIN).unwrap();
		assert_eq!(records.len(), 1);
		let r = &records[0];
		assert_eq!(r.id, 201);
		assert_eq!(r.name, "Moomin Valley");
		assert_eq!(r.date, NaiveDate::from_ymd_opt(2025, 11, 12).unwrap());
		assert_eq!(r.time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
		assert_eq!(r.duration_hours, 2);
		assert_eq!(r.price_per_hour, 18.5);
		assert!(r.confirmed);
		assert_eq!(r.resource, "Forest Area 1");
		assert_eq!(
			r.created_at,
			NaiveDate::from_ymd_opt(2025, 8, 12)
				.unwrap()
				.and_hms_opt(14, 33, 20)
				.unwrap()
		);
	}

	#[rstest]
	fn skips_blank_lines() {
		let text = format!("\n{MOOMIN}   \n\n{MOOMIN}");
		assert_eq!(reservations(&text).unwrap().len(), 2);
	}

	#[rstest]
	#[case::example("|18.50|", "|18.50|")]
	#[case::three_decimal_price("|18.50|", "|18.125|")]
	#[case::comma_price("|18.50|", "|18,50|")]
	#[case::time_with_seconds("|09:00|", "|09:15:30|")]
	#[case::not_confirmed("|True|", "|False|")]
	#[case::padded_text("|Moomin Valley|", "|  Moomin Valley  |")]
	fn formatted_reservation_parses_back(#[case] from: &str, #[case] to: &str) {
		let text = MOOMIN.replace(from, to);
		let original = reservations(&text).unwrap().remove(0);
		let line = format!("{original}\n");
		let parsed = reservations(&line).unwrap().remove(0);
		assert_eq!(parsed, original);
	}

	#[rstest]
	fn price_is_written_without_rounding() {
		let text = MOOMIN.replace("|18.50|", "|18.125|");
		let original = reservations(&text).unwrap().remove(0);
		assert_eq!(original.fields()[7], "18.125");
	}

	#[rstest]
	#[case("09:15:30", (9, 15, 30))]
	#[case("09:15", (9, 15, 0))]
	#[case("23:59:59", (23, 59, 59))]
	fn parses_time_with_and_without_seconds(#[case] value: &str, #[case] hms: (u32, u32, u32)) {
		let (h, m, s) = hms;
		assert_eq!(
			time("reservationTime", value).unwrap(),
			NaiveTime::from_hms_opt(h, m, s).unwrap()
		);
	}

	#[rstest]
	#[case("False")]
	#[case("true")]
	#[case("TRUE")]
	#[case("")]
	fn only_exact_true_confirms(#[case] flag: &str) {
		let line = MOOMIN.replace("|True|", &format!("|{flag}|"));
		assert!(!reservations(&line).unwrap()[0].confirmed);
	}

	#[rstest]
	#[case::too_few_fields("201|Moomin Valley|2025-11-12\n")]
	#[case::bad_id("x1|Moomin Valley|m@v.org|050|2025-11-12|09:00|2|18.50|True|Forest|2025-08-12 14:33:20\n")]
	#[case::bad_date("201|Moomin Valley|m@v.org|050|12.11.2025|09:00|2|18.50|True|Forest|2025-08-12 14:33:20\n")]
	#[case::bad_time("201|Moomin Valley|m@v.org|050|2025-11-12|9am|2|18.50|True|Forest|2025-08-12 14:33:20\n")]
	#[case::negative_duration("201|Moomin Valley|m@v.org|050|2025-11-12|09:00|-2|18.50|True|Forest|2025-08-12 14:33:20\n")]
	fn malformed_line_aborts_read(#[case] bad: &str) {
		let text = format!("{MOOMIN}{bad}{MOOMIN}");
		match reservations(&text) {
			Err(ReportError::MalformedRecord { line, .. }) => assert_eq!(line, 2),
			other => panic!("expected malformed record, got {:?}", other),
		}
	}

	#[rstest]
	fn undecodable_line_is_malformed() {
		let mut text = MOOMIN.as_bytes().to_vec();
		text.extend_from_slice(b"202|Moomin \xff Valley|m@v.org|050|2025-11-12|09:00|2|18.50|True|Forest|2025-08-12 14:33:20\n");
		let result: Result<Vec<Reservation>, ReportError> =
			read_records(&mut text.as_slice(), RecordFormat::RESERVATIONS);
		match result {
			Err(ReportError::MalformedRecord { line, reason }) => {
				assert_eq!(line, 2);
				assert!(reason.starts_with("invalid UTF-8"), "{}", reason);
			}
			other => panic!("expected malformed record, got {:?}", other),
		}
	}

	#[rstest]
	fn reads_phase_readings_with_header() {
		let text = "timestamp;v1;v2;v3;v4;v5;v6\n\
			2025-10-13T00:00:00;100;200,5;;0;0;10.25\n";
		let readings: Vec<PhaseReading> =
			read_records(&mut text.as_bytes(), RecordFormat::METER_READINGS).unwrap();
		assert_eq!(readings.len(), 1);
		assert_eq!(readings[0].consumption, [100.0, 200.5, 0.0]);
		assert_eq!(readings[0].production, [0.0, 0.0, 10.25]);
	}

	#[rstest]
	fn reads_climate_readings_with_offset_suffix() {
		let text = "Time;Consumption (kWh);Production (kWh);Temperature\n\
			2025-01-01T00:00:00+02:00;1,25;0,5;-3,5\n";
		let readings: Vec<ClimateReading> =
			read_records(&mut text.as_bytes(), RecordFormat::METER_READINGS).unwrap();
		assert_eq!(readings[0].consumption, 1.25);
		assert_eq!(readings[0].temperature, -3.5);
		assert_eq!(
			readings[0].timestamp,
			NaiveDate::from_ymd_opt(2025, 1, 1)
				.unwrap()
				.and_hms_opt(0, 0, 0)
				.unwrap()
		);
	}

	#[rstest]
	#[case("2025-10-13T06:30:00")]
	#[case("2025-10-13 06:30:00")]
	fn accepts_both_date_time_separators(#[case] value: &str) {
		let parsed = date_time("timestamp", value).unwrap();
		assert_eq!(parsed.format("%Y-%m-%d %H:%M").to_string(), "2025-10-13 06:30");
	}

	#[rstest]
	fn missing_file_is_reported() {
		let result = read_records_from_path::<Reservation>(
			Path::new("no/such/reservations.txt"),
			RecordFormat::RESERVATIONS,
		);
		assert!(matches!(result, Err(ReportError::MissingFile { .. })));
	}
}
