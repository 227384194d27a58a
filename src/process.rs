//! Report pipelines: parse an input, aggregate it and write the rendered reports.

use std::io::{BufRead, BufWriter, Read, Write};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono::{NaiveDate, Weekday};

use crate::aggregate;
use crate::menu::{Menu, ReportSink};
use crate::parse::{self, read_records, RecordFormat};
use crate::report::{self, Report};
use crate::types::{ClimateReading, PhaseReading, Reservation};

/// Run Reservations
///
/// Read all reservations from `input` (trait bound `std::io::Read`) and write the five
/// reservation reports to `output` (trait bound `std::io::Write`), optionally preceded by a dump
/// of every parsed record.
pub fn run_reservations<R: Read, W: Write>(
	input: &mut R,
	output: &mut W,
	dump: bool,
) -> Result<()> {
	let reservations: Vec<Reservation> = read_records(input, RecordFormat::RESERVATIONS)?;
	log::info!("Parsed {} reservations", reservations.len());

	let mut buffered = BufWriter::new(output);
	if dump {
		report::record_dump(&reservations).write_to(&mut buffered)?;
		writeln!(buffered)?;
	}
	report::reservation_overview(&reservations).write_to(&mut buffered)?;
	buffered.flush()?;
	Ok(())
}

/// A week number and the meter reading file covering it, given as `WEEK=PATH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekSource {
	pub week: u32,
	pub path: PathBuf,
}

impl FromStr for WeekSource {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (week, path) = s
			.split_once('=')
			.ok_or_else(|| format!("expected WEEK=PATH, got '{s}'"))?;
		let week = week
			.trim()
			.parse()
			.map_err(|e| format!("invalid week number '{week}': {e}"))?;
		Ok(Self {
			week,
			path: PathBuf::from(path.trim()),
		})
	}
}

/// Monday to Sunday of ISO week `week` in `year`.
pub fn week_days(year: i32, week: u32) -> Result<Vec<NaiveDate>> {
	let monday = NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
		.ok_or_else(|| anyhow!("week {} does not exist in {}", week, year))?;
	Ok(monday.iter_days().take(7).collect())
}

/// Build the per-phase table for one week from the readings in `input`.
pub fn build_week<R: Read>(input: &mut R, year: i32, week: u32) -> Result<Report> {
	let readings: Vec<PhaseReading> = read_records(input, RecordFormat::METER_READINGS)?;
	let daily = aggregate::daily_phases(&readings);
	log::debug!("Week {} has readings for {} days", week, daily.len());
	Ok(report::weekly_table(week, &week_days(year, week)?, &daily))
}

/// Run Weekly
///
/// Build the weekly tables for every source in order, write them to `output` and return the
/// combined report so the caller can also persist it.
pub fn run_weekly<W: Write>(year: i32, weeks: &[WeekSource], output: &mut W) -> Result<Report> {
	let mut summary = Report::new();
	for source in weeks {
		let mut file = parse::open_input(&source.path)?;
		summary.append(build_week(&mut file, year, source.week)?);
	}
	summary.write_to(output)?;
	Ok(summary)
}

/// Run Energy Menu
///
/// Read hourly climate readings from `data`, then hand control to the interactive menu reading
/// choices from `input` and printing to `output`. Saved reports go to `sink`.
pub fn run_energy_menu<D, I, W, S>(
	data: &mut D,
	year: i32,
	input: I,
	output: W,
	sink: S,
) -> Result<()>
where
	D: Read,
	I: BufRead,
	W: Write,
	S: ReportSink,
{
	let readings: Vec<ClimateReading> = read_records(data, RecordFormat::METER_READINGS)?;
	log::info!("Parsed {} meter readings", readings.len());
	let daily = aggregate::daily_climate(&readings);
	Menu::new(&daily, year, input, output, sink).run()?;
	Ok(())
}
