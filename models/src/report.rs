use std::collections::BTreeMap;

use chrono::{
	Datelike,
	Months,
	NaiveDate,
	NaiveDateTime,
	Timelike,
	Weekday,
};
use common::{DbConn, Error};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::Bool;
use serde::{Deserialize, Serialize};

use crate::schema::reservation;

type BoxedCondition<S, T = Bool> =
	Box<dyn BoxableExpression<S, Pg, SqlType = T>>;

/// Reporting window for the dashboard endpoints
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportWindow {
	Today,
	Week,
	Month,
	#[default]
	All,
}

impl ReportWindow {
	/// Inclusive date range covered by this window, [`None`] for all time
	///
	/// Weeks run Monday through Sunday
	#[must_use]
	pub fn date_range(
		self,
		today: NaiveDate,
	) -> Option<(NaiveDate, NaiveDate)> {
		match self {
			Self::Today => Some((today, today)),
			Self::Week => {
				let week = today.week(Weekday::Mon);

				Some((week.first_day(), week.last_day()))
			},
			Self::Month => {
				let start = today.with_day(1).unwrap_or(today);
				let end = start
					.checked_add_months(Months::new(1))
					.and_then(|d| d.pred_opt())
					.unwrap_or(today);

				Some((start, end))
			},
			Self::All => None,
		}
	}

	/// Whether a date falls inside this window
	#[must_use]
	pub fn contains(self, date: NaiveDate, today: NaiveDate) -> bool {
		match self.date_range(today) {
			Some((start, end)) => start <= date && date <= end,
			None => true,
		}
	}
}

/// Booking counters for a single reporting window
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
pub struct OverviewCounts {
	pub reservations: i64,
	pub visitors:     i64,
	pub checked_in:   i64,
}

impl OverviewCounts {
	fn add(&mut self, visitors: i32, checked: bool) {
		self.reservations += 1;
		self.visitors += i64::from(visitors);

		if checked {
			self.checked_in += 1;
		}
	}
}

/// Booking counters for the fixed dashboard windows
///
/// Windows are anchored on the booking date, not the visit date
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
pub struct OverviewReport {
	pub today:      OverviewCounts,
	pub this_week:  OverviewCounts,
	pub this_month: OverviewCounts,
	pub all_time:   OverviewCounts,
}

impl OverviewReport {
	/// Build the overview by folding every booking into its windows
	#[instrument(skip(conn))]
	pub async fn generate(
		today: NaiveDate,
		conn: &DbConn,
	) -> Result<Self, Error> {
		let rows: Vec<(NaiveDateTime, i32, bool)> = conn
			.interact(|conn| {
				use crate::schema::reservation::dsl::*;

				reservation
					.select((created_at, number_of_visitors, checked_in))
					.get_results(conn)
			})
			.await??;

		let mut report = Self::default();

		for (created, visitors, checked) in rows {
			let date = created.date();

			report.all_time.add(visitors, checked);

			if ReportWindow::Today.contains(date, today) {
				report.today.add(visitors, checked);
			}

			if ReportWindow::Week.contains(date, today) {
				report.this_week.add(visitors, checked);
			}

			if ReportWindow::Month.contains(date, today) {
				report.this_month.add(visitors, checked);
			}
		}

		Ok(report)
	}
}

/// Booking totals for one museum section
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SectionReport {
	pub section:      String,
	pub reservations: i64,
	pub visitors:     i64,
}

impl SectionReport {
	/// Per-section booking totals for visits inside a window
	#[instrument(skip(conn))]
	pub async fn for_window(
		window: ReportWindow,
		today: NaiveDate,
		conn: &DbConn,
	) -> Result<Vec<Self>, Error> {
		let range = window.date_range(today);

		let rows: Vec<(String, i64, Option<i64>)> = conn
			.interact(move |conn| {
				use diesel::dsl::{count_star, sum};

				use crate::schema::reservation::dsl::*;

				let date_filter: BoxedCondition<_, Bool> =
					if let Some((start, end)) = range {
						Box::new(visit_date.between(start, end))
					} else {
						Box::new(true.into_sql::<Bool>().eq(true))
					};

				reservation
					.filter(date_filter)
					.group_by(museum_section)
					.select((
						museum_section,
						count_star(),
						sum(number_of_visitors),
					))
					.order(museum_section.asc())
					.get_results(conn)
			})
			.await??;

		let reports = rows
			.into_iter()
			.map(|(section, reservations, visitors)| Self {
				section,
				reservations,
				visitors: visitors.unwrap_or(0),
			})
			.collect();

		Ok(reports)
	}
}

/// Booking totals for one hour of the visit day
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TimeSlotReport {
	pub hour:         u32,
	pub reservations: i64,
	pub visitors:     i64,
}

impl TimeSlotReport {
	/// Per-hour booking totals for visits inside a window
	///
	/// The two half-hour slots of each hour fold into a single bucket
	#[instrument(skip(conn))]
	pub async fn for_window(
		window: ReportWindow,
		today: NaiveDate,
		conn: &DbConn,
	) -> Result<Vec<Self>, Error> {
		let range = window.date_range(today);

		let rows: Vec<(chrono::NaiveTime, i64, Option<i64>)> = conn
			.interact(move |conn| {
				use diesel::dsl::{count_star, sum};

				use crate::schema::reservation::dsl::*;

				let date_filter: BoxedCondition<_, Bool> =
					if let Some((start, end)) = range {
						Box::new(visit_date.between(start, end))
					} else {
						Box::new(true.into_sql::<Bool>().eq(true))
					};

				reservation
					.filter(date_filter)
					.group_by(visit_time)
					.select((
						visit_time,
						count_star(),
						sum(number_of_visitors),
					))
					.get_results(conn)
			})
			.await??;

		let mut buckets: BTreeMap<u32, (i64, i64)> = BTreeMap::new();

		for (time, reservations, visitors) in rows {
			let bucket = buckets.entry(time.hour()).or_default();

			bucket.0 += reservations;
			bucket.1 += visitors.unwrap_or(0);
		}

		let reports = buckets
			.into_iter()
			.map(|(hour, (reservations, visitors))| Self {
				hour,
				reservations,
				visitors,
			})
			.collect();

		Ok(reports)
	}
}

/// Sort key for the visitor listing
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum VisitorSortBy {
	#[default]
	Name,
	Email,
	LastVisit,
	Visits,
}

/// Sort direction for the visitor listing
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
	#[default]
	Asc,
	Desc,
}

/// Visitor listing filters
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorFilter {
	pub search:     Option<String>,
	#[serde(default)]
	pub sort_by:    VisitorSortBy,
	#[serde(default)]
	pub sort_order: SortOrder,
}

impl VisitorFilter {
	/// Sort visitor groups by the requested key and direction
	pub fn sort(&self, visitors: &mut [VisitorReport]) {
		match self.sort_by {
			VisitorSortBy::Name => {
				visitors.sort_by(|a, b| a.visitor_name.cmp(&b.visitor_name));
			},
			VisitorSortBy::Email => {
				visitors.sort_by(|a, b| a.visitor_email.cmp(&b.visitor_email));
			},
			VisitorSortBy::LastVisit => {
				visitors.sort_by_key(|v| v.last_visit);
			},
			VisitorSortBy::Visits => visitors.sort_by_key(|v| v.visits),
		}

		if matches!(self.sort_order, SortOrder::Desc) {
			visitors.reverse();
		}
	}
}

/// Aggregated bookings for one visitor identity
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct VisitorReport {
	pub visitor_name:  String,
	pub visitor_email: String,
	pub visits:        i64,
	pub total_guests:  i64,
	pub last_visit:    Option<NaiveDate>,
}

impl VisitorReport {
	/// Group all bookings by visitor name and email
	#[instrument(skip(conn))]
	pub async fn all_grouped(
		filter: VisitorFilter,
		conn: &DbConn,
	) -> Result<Vec<Self>, Error> {
		let search = filter.search.clone();

		let rows: Vec<(String, String, i64, Option<i64>, Option<NaiveDate>)> =
			conn.interact(move |conn| {
				use diesel::dsl::{count_star, max, sum};

				use crate::schema::reservation::dsl::*;

				let search_filter: BoxedCondition<_, Bool> = match search {
					Some(term) => {
						let pattern = format!("%{term}%");

						Box::new(
							visitor_name
								.ilike(pattern.clone())
								.or(visitor_email.ilike(pattern)),
						)
					},
					None => Box::new(true.into_sql::<Bool>().eq(true)),
				};

				reservation
					.filter(search_filter)
					.group_by((visitor_name, visitor_email))
					.select((
						visitor_name,
						visitor_email,
						count_star(),
						sum(number_of_visitors),
						max(visit_date),
					))
					.get_results(conn)
			})
			.await??;

		let mut visitors: Vec<Self> = rows
			.into_iter()
			.map(|(name, email, visits, guests, last)| Self {
				visitor_name:  name,
				visitor_email: email,
				visits,
				total_guests:  guests.unwrap_or(0),
				last_visit:    last,
			})
			.collect();

		filter.sort(&mut visitors);

		Ok(visitors)
	}
}
