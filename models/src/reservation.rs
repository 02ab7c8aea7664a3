use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use common::{ConflictingReservation, DbConn, Error};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::Bool;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Museum;
use crate::schema::{museum, reservation};

type BoxedCondition<S, T = Bool> =
	Box<dyn BoxableExpression<S, Pg, SqlType = T>>;

trait ToFilter<S> {
	type SqlType;

	fn to_filter(&self) -> BoxedCondition<S, Self::SqlType>;
}

/// A single booked museum visit
#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = reservation)]
#[diesel(check_for_backend(Pg))]
pub struct Reservation {
	pub id:                 String,
	pub reservation_code:   String,
	pub visitor_name:       String,
	pub visitor_email:      String,
	pub number_of_visitors: i32,
	pub museum_id:          String,
	pub museum_section:     String,
	pub visit_date:         NaiveDate,
	pub visit_time:         NaiveTime,
	pub checked_in:         bool,
	pub checked_in_at:      Option<NaiveDateTime>,
	pub qr_code_data:       String,
	pub created_at:         NaiveDateTime,
}

/// Check-in status filter for reservation listings
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReservationStatus {
	CheckedIn,
	Pending,
}

/// Admin listing filters
///
/// Date bounds apply to the visit date, not the booking date
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationFilter {
	pub date_from: Option<NaiveDate>,
	pub date_to:   Option<NaiveDate>,
	pub section:   Option<String>,
	pub status:    Option<ReservationStatus>,
	pub search:    Option<String>,
}

impl<S> ToFilter<S> for ReservationFilter
where
	S: 'static,
	reservation::visit_date: SelectableExpression<S>,
	reservation::museum_section: SelectableExpression<S>,
	reservation::checked_in: SelectableExpression<S>,
	reservation::visitor_name: SelectableExpression<S>,
	reservation::visitor_email: SelectableExpression<S>,
	reservation::reservation_code: SelectableExpression<S>,
{
	type SqlType = Bool;

	fn to_filter(&self) -> BoxedCondition<S, Self::SqlType> {
		let mut filter: BoxedCondition<S, Self::SqlType> =
			Box::new(true.into_sql::<Bool>().eq(true));

		if let Some(date_from) = self.date_from {
			filter =
				Box::new(filter.and(reservation::visit_date.ge(date_from)));
		}

		if let Some(date_to) = self.date_to {
			filter = Box::new(filter.and(reservation::visit_date.le(date_to)));
		}

		if let Some(section) = self.section.clone() {
			filter =
				Box::new(filter.and(reservation::museum_section.eq(section)));
		}

		if let Some(status) = self.status {
			let checked = matches!(status, ReservationStatus::CheckedIn);

			filter = Box::new(filter.and(reservation::checked_in.eq(checked)));
		}

		if let Some(search) = self.search.clone() {
			let pattern = format!("%{search}%");

			filter = Box::new(
				filter.and(
					reservation::visitor_name
						.ilike(pattern.clone())
						.or(reservation::visitor_email.ilike(pattern.clone()))
						.or(reservation::reservation_code.ilike(pattern)),
				),
			);
		}

		filter
	}
}

impl Reservation {
	/// All bookable time slots in a visit day
	///
	/// Half-hour slots from 09:00 up to and including 16:00
	#[must_use]
	pub fn slot_times() -> Vec<NaiveTime> {
		let mut slots = Vec::new();

		for hour in 9..=16 {
			for minute in [0, 30] {
				if hour == 16 && minute == 30 {
					continue;
				}

				if let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) {
					slots.push(time);
				}
			}
		}

		slots
	}

	/// Whether the given time is a bookable slot
	#[must_use]
	pub fn is_slot_time(time: NaiveTime) -> bool {
		Self::slot_times().contains(&time)
	}

	/// Summarize this reservation for a slot conflict response
	///
	/// The visitor's email address is deliberately left out
	#[must_use]
	pub fn conflict_summary(&self) -> ConflictingReservation {
		ConflictingReservation {
			reservation_code:   self.reservation_code.clone(),
			visitor_name:       self.visitor_name.clone(),
			number_of_visitors: self.number_of_visitors,
		}
	}

	/// Find a [`Reservation`] and its museum by reservation code
	#[instrument(skip(conn))]
	pub async fn find_by_code(
		code: String,
		conn: &DbConn,
	) -> Result<Option<(Self, Museum)>, Error> {
		let reservation = conn
			.interact(move |conn| {
				use crate::schema::reservation::dsl::*;

				reservation
					.inner_join(museum::table)
					.filter(reservation_code.eq(code))
					.select((Self::as_select(), Museum::as_select()))
					.first(conn)
					.optional()
			})
			.await??;

		Ok(reservation)
	}

	/// Find the reservation currently holding a visit slot, if any
	#[instrument(skip(conn))]
	pub async fn find_for_slot(
		m_id: String,
		section: String,
		date: NaiveDate,
		time: NaiveTime,
		conn: &DbConn,
	) -> Result<Option<Self>, Error> {
		let reservation = conn
			.interact(move |conn| {
				use crate::schema::reservation::dsl::*;

				reservation
					.filter(
						museum_id
							.eq(m_id)
							.and(museum_section.eq(section))
							.and(visit_date.eq(date))
							.and(visit_time.eq(time)),
					)
					.select(Self::as_select())
					.first(conn)
					.optional()
			})
			.await??;

		Ok(reservation)
	}

	/// Get all reservations for a visitor email, newest booking first
	#[instrument(skip(conn))]
	pub async fn for_email(
		email: String,
		conn: &DbConn,
	) -> Result<Vec<(Self, Museum)>, Error> {
		let reservations = conn
			.interact(move |conn| {
				use crate::schema::reservation::dsl::*;

				reservation
					.inner_join(museum::table)
					.filter(visitor_email.eq(email))
					.select((Self::as_select(), Museum::as_select()))
					.order(created_at.desc())
					.get_results(conn)
			})
			.await??;

		Ok(reservations)
	}

	/// Get all reservations matching a [`ReservationFilter`]
	///
	/// Ordered chronologically by visit date and time
	#[instrument(skip(conn))]
	pub async fn all_filtered(
		res_filter: ReservationFilter,
		conn: &DbConn,
	) -> Result<Vec<(Self, Museum)>, Error> {
		let reservations = conn
			.interact(move |conn| {
				use crate::schema::reservation::dsl::*;

				let filter = res_filter.to_filter();

				reservation
					.inner_join(museum::table)
					.filter(filter)
					.select((Self::as_select(), Museum::as_select()))
					.order((visit_date.asc(), visit_time.asc()))
					.get_results(conn)
			})
			.await??;

		Ok(reservations)
	}

	/// Get all reservations for a museum on a given visit date
	#[instrument(skip(conn))]
	pub async fn for_museum_date(
		m_id: String,
		date: NaiveDate,
		conn: &DbConn,
	) -> Result<Vec<Self>, Error> {
		let reservations = conn
			.interact(move |conn| {
				use crate::schema::reservation::dsl::*;

				reservation
					.filter(museum_id.eq(m_id).and(visit_date.eq(date)))
					.select(Self::as_select())
					.get_results(conn)
			})
			.await??;

		Ok(reservations)
	}

	/// Atomically mark the reservation with the given code as checked in
	///
	/// Returns [`None`] when no row was claimed, either because the code does
	/// not exist or because another scan got there first
	#[instrument(skip(conn))]
	pub async fn check_in(
		code: String,
		now: NaiveDateTime,
		conn: &DbConn,
	) -> Result<Option<Self>, Error> {
		let reservation = conn
			.interact(move |conn| {
				use crate::schema::reservation::dsl::*;

				diesel::update(
					reservation.filter(
						reservation_code.eq(code).and(checked_in.eq(false)),
					),
				)
				.set((checked_in.eq(true), checked_in_at.eq(now)))
				.returning(Self::as_returning())
				.get_result(conn)
				.optional()
			})
			.await??;

		Ok(reservation)
	}
}

/// A new reservation waiting to be inserted
///
/// Check-in state and the booking timestamp are left to their column defaults
#[derive(Clone, Debug, Deserialize, Insertable, Serialize)]
#[diesel(table_name = reservation)]
#[diesel(check_for_backend(Pg))]
pub struct NewReservation {
	pub reservation_code:   String,
	pub visitor_name:       String,
	pub visitor_email:      String,
	pub number_of_visitors: i32,
	pub museum_id:          String,
	pub museum_section:     String,
	pub visit_date:         NaiveDate,
	pub visit_time:         NaiveTime,
	pub qr_code_data:       String,
}

impl NewReservation {
	/// Insert this [`NewReservation`]
	///
	/// Slot and code collisions surface as unique constraint violations and
	/// are mapped to their respective errors
	#[instrument(skip(conn))]
	pub async fn insert(self, conn: &DbConn) -> Result<Reservation, Error> {
		let new_id = Uuid::new_v4().simple().to_string();

		let reservation = conn
			.interact(move |conn| {
				use self::reservation::dsl::*;

				diesel::insert_into(reservation)
					.values((id.eq(new_id), &self))
					.returning(Reservation::as_returning())
					.get_result(conn)
			})
			.await??;

		info!(
			"created reservation {} with code {}",
			reservation.id, reservation.reservation_code
		);

		Ok(reservation)
	}
}

/// A reservation insert that sets every column explicitly
///
/// Used to fabricate historical bookings with a known check-in state and
/// booking timestamp
#[derive(Clone, Debug, Deserialize, Insertable, Serialize)]
#[diesel(table_name = reservation)]
#[diesel(check_for_backend(Pg))]
pub struct NewReservationDirect {
	pub id:                 String,
	pub reservation_code:   String,
	pub visitor_name:       String,
	pub visitor_email:      String,
	pub number_of_visitors: i32,
	pub museum_id:          String,
	pub museum_section:     String,
	pub visit_date:         NaiveDate,
	pub visit_time:         NaiveTime,
	pub checked_in:         bool,
	pub checked_in_at:      Option<NaiveDateTime>,
	pub qr_code_data:       String,
	pub created_at:         NaiveDateTime,
}

impl NewReservationDirect {
	/// Insert this [`NewReservationDirect`]
	#[instrument(skip(conn))]
	pub async fn insert(self, conn: &DbConn) -> Result<Reservation, Error> {
		let reservation = conn
			.interact(|conn| {
				use self::reservation::dsl::*;

				diesel::insert_into(reservation)
					.values(self)
					.returning(Reservation::as_returning())
					.get_result(conn)
			})
			.await??;

		Ok(reservation)
	}
}
