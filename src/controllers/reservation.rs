use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{NaiveDate, NaiveTime, Utc};
use common::{BookingError, CheckInError, DbPool, Error};
use models::{
	Museum,
	NewReservation,
	Reservation,
	ReservationFilter,
	generate_reservation_code,
	render_qr_data_url,
};
use validator::Validate;

use crate::controllers::or_default;
use crate::schemas::reservation::{
	CreateReservationRequest,
	LookupQuery,
	ReservationResponse,
	SlotAvailabilityQuery,
	SlotAvailabilityResponse,
};

/// Upper bound on reservation code regeneration after collisions
const MAX_CODE_ATTEMPTS: usize = 5;

/// Check whether a single visit slot is still free
///
/// All four slot coordinates are required
#[instrument(skip(pool))]
pub async fn check_slot_availability(
	State(pool): State<DbPool>,
	Query(query): Query<SlotAvailabilityQuery>,
) -> Result<impl IntoResponse, Error> {
	let (m_id, section, date, time) = check_slot_query(query)?;

	let conn = pool.get().await?;

	let existing =
		Reservation::find_for_slot(m_id, section, date, time, &conn).await?;

	let response = SlotAvailabilityResponse {
		available:   existing.is_none(),
		conflicting: existing.map(|r| r.conflict_summary()),
	};

	Ok((StatusCode::OK, Json(response)))
}

fn check_slot_query(
	query: SlotAvailabilityQuery,
) -> Result<(String, String, NaiveDate, NaiveTime), Error> {
	let Some(museum_id) = query.museum_id else {
		return Err(Error::MissingRequestData("museumId".to_string()));
	};

	let Some(section) = query.section else {
		return Err(Error::MissingRequestData("section".to_string()));
	};

	let Some(date) = query.date else {
		return Err(Error::MissingRequestData("date".to_string()));
	};

	let Some(time) = query.time else {
		return Err(Error::MissingRequestData("time".to_string()));
	};

	Ok((museum_id, section, date, time.into()))
}

/// Book a visit slot
#[instrument(skip(pool))]
pub async fn create_reservation(
	State(pool): State<DbPool>,
	Json(request): Json<CreateReservationRequest>,
) -> Result<impl IntoResponse, Error> {
	request.validate()?;

	let visit_time: NaiveTime = request.visit_time.into();
	check_slot_time(visit_time)?;

	let conn = pool.get().await?;

	let Some(museum) =
		Museum::find_by_id(request.museum_id.clone(), &conn).await?
	else {
		return Err(Error::NotFound(format!("museum {}", request.museum_id)));
	};

	check_section(&museum, &request.museum_section)?;

	// Fast-path probe, the unique slot index still arbitrates races
	let existing = Reservation::find_for_slot(
		request.museum_id.clone(),
		request.museum_section.clone(),
		request.visit_date,
		visit_time,
		&conn,
	)
	.await?;

	if let Some(existing) = existing {
		return Err(BookingError::SlotTaken(Some(existing.conflict_summary()))
			.into());
	}

	for _ in 0..MAX_CODE_ATTEMPTS {
		let code = generate_reservation_code();
		let qr_code_data = render_qr_data_url(&code)?;

		let new_reservation = NewReservation {
			reservation_code: code,
			visitor_name: request.visitor_name.clone(),
			visitor_email: request.visitor_email.clone(),
			number_of_visitors: request.number_of_visitors,
			museum_id: request.museum_id.clone(),
			museum_section: request.museum_section.clone(),
			visit_date: request.visit_date,
			visit_time,
			qr_code_data,
		};

		match new_reservation.insert(&conn).await {
			Ok(reservation) => {
				let response =
					ReservationResponse::from((reservation, museum.clone()));

				return Ok((StatusCode::CREATED, Json(response)));
			},
			Err(Error::BookingError(BookingError::SlotTaken(conflict))) => {
				// Lost the insert race, surface the winning booking
				let conflict = match conflict {
					Some(conflict) => Some(conflict),
					None => Reservation::find_for_slot(
						request.museum_id.clone(),
						request.museum_section.clone(),
						request.visit_date,
						visit_time,
						&conn,
					)
					.await?
					.map(|r| r.conflict_summary()),
				};

				return Err(BookingError::SlotTaken(conflict).into());
			},
			Err(Error::BookingError(BookingError::CodeCollision)) => {
				warn!("reservation code collision, regenerating");
			},
			Err(err) => return Err(err),
		}
	}

	error!(
		"could not find a free reservation code after {MAX_CODE_ATTEMPTS} \
		 attempts"
	);

	Err(Error::InternalServerError)
}

fn check_slot_time(time: NaiveTime) -> Result<(), Error> {
	if !Reservation::is_slot_time(time) {
		return Err(Error::ValidationError(format!(
			"visitTime {} is not a bookable slot",
			time.format("%H:%M")
		)));
	}

	Ok(())
}

fn check_section(museum: &Museum, section: &str) -> Result<(), Error> {
	if !museum.has_section(section) {
		return Err(BookingError::UnknownSection {
			section:   section.to_string(),
			available: museum.sections.clone(),
		}
		.into());
	}

	Ok(())
}

/// Get all reservations matching the given admin filters
#[instrument(skip(pool))]
pub async fn get_reservations(
	State(pool): State<DbPool>,
	Query(filter): Query<ReservationFilter>,
) -> Result<impl IntoResponse, Error> {
	let reservations = or_default(list_reservations(filter, &pool).await)?;
	let response: Vec<ReservationResponse> =
		reservations.into_iter().map(Into::into).collect();

	Ok((StatusCode::OK, Json(response)))
}

async fn list_reservations(
	filter: ReservationFilter,
	pool: &DbPool,
) -> Result<Vec<(Reservation, Museum)>, Error> {
	let conn = pool.get().await?;

	Reservation::all_filtered(filter, &conn).await
}

/// Get all reservations booked under a visitor email, newest first
#[instrument(skip(pool))]
pub async fn lookup_reservations(
	State(pool): State<DbPool>,
	Query(query): Query<LookupQuery>,
) -> Result<impl IntoResponse, Error> {
	let Some(email) = query.email else {
		return Err(Error::MissingRequestData("email".to_string()));
	};

	let conn = pool.get().await?;

	let reservations = Reservation::for_email(email.clone(), &conn).await?;

	if reservations.is_empty() {
		return Err(Error::NotFound(format!("reservations for {email}")));
	}

	let response: Vec<ReservationResponse> =
		reservations.into_iter().map(Into::into).collect();

	Ok((StatusCode::OK, Json(response)))
}

/// Get a single reservation by its code
#[instrument(skip(pool))]
pub async fn get_reservation(
	State(pool): State<DbPool>,
	Path(code): Path<String>,
) -> Result<impl IntoResponse, Error> {
	let code = code.to_uppercase();

	let conn = pool.get().await?;

	let Some(found) = Reservation::find_by_code(code.clone(), &conn).await?
	else {
		return Err(Error::NotFound(format!("reservation {code}")));
	};

	Ok((StatusCode::OK, Json(ReservationResponse::from(found))))
}

/// Check in the reservation with the given code
#[instrument(skip(pool))]
pub async fn check_in_reservation(
	State(pool): State<DbPool>,
	Path(code): Path<String>,
) -> Result<impl IntoResponse, Error> {
	let code = code.to_uppercase();

	let conn = pool.get().await?;

	let Some((reservation, museum)) =
		Reservation::find_by_code(code.clone(), &conn).await?
	else {
		return Err(Error::NotFound(format!("reservation {code}")));
	};

	if reservation.checked_in {
		return Err(CheckInError::AlreadyCheckedIn {
			checked_in_at: reservation.checked_in_at,
		}
		.into());
	}

	let now = Utc::now().naive_utc();
	check_visit_window(reservation.visit_date, now.date())?;

	let Some(updated) =
		Reservation::check_in(code.clone(), now, &conn).await?
	else {
		// A concurrent scan claimed the row between lookup and update
		let checked_in_at = Reservation::find_by_code(code, &conn)
			.await?
			.and_then(|(r, _)| r.checked_in_at);

		return Err(CheckInError::AlreadyCheckedIn { checked_in_at }.into());
	};

	Ok((StatusCode::OK, Json(ReservationResponse::from((updated, museum)))))
}

fn check_visit_window(
	visit_date: NaiveDate,
	today: NaiveDate,
) -> Result<(), Error> {
	// One day of tolerance on either side absorbs timezone skew
	let offset = (visit_date - today).num_days().abs();

	if offset > 1 {
		return Err(CheckInError::DateMismatch { visit_date }.into());
	}

	Ok(())
}
