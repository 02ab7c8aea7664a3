use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{NaiveDate, NaiveTime, Utc};
use common::{ConflictingReservation, DbPool, Error};
use models::{Museum, NewMuseum, Reservation};
use uuid::Uuid;
use validator::Validate;

use crate::controllers::or_default;
use crate::schemas::museum::{
	CreateMuseumRequest,
	DayAvailabilityQuery,
	DayAvailabilityResponse,
	MuseumResponse,
	SectionAvailability,
	SlotAvailability,
};

/// Get all museums, newest first
#[instrument(skip(pool))]
pub async fn get_museums(
	State(pool): State<DbPool>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let museums = Museum::get_all(&conn).await?;
	let response: Vec<MuseumResponse> =
		museums.into_iter().map(Into::into).collect();

	Ok((StatusCode::OK, Json(response)))
}

/// Create a new museum
#[instrument(skip(pool))]
pub async fn create_museum(
	State(pool): State<DbPool>,
	Json(request): Json<CreateMuseumRequest>,
) -> Result<impl IntoResponse, Error> {
	request.validate()?;

	let conn = pool.get().await?;

	let new_museum = NewMuseum {
		id:              Uuid::new_v4().simple().to_string(),
		name:            request.name,
		description:     request.description,
		location:        request.location,
		opening_hours:   request.opening_hours,
		admission_price: request.admission_price,
		image_url:       request.image_url,
		sections:        request.sections,
	};

	let museum = new_museum.insert(&conn).await?;

	Ok((StatusCode::CREATED, Json(MuseumResponse::from(museum))))
}

/// Get a single museum by its id
#[instrument(skip(pool))]
pub async fn get_museum(
	State(pool): State<DbPool>,
	Path(m_id): Path<String>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let Some(museum) = Museum::find_by_id(m_id.clone(), &conn).await? else {
		return Err(Error::NotFound(format!("museum {m_id}")));
	};

	Ok((StatusCode::OK, Json(MuseumResponse::from(museum))))
}

/// Get the booking grid of a museum for one visit day
///
/// Defaults to the current UTC day when no date is given
#[instrument(skip(pool))]
pub async fn get_museum_availability(
	State(pool): State<DbPool>,
	Path(m_id): Path<String>,
	Query(query): Query<DayAvailabilityQuery>,
) -> Result<impl IntoResponse, Error> {
	let date = query.date.unwrap_or_else(|| Utc::now().date_naive());

	let sections = or_default(day_grid(m_id, date, &pool).await)?;
	let response = DayAvailabilityResponse { date, sections };

	Ok((StatusCode::OK, Json(response)))
}

async fn day_grid(
	m_id: String,
	date: NaiveDate,
	pool: &DbPool,
) -> Result<Vec<SectionAvailability>, Error> {
	let conn = pool.get().await?;

	let Some(museum) = Museum::find_by_id(m_id.clone(), &conn).await? else {
		return Err(Error::NotFound(format!("museum {m_id}")));
	};

	let reservations =
		Reservation::for_museum_date(m_id, date, &conn).await?;

	let mut booked: HashMap<(&str, NaiveTime), ConflictingReservation> =
		HashMap::new();

	for reservation in &reservations {
		booked.insert(
			(reservation.museum_section.as_str(), reservation.visit_time),
			reservation.conflict_summary(),
		);
	}

	let sections = museum
		.sections
		.iter()
		.map(|section| SectionAvailability {
			section: section.clone(),
			slots:   Reservation::slot_times()
				.into_iter()
				.map(|time| {
					let conflicting =
						booked.get(&(section.as_str(), time)).cloned();

					SlotAvailability {
						time: time.into(),
						available: conflicting.is_none(),
						conflicting,
					}
				})
				.collect(),
		})
		.collect();

	Ok(sections)
}
