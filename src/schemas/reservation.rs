use chrono::{NaiveDate, NaiveDateTime};
use common::ConflictingReservation;
use models::{Museum, Reservation};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use validator_derive::Validate;

use crate::schemas::SlotTime;
use crate::schemas::museum::MuseumSummary;

/// Request body for booking a visit slot
#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
	#[validate(length(
		min = 1,
		max = 120,
		message = "visitorName must be between 1 and 120 characters long",
		code = "visitor-name-length"
	))]
	pub visitor_name:       String,
	#[validate(length(
		min = 1,
		message = "visitorEmail must not be empty",
		code = "visitor-email-length"
	))]
	pub visitor_email:      String,
	#[validate(range(
		min = 1,
		max = 5,
		message = "numberOfVisitors must be between 1 and 5",
		code = "number-of-visitors-range"
	))]
	pub number_of_visitors: i32,
	pub museum_id:          String,
	#[validate(length(
		min = 1,
		message = "museumSection must not be empty",
		code = "museum-section-length"
	))]
	pub museum_section:     String,
	pub visit_date:         NaiveDate,
	pub visit_time:         SlotTime,
}

#[skip_serializing_none]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
	pub id:                 String,
	pub reservation_code:   String,
	pub visitor_name:       String,
	pub visitor_email:      String,
	pub number_of_visitors: i32,
	pub museum:             MuseumSummary,
	pub museum_section:     String,
	pub visit_date:         NaiveDate,
	pub visit_time:         SlotTime,
	pub checked_in:         bool,
	pub checked_in_at:      Option<NaiveDateTime>,
	pub qr_code_data:       String,
	pub created_at:         NaiveDateTime,
}

impl From<(Reservation, Museum)> for ReservationResponse {
	fn from((reservation, museum): (Reservation, Museum)) -> Self {
		Self {
			id: reservation.id,
			reservation_code: reservation.reservation_code,
			visitor_name: reservation.visitor_name,
			visitor_email: reservation.visitor_email,
			number_of_visitors: reservation.number_of_visitors,
			museum: museum.into(),
			museum_section: reservation.museum_section,
			visit_date: reservation.visit_date,
			visit_time: reservation.visit_time.into(),
			checked_in: reservation.checked_in,
			checked_in_at: reservation.checked_in_at,
			qr_code_data: reservation.qr_code_data,
			created_at: reservation.created_at,
		}
	}
}

/// Query string for the single slot availability probe
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotAvailabilityQuery {
	pub museum_id: Option<String>,
	pub section:   Option<String>,
	pub date:      Option<NaiveDate>,
	pub time:      Option<SlotTime>,
}

/// Whether a single visit slot is still free
#[skip_serializing_none]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotAvailabilityResponse {
	pub available:   bool,
	pub conflicting: Option<ConflictingReservation>,
}

/// Query string for the reservation email lookup
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct LookupQuery {
	pub email: Option<String>,
}
