use chrono::{NaiveDate, NaiveDateTime};
use common::ConflictingReservation;
use models::Museum;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use validator_derive::Validate;

use crate::schemas::SlotTime;

/// Request body for creating a museum
#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMuseumRequest {
	#[validate(length(
		min = 1,
		message = "name must not be empty",
		code = "name-length"
	))]
	pub name:            String,
	#[serde(default)]
	pub description:     String,
	#[validate(length(
		min = 1,
		message = "location must not be empty",
		code = "location-length"
	))]
	pub location:        String,
	#[validate(length(
		min = 1,
		message = "openingHours must not be empty",
		code = "opening-hours-length"
	))]
	pub opening_hours:   String,
	#[serde(default)]
	pub admission_price: String,
	#[serde(default)]
	pub image_url:       Option<String>,
	#[serde(default)]
	pub sections:        Vec<String>,
}

#[skip_serializing_none]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MuseumResponse {
	pub id:              String,
	pub name:            String,
	pub description:     String,
	pub location:        String,
	pub opening_hours:   String,
	pub admission_price: String,
	pub image_url:       Option<String>,
	pub sections:        Vec<String>,
	pub created_at:      NaiveDateTime,
}

impl From<Museum> for MuseumResponse {
	fn from(museum: Museum) -> Self {
		Self {
			id:              museum.id,
			name:            museum.name,
			description:     museum.description,
			location:        museum.location,
			opening_hours:   museum.opening_hours,
			admission_price: museum.admission_price,
			image_url:       museum.image_url,
			sections:        museum.sections,
			created_at:      museum.created_at,
		}
	}
}

/// Museum display fields embedded in reservation responses
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MuseumSummary {
	pub id:              String,
	pub name:            String,
	pub location:        String,
	pub opening_hours:   String,
	pub admission_price: String,
}

impl From<Museum> for MuseumSummary {
	fn from(museum: Museum) -> Self {
		Self {
			id:              museum.id,
			name:            museum.name,
			location:        museum.location,
			opening_hours:   museum.opening_hours,
			admission_price: museum.admission_price,
		}
	}
}

/// Query string for the day availability grid
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
pub struct DayAvailabilityQuery {
	pub date: Option<NaiveDate>,
}

/// One bookable slot in the day grid
#[skip_serializing_none]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotAvailability {
	pub time:        SlotTime,
	pub available:   bool,
	pub conflicting: Option<ConflictingReservation>,
}

/// All slots of one museum section for a visit day
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionAvailability {
	pub section: String,
	pub slots:   Vec<SlotAvailability>,
}

/// The full booking grid of a museum for one visit day
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayAvailabilityResponse {
	pub date:     NaiveDate,
	pub sections: Vec<SectionAvailability>,
}
