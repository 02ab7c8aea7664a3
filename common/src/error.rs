//! Library-wide error types and [`From`] impls

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{NaiveDate, NaiveDateTime};
use diesel::result::DatabaseErrorKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unique index guarding one reservation per museum/section/date/time slot
pub const RESERVATION_SLOT_KEY: &str = "reservation_slot_key";
/// Unique index guarding reservation code uniqueness
pub const RESERVATION_CODE_KEY: &str = "reservation_code_key";

/// Top level application error, can be converted into a [`Response`]
#[derive(Debug, Error)]
pub enum Error {
	/// Opaque internal server error
	#[error("internal server error")]
	InternalServerError,
	/// Resource not found
	#[error("not found - {0}")]
	NotFound(String),
	/// Some data in the request was missing
	#[error("missing request data - {0}")]
	MissingRequestData(String),
	/// Any error related to booking a visit
	#[error(transparent)]
	BookingError(#[from] BookingError),
	/// Any error related to checking in a visitor
	#[error(transparent)]
	CheckInError(#[from] CheckInError),
	/// Resource could not be validated
	#[error("{0}")]
	ValidationError(String),
}

impl Error {
	/// Return a unique identifying code for this error
	///
	/// When modifying this function the error code should only ever increase,
	/// an error code should never be reused once its assigned to avoid
	/// unexpectedly breaking the frontend
	fn code(&self) -> i32 {
		match self {
			Self::InternalServerError => 1,
			Self::NotFound(_) => 2,
			Self::MissingRequestData(_) => 3,
			Self::ValidationError(_) => 4,
			Self::BookingError(e) => {
				match e {
					BookingError::SlotTaken(_) => 5,
					BookingError::CodeCollision => 6,
					BookingError::UnknownSection { .. } => 7,
				}
			},
			Self::CheckInError(e) => {
				match e {
					CheckInError::AlreadyCheckedIn { .. } => 8,
					CheckInError::DateMismatch { .. } => 9,
				}
			},
		}
	}

	/// Return additional information about the error
	fn info(&self) -> Option<String> {
		match self {
			Self::NotFound(m)
			| Self::MissingRequestData(m)
			| Self::ValidationError(m) => Some(m.to_owned()),
			Self::BookingError(e) => {
				match e {
					BookingError::SlotTaken(Some(conflict)) => {
						serde_json::to_string(conflict).ok()
					},
					BookingError::SlotTaken(None)
					| BookingError::CodeCollision => None,
					BookingError::UnknownSection { section, available } => {
						Some(
							serde_json::json!({
								"section": section,
								"available": available,
							})
							.to_string(),
						)
					},
				}
			},
			Self::CheckInError(e) => {
				match e {
					CheckInError::AlreadyCheckedIn { checked_in_at } => {
						Some(
							serde_json::json!({"checkedInAt": checked_in_at})
								.to_string(),
						)
					},
					CheckInError::DateMismatch { visit_date } => {
						Some(
							serde_json::json!({"visitDate": visit_date})
								.to_string(),
						)
					},
				}
			},
			Self::InternalServerError => None,
		}
	}
}

/// Convert an error into a [`Response`]
impl IntoResponse for Error {
	fn into_response(self) -> Response {
		error!("{self:?}");

		let message = self.to_string();

		let data = serde_json::json!({
			"message": message,
			"code": self.code(),
			"info": self.info(),
		});

		let status = match self {
			Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
			Self::NotFound(_) => StatusCode::NOT_FOUND,
			Self::BookingError(
				BookingError::SlotTaken(_) | BookingError::CodeCollision,
			)
			| Self::CheckInError(CheckInError::AlreadyCheckedIn { .. }) => {
				StatusCode::CONFLICT
			},
			Self::CheckInError(CheckInError::DateMismatch { .. }) => {
				StatusCode::BAD_REQUEST
			},
			Self::BookingError(BookingError::UnknownSection { .. })
			| Self::MissingRequestData(_)
			| Self::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
		};

		(status, axum::Json(data)).into_response()
	}
}

/// Summary of the booking occupying a requested slot
///
/// Deliberately excludes the visitor email so conflict responses never leak
/// contact details to other visitors
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictingReservation {
	pub reservation_code:   String,
	pub visitor_name:       String,
	pub number_of_visitors: i32,
}

/// Any error related to booking a visit
#[derive(Debug, Error)]
pub enum BookingError {
	/// The requested slot is already held by another reservation
	#[error("this time slot has already been reserved")]
	SlotTaken(Option<ConflictingReservation>),
	/// A freshly generated reservation code is already in use
	#[error("generated reservation code is already in use")]
	CodeCollision,
	/// The requested section does not belong to the museum
	#[error("museum has no such section")]
	UnknownSection { section: String, available: Vec<String> },
}

/// Any error related to checking in a visitor
#[derive(Debug, Error)]
pub enum CheckInError {
	/// The reservation was already used to enter
	#[error("reservation has already been checked in")]
	AlreadyCheckedIn { checked_in_at: Option<NaiveDateTime> },
	/// The visit date is too far from today for entry
	#[error("reservation cannot be checked in today")]
	DateMismatch { visit_date: NaiveDate },
}

/// A list of possible internal errors
///
/// API end users should never see these details
#[derive(Debug, Error)]
pub enum InternalServerError {
	/// Error executing some database operation
	#[error("database error -- {0:?}")]
	DatabaseError(diesel::result::Error),
	/// Error interacting with a database connection
	#[error("database interaction error -- {0:?}")]
	DatabaseInteractionError(deadpool_diesel::InteractError),
	/// Error encoding a ticket image
	#[error("image error -- {0:?}")]
	ImageError(image::ImageError),
	/// Error building a QR symbol
	#[error("qr error -- {0:?}")]
	QrError(qrcode::types::QrError),
	/// Error acquiring database pool connection
	#[error("database pool error -- {0:?}")]
	PoolError(deadpool_diesel::PoolError),
}

// Map internal server errors to application errors
impl From<InternalServerError> for Error {
	fn from(value: InternalServerError) -> Self {
		error!("internal server error -- {value}");

		Self::InternalServerError
	}
}

/// Map validation errors to application errors
impl From<validator::ValidationErrors> for Error {
	fn from(err: validator::ValidationErrors) -> Self {
		let errs = err.field_errors();
		let repr = errs
			.values()
			.map(|v| {
				v.iter()
					.map(ToString::to_string)
					.collect::<Vec<String>>()
					.join("\n")
			})
			.collect::<Vec<String>>()
			.join("\n");

		Self::ValidationError(repr)
	}
}

/// Map database interaction errors to application errors
impl From<deadpool_diesel::InteractError> for Error {
	fn from(value: deadpool_diesel::InteractError) -> Self {
		InternalServerError::DatabaseInteractionError(value).into()
	}
}

/// Map database result errors to application errors.
impl From<diesel::result::Error> for Error {
	fn from(err: diesel::result::Error) -> Self {
		match &err {
			// No rows returned by query that expected at least one
			diesel::result::Error::NotFound => {
				Self::NotFound("no context provided".to_string())
			},
			// Unique constraint violation
			diesel::result::Error::DatabaseError(
				DatabaseErrorKind::UniqueViolation,
				info,
			) => {
				match info.constraint_name() {
					Some(RESERVATION_SLOT_KEY) => {
						BookingError::SlotTaken(None).into()
					},
					Some(RESERVATION_CODE_KEY) => {
						BookingError::CodeCollision.into()
					},
					_ => InternalServerError::DatabaseError(err).into(),
				}
			},
			// Foreign key constraint violation
			diesel::result::Error::DatabaseError(
				DatabaseErrorKind::ForeignKeyViolation,
				info,
			) => Error::ValidationError(info.message().to_string()),
			_ => InternalServerError::DatabaseError(err).into(),
		}
	}
}

impl From<deadpool_diesel::PoolError> for Error {
	fn from(value: deadpool_diesel::PoolError) -> Self {
		InternalServerError::PoolError(value).into()
	}
}

impl From<image::ImageError> for Error {
	fn from(value: image::ImageError) -> Self {
		InternalServerError::ImageError(value).into()
	}
}

impl From<qrcode::types::QrError> for Error {
	fn from(value: qrcode::types::QrError) -> Self {
		InternalServerError::QrError(value).into()
	}
}
