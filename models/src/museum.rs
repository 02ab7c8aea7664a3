use chrono::NaiveDateTime;
use common::{DbConn, Error};
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::museum;

#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = museum)]
#[diesel(check_for_backend(Pg))]
pub struct Museum {
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

impl Museum {
	/// Get all museums, newest first
	#[instrument(skip(conn))]
	pub async fn get_all(conn: &DbConn) -> Result<Vec<Self>, Error> {
		let museums = conn
			.interact(|conn| {
				use crate::schema::museum::dsl::*;

				museum
					.order(created_at.desc())
					.select(Self::as_select())
					.get_results(conn)
			})
			.await??;

		Ok(museums)
	}

	/// Find a [`Museum`] by its id
	#[instrument(skip(conn))]
	pub async fn find_by_id(
		m_id: String,
		conn: &DbConn,
	) -> Result<Option<Self>, Error> {
		let museum = conn
			.interact(move |conn| {
				use crate::schema::museum::dsl::*;

				museum
					.find(m_id)
					.select(Self::as_select())
					.first(conn)
					.optional()
			})
			.await??;

		Ok(museum)
	}

	/// Whether the given section slug belongs to this museum
	#[must_use]
	pub fn has_section(&self, section: &str) -> bool {
		self.sections.iter().any(|s| s == section)
	}
}

#[derive(Clone, Debug, Deserialize, Insertable, Serialize)]
#[diesel(table_name = museum)]
#[diesel(check_for_backend(Pg))]
pub struct NewMuseum {
	pub id:              String,
	pub name:            String,
	pub description:     String,
	pub location:        String,
	pub opening_hours:   String,
	pub admission_price: String,
	pub image_url:       Option<String>,
	pub sections:        Vec<String>,
}

impl NewMuseum {
	/// Insert this [`NewMuseum`]
	#[instrument(skip(conn))]
	pub async fn insert(self, conn: &DbConn) -> Result<Museum, Error> {
		let museum = conn
			.interact(|conn| {
				use self::museum::dsl::*;

				diesel::insert_into(museum)
					.values(self)
					.returning(Museum::as_returning())
					.get_result(conn)
			})
			.await??;

		info!("created museum {}", museum.id);

		Ok(museum)
	}
}
