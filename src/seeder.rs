use std::path::PathBuf;

use common::{DbConn, Error};
use diesel::prelude::*;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Loads JSON seed files into the database
pub struct Seeder<'c> {
	connection: &'c DbConn,
}

impl<'c> Seeder<'c> {
	#[must_use]
	pub fn new(connection: &'c DbConn) -> Self { Self { connection } }

	/// Read a file into a series of deserializable items
	///
	/// # Panics
	/// Panics if reading or deserializing the file fails
	fn read_file_records<T, I>(filename: &str) -> I
	where
		T: DeserializeOwned,
		I: IntoIterator<Item = T> + DeserializeOwned,
	{
		let path = std::env::var("CARGO_MANIFEST_DIR")
			.map(PathBuf::from)
			.unwrap_or_default()
			.join(filename);

		let s = std::fs::read_to_string(path)
			.expect(&format!("COULD NOT READ SEED FILE {filename}"));

		serde_json::from_str(&s)
			.expect(&format!("COULD NOT MAP SEED FILE {filename}"))
	}

	/// Load a file and populate the database with it
	///
	/// # Panics
	/// Panics if reading the file or interacting with the database fails
	pub async fn populate<'s, T, F>(
		&'s self,
		filename: &str,
		loader: F,
	) -> &'s Self
	where
		T: DeserializeOwned + std::fmt::Debug,
		F: AsyncFnOnce(&DbConn, Vec<T>) -> Result<(), Error>,
	{
		let records = Self::read_file_records(filename);

		loader(self.connection, records)
			.await
			.expect(&format!("COULD NOT LOAD RECORDS FOR {filename}"));

		info!("seeded database from {filename}");

		self
	}
}

/// A museum record from a seed file
#[derive(Clone, Debug, Deserialize)]
pub struct SeedMuseum {
	pub id:              String,
	pub name:            String,
	pub description:     String,
	pub location:        String,
	pub opening_hours:   String,
	pub admission_price: String,
	#[serde(default)]
	pub image_url:       Option<String>,
	pub sections:        Vec<String>,
}

#[derive(Clone, Debug, Insertable, AsChangeset)]
#[diesel(table_name = models::schema::museum)]
struct InsertableSeedMuseum {
	id:              String,
	name:            String,
	description:     String,
	location:        String,
	opening_hours:   String,
	admission_price: String,
	image_url:       Option<String>,
	sections:        Vec<String>,
}

impl SeedMuseum {
	/// Insert this [`SeedMuseum`], updating the record if it already exists
	pub async fn insert(self, conn: &DbConn) -> Result<(), Error> {
		let insertable = InsertableSeedMuseum {
			id:              self.id,
			name:            self.name,
			description:     self.description,
			location:        self.location,
			opening_hours:   self.opening_hours,
			admission_price: self.admission_price,
			image_url:       self.image_url,
			sections:        self.sections,
		};

		conn.interact(|conn| {
			use models::schema::museum::dsl::*;

			diesel::insert_into(museum)
				.values(insertable.clone())
				.on_conflict(id)
				.do_update()
				.set(insertable)
				.execute(conn)
		})
		.await??;

		Ok(())
	}
}
