use deadpool_diesel::postgres::{Manager, Pool};

/// App configuration loaded from the environment
#[derive(Clone, Debug)]
pub struct Config {
	pub database_url: String,

	pub museum_seed_file: Option<String>,
}

impl Config {
	/// Read the configuration from environment variables
	///
	/// # Panics
	/// Panics if `DATABASE_URL` is missing
	#[must_use]
	pub fn from_env() -> Self {
		let database_url =
			std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

		let museum_seed_file = std::env::var("MUSEUM_SEED_FILE").ok();

		Self { database_url, museum_seed_file }
	}

	/// Create a database pool for the given config
	///
	/// # Panics
	/// Panics if creating the pool fails
	#[must_use]
	pub fn create_database_pool(&self) -> Pool {
		let manager = Manager::new(
			self.database_url.to_string(),
			deadpool_diesel::Runtime::Tokio1,
		);

		Pool::builder(manager).build().unwrap()
	}
}
