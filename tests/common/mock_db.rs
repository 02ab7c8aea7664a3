use std::sync::LazyLock;

use common::{DbConn, DbPool};
use deadpool_diesel::postgres::{Manager, Pool};
use diesel_migrations::{
	EmbeddedMigrations,
	MigrationHarness,
	embed_migrations,
};
use uuid::Uuid;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

/// Provisions one throwaway postgres database per test
pub static TEST_DATABASES: LazyLock<TestDatabases> =
	LazyLock::new(TestDatabases::connect);

pub struct TestDatabases {
	base_url:  String,
	root_pool: DbPool,
}

/// Handle to a provisioned database, dropped together with the test
pub struct TempDatabase {
	root_conn: DbConn,
	name:      String,
	url:       String,
}

impl TestDatabases {
	fn connect() -> Self {
		if std::env::var("CI").is_ok_and(|v| v == "true") {
			tracing_subscriber::fmt()
				.pretty()
				.with_thread_names(true)
				.with_max_level(tracing::Level::DEBUG)
				.init();
		}

		let database_url = std::env::var("DATABASE_URL").unwrap();
		let (base_url, _) = database_url.rsplit_once('/').unwrap();

		let manager = Manager::new(
			database_url.clone(),
			deadpool_diesel::Runtime::Tokio1,
		);

		Self {
			base_url:  base_url.to_string(),
			root_pool: Pool::builder(manager).build().unwrap(),
		}
	}

	/// Create a fresh database under a unique name
	///
	/// # Panics
	/// Panics if the maintenance connection or the CREATE DATABASE fails
	pub(crate) async fn provision(&self) -> TempDatabase {
		let name = format!("museo_test_{}", Uuid::new_v4().simple());
		let url = format!("{}/{name}", self.base_url);

		let root_conn = self
			.root_pool
			.get()
			.await
			.expect("could not get maintenance connection");

		let create_query = format!("CREATE DATABASE {name};");

		root_conn
			.interact(|conn| {
				use diesel::prelude::*;

				diesel::sql_query(create_query).execute(conn)
			})
			.await
			.expect("could not reach maintenance database")
			.expect("could not create test database");

		TempDatabase { root_conn, name, url }
	}
}

impl TempDatabase {
	/// Build a pool on this database and bring its schema up to date
	///
	/// # Panics
	/// Panics if the pool cannot be built or a migration fails
	#[must_use]
	pub fn pool(&self) -> DbPool {
		let manager =
			Manager::new(self.url.clone(), deadpool_diesel::Runtime::Tokio1);
		let pool = Pool::builder(manager).build().unwrap();

		futures::executor::block_on(async {
			let conn = pool.get().await.unwrap();
			conn.interact(|conn| {
				conn.run_pending_migrations(MIGRATIONS).map(|_| ())
			})
			.await
			.unwrap()
			.unwrap();
		});

		pool
	}
}

impl Drop for TempDatabase {
	fn drop(&mut self) {
		let drop_query =
			format!("DROP DATABASE {} WITH (FORCE);", self.name);

		futures::executor::block_on(async move {
			self.root_conn
				.interact(|conn| {
					use diesel::prelude::*;

					diesel::sql_query(drop_query).execute(conn)
				})
				.await
				.expect("could not reach maintenance database")
				.expect("could not drop test database");
		});
	}
}
