use axum_test::TestServer;
use chrono::{NaiveDate, NaiveTime, Utc};
use common::DbPool;
use models::{NewReservationDirect, Reservation};
use museo::{AppState, Config, SeedMuseum, Seeder, routes};
use uuid::Uuid;

mod mock_db;

use mock_db::{TEST_DATABASES, TempDatabase};

#[allow(dead_code)]
pub struct TestEnv {
	pub app:      TestServer,
	pub database: TempDatabase,
	pub pool:     DbPool,
}

impl TestEnv {
	/// Get a test environment with a oneshot seeded database
	///
	/// # Panics
	/// Panics if building the test server fails
	pub async fn new() -> Self {
		let config = Config::from_env();

		let database = (*TEST_DATABASES).provision().await;
		let test_pool = database.pool();

		{
			let conn = test_pool.get().await.unwrap();
			let seeder = Seeder::new(&conn);

			seeder
				.populate("seed/museums.json", async |conn, museums| {
					for museum in museums {
						SeedMuseum::insert(museum, conn).await?;
					}

					Ok(())
				})
				.await;
		}

		let state =
			AppState { config, database_pool: test_pool.clone() };
		let app = routes::get_app_router(state);

		let test_server = TestServer::builder().build(app).unwrap();

		TestEnv { app: test_server, database, pool: test_pool }
	}

	/// Insert a fully specified reservation row, bypassing the booking flow
	///
	/// # Panics
	/// Panics if the insert fails
	#[allow(dead_code)]
	pub async fn insert_direct(
		&self,
		reservation: NewReservationDirect,
	) -> Reservation {
		let conn = self.pool.get().await.unwrap();

		reservation.insert(&conn).await.unwrap()
	}
}

/// A reservation row for `museum-1` with every column spelled out
///
/// Callers overwrite the fields their scenario cares about
#[allow(dead_code)]
pub fn direct_reservation(
	code: &str,
	visit_date: NaiveDate,
	visit_time: NaiveTime,
) -> NewReservationDirect {
	NewReservationDirect {
		id: Uuid::new_v4().simple().to_string(),
		reservation_code: code.to_string(),
		visitor_name: "Carol Reyes".to_string(),
		visitor_email: "carol@example.com".to_string(),
		number_of_visitors: 2,
		museum_id: "museum-1".to_string(),
		museum_section: "fine-arts".to_string(),
		visit_date,
		visit_time,
		checked_in: false,
		checked_in_at: None,
		qr_code_data: "data:image/png;base64,".to_string(),
		created_at: Utc::now().naive_utc(),
	}
}
