mod util;

use std::env;

use chrono::{Duration, Utc};
use clap::error::ErrorKind;
use clap::{Error, Parser};
use common::DbConn;
use deadpool_diesel::postgres::{Manager, Pool};
use diesel::RunQueryDsl;
use diesel::query_dsl::methods::SelectDsl;
use fake::Fake;
use fake::faker::internet::raw::FreeEmail;
use fake::faker::name::raw::Name;
use fake::locales::EN;
use models::{
	NewReservationDirect,
	Reservation,
	generate_reservation_code,
	render_qr_data_url,
};
use rand::seq::IndexedRandom;
use rand::{Rng, rng};
use uuid::Uuid;

use crate::util::{batch_insert, generate_unique_set};

#[derive(Parser, Debug)]
struct Opt {
	#[arg(long, short = 'r', default_value_t = 500)]
	reservations: usize,
	#[arg(long, short = 'd', default_value_t = 21)]
	days:         u32,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
	let cli = Opt::parse();
	let conn = get_conn().await;

	if cli.reservations > 0 {
		println!("Seeding {} reservations…", cli.reservations);
		let inserted =
			seed_reservations(&conn, cli.reservations, cli.days).await?;
		println!("Inserted {inserted} reservations");
	}

	Ok(())
}

/// Get a database connection from the pool
async fn get_conn() -> DbConn {
	let database_url = env::var("DATABASE_URL").expect("DATABASE_URL missing");

	let manager = Manager::new(database_url, deadpool_diesel::Runtime::Tokio1);
	let pool = Pool::builder(manager).build().expect("Failed to create pool");

	pool.get().await.expect("Failed to get a database connection")
}

/// Seed reservations across every museum section
///
/// Visit days spread over today plus or minus `days`. Past visits are mostly
/// checked in, today and future visits never are.
async fn seed_reservations(
	conn: &DbConn,
	count: usize,
	days: u32,
) -> Result<usize, Error> {
	let museums: Vec<(String, Vec<String>)> = conn
		.interact(|c| {
			use models::schema::museum::dsl::*;
			museum.select((id, sections)).load::<(String, Vec<String>)>(c)
		})
		.await
		.map_err(|e| Error::raw(ErrorKind::Io, e))?
		.map_err(|e| Error::raw(ErrorKind::Io, e))?;

	let museums: Vec<(String, Vec<String>)> = museums
		.into_iter()
		.filter(|(_, sections)| !sections.is_empty())
		.collect();

	assert!(
		!museums.is_empty(),
		"No museum with bookable sections exists, run the server once to \
		 seed them"
	);

	let slot_times = Reservation::slot_times();
	let day_count = usize::try_from(days).unwrap_or(0) * 2 + 1;
	let capacity: usize = museums
		.iter()
		.map(|(_, sections)| sections.len())
		.sum::<usize>()
		* day_count * slot_times.len();

	assert!(
		count <= capacity,
		"Cannot fit {count} reservations into {capacity} distinct slots"
	);

	let today = Utc::now().date_naive();
	let now = Utc::now().naive_utc();

	let mut rng = rng();

	// A small pool of repeat visitors keeps the visitor grouping interesting
	let pool_size = (count / 4).max(1);
	let emails =
		generate_unique_set(pool_size, || FreeEmail(EN).fake::<String>());
	let visitors: Vec<(String, String)> = emails
		.into_iter()
		.map(|email| (Name(EN).fake::<String>(), email))
		.collect();

	let slots = generate_unique_set(count, || {
		let (museum_id, sections) = museums.choose(&mut rng).unwrap();
		let section = sections.choose(&mut rng).unwrap();
		let offset = rng.random_range(-i64::from(days)..=i64::from(days));
		let date = today + Duration::days(offset);
		let time = *slot_times.choose(&mut rng).unwrap();

		(museum_id.clone(), section.clone(), date, time)
	});

	let codes = generate_unique_set(count, generate_reservation_code);

	let mut reservations: Vec<NewReservationDirect> =
		Vec::with_capacity(count);

	for ((museum_id, section, date, time), code) in
		slots.into_iter().zip(codes)
	{
		let (name, email) = visitors.choose(&mut rng).unwrap().clone();
		let number_of_visitors = rng.random_range(1..=5);

		let checked_in = date < today && rng.random_bool(0.85);
		let checked_in_at = checked_in.then(|| {
			date.and_time(time) + Duration::minutes(rng.random_range(0..25))
		});

		let created_at = now
			- Duration::days(rng.random_range(0..=i64::from(days)))
			- Duration::minutes(rng.random_range(0..1440));

		let qr_code_data = render_qr_data_url(&code)
			.map_err(|e| Error::raw(ErrorKind::Io, e))?;

		reservations.push(NewReservationDirect {
			id: Uuid::new_v4().simple().to_string(),
			reservation_code: code,
			visitor_name: name,
			visitor_email: email,
			number_of_visitors,
			museum_id,
			museum_section: section,
			visit_date: date,
			visit_time: time,
			checked_in,
			checked_in_at,
			qr_code_data,
			created_at,
		});
	}

	batch_insert(conn, reservations, 512, |conn, chunk| {
		use models::schema::reservation::dsl::*;
		diesel::insert_into(reservation).values(chunk).execute(conn)
	})
	.await
}
