use std::future::IntoFuture;

use axum::http::StatusCode;
use chrono::{Duration, NaiveDate, Utc};
use common::ConflictingReservation;
use museo::schemas::reservation::{
	ReservationResponse,
	SlotAvailabilityResponse,
};
use serde_json::Value;

mod common;

use common::TestEnv;

fn booking_body(
	name: &str,
	email: &str,
	visitors: i32,
	section: &str,
	date: NaiveDate,
	time: &str,
) -> Value {
	serde_json::json!({
		"visitorName": name,
		"visitorEmail": email,
		"numberOfVisitors": visitors,
		"museumId": "museum-1",
		"museumSection": section,
		"visitDate": date,
		"visitTime": time,
	})
}

#[tokio::test(flavor = "multi_thread")]
async fn book_a_slot() {
	let env = TestEnv::new().await;

	let date = Utc::now().date_naive() + Duration::days(2);
	let body =
		booking_body("Alice Cruz", "alice@example.com", 2, "fine-arts", date, "10:00");

	let response = env.app.post("/reservations").json(&body).await;

	assert_eq!(response.status_code(), StatusCode::CREATED);

	let raw = response.json::<Value>();

	assert_eq!(raw["visitTime"], "10:00");
	assert_eq!(raw["museum"]["name"], "National Museum of the Philippines");

	let created = response.json::<ReservationResponse>();

	assert_eq!(created.reservation_code.len(), 8);
	assert!(
		created
			.reservation_code
			.chars()
			.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
	);
	assert!(created.qr_code_data.starts_with("data:image/png;base64,"));
	assert!(!created.checked_in);
	assert!(created.checked_in_at.is_none());
	assert_eq!(created.visit_date, date);
	assert_eq!(created.number_of_visitors, 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn booked_slot_conflicts_for_the_next_visitor() {
	let env = TestEnv::new().await;

	let date = Utc::now().date_naive() + Duration::days(2);

	let alice =
		booking_body("Alice Cruz", "alice@example.com", 2, "fine-arts", date, "10:00");
	let response = env.app.post("/reservations").json(&alice).await;

	assert_eq!(response.status_code(), StatusCode::CREATED);

	let alice_code =
		response.json::<ReservationResponse>().reservation_code;

	let bob =
		booking_body("Bob Santos", "bob@example.com", 3, "fine-arts", date, "10:00");
	let response = env.app.post("/reservations").json(&bob).await;

	assert_eq!(response.status_code(), StatusCode::CONFLICT);

	let body = response.json::<Value>();

	assert_eq!(body["code"], 5);

	let info = body["info"].as_str().unwrap();
	let conflicting: ConflictingReservation =
		serde_json::from_str(info).unwrap();

	assert_eq!(conflicting.reservation_code, alice_code);
	assert_eq!(conflicting.visitor_name, "Alice Cruz");
	assert_eq!(conflicting.number_of_visitors, 2);

	// The losing visitor never sees the winner's email address
	assert!(!info.contains("alice@example.com"));

	// The adjacent slot is still bookable
	let bob =
		booking_body("Bob Santos", "bob@example.com", 3, "fine-arts", date, "10:30");
	let response = env.app.post("/reservations").json(&bob).await;

	assert_eq!(response.status_code(), StatusCode::CREATED);
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_bookings_have_one_winner() {
	let env = TestEnv::new().await;

	let date = Utc::now().date_naive() + Duration::days(2);
	let body =
		booking_body("Alice Cruz", "alice@example.com", 2, "fine-arts", date, "11:00");

	let requests: Vec<_> = (0..5)
		.map(|_| env.app.post("/reservations").json(&body).into_future())
		.collect();
	let responses = futures::future::join_all(requests).await;

	let created = responses
		.iter()
		.filter(|r| r.status_code() == StatusCode::CREATED)
		.count();
	let conflicts = responses
		.iter()
		.filter(|r| r.status_code() == StatusCode::CONFLICT)
		.count();

	assert_eq!(created, 1);
	assert_eq!(conflicts, 4);
}

#[tokio::test(flavor = "multi_thread")]
async fn visitor_count_bounds() {
	let env = TestEnv::new().await;

	let date = Utc::now().date_naive() + Duration::days(2);

	let body =
		booking_body("Alice Cruz", "alice@example.com", 0, "fine-arts", date, "09:00");
	let response = env.app.post("/reservations").json(&body).await;

	assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

	let body =
		booking_body("Alice Cruz", "alice@example.com", 6, "fine-arts", date, "09:00");
	let response = env.app.post("/reservations").json(&body).await;

	assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

	let body =
		booking_body("Alice Cruz", "alice@example.com", 1, "fine-arts", date, "09:00");
	let response = env.app.post("/reservations").json(&body).await;

	assert_eq!(response.status_code(), StatusCode::CREATED);

	let body =
		booking_body("Bob Santos", "bob@example.com", 5, "fine-arts", date, "09:30");
	let response = env.app.post("/reservations").json(&body).await;

	assert_eq!(response.status_code(), StatusCode::CREATED);
}

#[tokio::test(flavor = "multi_thread")]
async fn rejects_off_grid_visit_times() {
	let env = TestEnv::new().await;

	let date = Utc::now().date_naive() + Duration::days(2);

	for time in ["10:15", "08:00", "17:00", "16:30"] {
		let body = booking_body(
			"Alice Cruz",
			"alice@example.com",
			2,
			"fine-arts",
			date,
			time,
		);
		let response = env.app.post("/reservations").json(&body).await;

		assert_eq!(
			response.status_code(),
			StatusCode::UNPROCESSABLE_ENTITY
		);

		let body = response.json::<Value>();

		assert_eq!(body["code"], 4);
	}
}

#[tokio::test(flavor = "multi_thread")]
async fn rejects_unknown_museum() {
	let env = TestEnv::new().await;

	let date = Utc::now().date_naive() + Duration::days(2);
	let mut body =
		booking_body("Alice Cruz", "alice@example.com", 2, "fine-arts", date, "10:00");
	body["museumId"] = "museum-404".into();

	let response = env.app.post("/reservations").json(&body).await;

	assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn rejects_unknown_section() {
	let env = TestEnv::new().await;

	let date = Utc::now().date_naive() + Duration::days(2);
	let body = booking_body(
		"Alice Cruz",
		"alice@example.com",
		2,
		"modern-art",
		date,
		"10:00",
	);

	let response = env.app.post("/reservations").json(&body).await;

	assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

	let body = response.json::<Value>();

	assert_eq!(body["code"], 7);

	let info: Value =
		serde_json::from_str(body["info"].as_str().unwrap()).unwrap();

	assert_eq!(info["section"], "modern-art");
	assert!(
		info["available"]
			.as_array()
			.unwrap()
			.contains(&Value::from("fine-arts"))
	);
}

#[tokio::test(flavor = "multi_thread")]
async fn slot_probe_flips_after_booking() {
	let env = TestEnv::new().await;

	let date = Utc::now().date_naive() + Duration::days(2);
	let probe_url = format!(
		"/reservations/availability?museumId=museum-1&section=fine-arts&date={date}&time=10:00"
	);

	let response = env.app.get(&probe_url).await;

	assert_eq!(response.status_code(), StatusCode::OK);

	let body = response.json::<SlotAvailabilityResponse>();

	assert!(body.available);
	assert!(body.conflicting.is_none());

	let booking =
		booking_body("Alice Cruz", "alice@example.com", 2, "fine-arts", date, "10:00");
	let response = env.app.post("/reservations").json(&booking).await;

	assert_eq!(response.status_code(), StatusCode::CREATED);

	let code = response.json::<ReservationResponse>().reservation_code;

	let response = env.app.get(&probe_url).await;

	assert_eq!(response.status_code(), StatusCode::OK);

	let body = response.json::<SlotAvailabilityResponse>();

	assert!(!body.available);
	assert_eq!(body.conflicting.unwrap().reservation_code, code);
}

#[tokio::test(flavor = "multi_thread")]
async fn slot_probe_requires_all_params() {
	let env = TestEnv::new().await;

	let date = Utc::now().date_naive() + Duration::days(2);

	let missing = [
		(
			format!(
				"/reservations/availability?section=fine-arts&date={date}&time=10:00"
			),
			"museumId",
		),
		(
			format!(
				"/reservations/availability?museumId=museum-1&date={date}&time=10:00"
			),
			"section",
		),
		(
			"/reservations/availability?museumId=museum-1&section=fine-arts&time=10:00"
				.to_string(),
			"date",
		),
		(
			format!(
				"/reservations/availability?museumId=museum-1&section=fine-arts&date={date}"
			),
			"time",
		),
	];

	for (url, field) in missing {
		let response = env.app.get(&url).await;

		assert_eq!(
			response.status_code(),
			StatusCode::UNPROCESSABLE_ENTITY
		);

		let body = response.json::<Value>();

		assert_eq!(body["code"], 3);
		assert_eq!(body["info"], field);
	}
}

#[tokio::test(flavor = "multi_thread")]
async fn lookup_reservations_by_email() {
	let env = TestEnv::new().await;

	let date = Utc::now().date_naive() + Duration::days(2);

	let first =
		booking_body("Alice Cruz", "alice@example.com", 2, "fine-arts", date, "10:00");
	let response = env.app.post("/reservations").json(&first).await;

	assert_eq!(response.status_code(), StatusCode::CREATED);

	let second = booking_body(
		"Alice Cruz",
		"alice@example.com",
		4,
		"anthropology",
		date,
		"14:00",
	);
	let response = env.app.post("/reservations").json(&second).await;

	assert_eq!(response.status_code(), StatusCode::CREATED);

	let second_code =
		response.json::<ReservationResponse>().reservation_code;

	let response = env
		.app
		.get("/reservations/lookup?email=alice@example.com")
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);

	let body = response.json::<Vec<ReservationResponse>>();

	assert_eq!(body.len(), 2);
	// Most recently booked first
	assert_eq!(body[0].reservation_code, second_code);

	let response = env
		.app
		.get("/reservations/lookup?email=nobody@example.com")
		.await;

	assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

	let response = env.app.get("/reservations/lookup").await;

	assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

	let body = response.json::<Value>();

	assert_eq!(body["code"], 3);
	assert_eq!(body["info"], "email");
}

#[tokio::test(flavor = "multi_thread")]
async fn get_reservation_by_code() {
	let env = TestEnv::new().await;

	let date = Utc::now().date_naive() + Duration::days(2);
	let body =
		booking_body("Alice Cruz", "alice@example.com", 2, "fine-arts", date, "10:00");

	let response = env.app.post("/reservations").json(&body).await;

	assert_eq!(response.status_code(), StatusCode::CREATED);

	let code = response.json::<ReservationResponse>().reservation_code;

	let response = env.app.get(&format!("/reservations/{code}")).await;

	assert_eq!(response.status_code(), StatusCode::OK);

	let found = response.json::<ReservationResponse>();

	assert_eq!(found.reservation_code, code);
	assert_eq!(found.museum.id, "museum-1");

	// Codes are matched case insensitively
	let response = env
		.app
		.get(&format!("/reservations/{}", code.to_lowercase()))
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);

	let response = env.app.get("/reservations/ZZZZ9999").await;

	assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn admin_listing_filters() {
	let env = TestEnv::new().await;

	let d1 = Utc::now().date_naive() + Duration::days(1);
	let d2 = Utc::now().date_naive() + Duration::days(2);

	let bookings = [
		booking_body("Alice Cruz", "alice@example.com", 2, "fine-arts", d1, "10:00"),
		booking_body("Bob Santos", "bob@example.com", 3, "anthropology", d1, "11:00"),
		booking_body("Carol Reyes", "carol@example.com", 1, "fine-arts", d2, "10:00"),
	];

	let mut codes = Vec::new();

	for booking in &bookings {
		let response = env.app.post("/reservations").json(booking).await;

		assert_eq!(response.status_code(), StatusCode::CREATED);

		codes.push(response.json::<ReservationResponse>().reservation_code);
	}

	let response = env.app.get("/reservations").await;

	assert_eq!(response.status_code(), StatusCode::OK);

	let body = response.json::<Vec<ReservationResponse>>();

	assert_eq!(body.len(), 3);
	// Ordered by visit date, then visit time
	assert_eq!(body[0].reservation_code, codes[0]);
	assert_eq!(body[1].reservation_code, codes[1]);
	assert_eq!(body[2].reservation_code, codes[2]);

	let response = env.app.get("/reservations?section=anthropology").await;
	let body = response.json::<Vec<ReservationResponse>>();

	assert_eq!(body.len(), 1);
	assert_eq!(body[0].reservation_code, codes[1]);

	let response =
		env.app.get(&format!("/reservations?dateFrom={d2}")).await;
	let body = response.json::<Vec<ReservationResponse>>();

	assert_eq!(body.len(), 1);
	assert_eq!(body[0].reservation_code, codes[2]);

	let response =
		env.app.get(&format!("/reservations?dateTo={d1}")).await;
	let body = response.json::<Vec<ReservationResponse>>();

	assert_eq!(body.len(), 2);

	let response = env.app.get("/reservations?search=ALICE").await;
	let body = response.json::<Vec<ReservationResponse>>();

	assert_eq!(body.len(), 1);
	assert_eq!(body[0].visitor_name, "Alice Cruz");

	let response = env.app.get("/reservations?status=checked-in").await;
	let body = response.json::<Vec<ReservationResponse>>();

	assert!(body.is_empty());

	let response = env.app.get("/reservations?status=pending").await;
	let body = response.json::<Vec<ReservationResponse>>();

	assert_eq!(body.len(), 3);
}
