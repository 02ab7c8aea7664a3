use std::future::IntoFuture;

use axum::http::StatusCode;
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use museo::schemas::reservation::ReservationResponse;
use serde_json::Value;

mod common;

use common::{TestEnv, direct_reservation};

fn booking_body(date: NaiveDate, time: &str) -> Value {
	serde_json::json!({
		"visitorName": "Alice Cruz",
		"visitorEmail": "alice@example.com",
		"numberOfVisitors": 2,
		"museumId": "museum-1",
		"museumSection": "fine-arts",
		"visitDate": date,
		"visitTime": time,
	})
}

async fn book(env: &TestEnv, date: NaiveDate, time: &str) -> String {
	let response =
		env.app.post("/reservations").json(&booking_body(date, time)).await;

	assert_eq!(response.status_code(), StatusCode::CREATED);

	response.json::<ReservationResponse>().reservation_code
}

#[tokio::test(flavor = "multi_thread")]
async fn check_in_flow() {
	let env = TestEnv::new().await;

	let today = Utc::now().date_naive();
	let code = book(&env, today, "11:00").await;

	let response =
		env.app.post(&format!("/reservations/{code}/check-in")).await;

	assert_eq!(response.status_code(), StatusCode::OK);

	let body = response.json::<ReservationResponse>();

	assert!(body.checked_in);
	assert!(body.checked_in_at.is_some());

	// The new state is visible on the next lookup
	let response = env.app.get(&format!("/reservations/{code}")).await;
	let body = response.json::<ReservationResponse>();

	assert!(body.checked_in);
}

#[tokio::test(flavor = "multi_thread")]
async fn check_in_twice_conflicts() {
	let env = TestEnv::new().await;

	let today = Utc::now().date_naive();
	let code = book(&env, today, "11:00").await;

	let response =
		env.app.post(&format!("/reservations/{code}/check-in")).await;

	assert_eq!(response.status_code(), StatusCode::OK);

	let response =
		env.app.post(&format!("/reservations/{code}/check-in")).await;

	assert_eq!(response.status_code(), StatusCode::CONFLICT);

	let body = response.json::<Value>();

	assert_eq!(body["code"], 8);

	let info: Value =
		serde_json::from_str(body["info"].as_str().unwrap()).unwrap();

	assert!(info["checkedInAt"].is_string());
}

#[tokio::test(flavor = "multi_thread")]
async fn check_in_with_lowercase_code() {
	let env = TestEnv::new().await;

	let today = Utc::now().date_naive();
	let code = book(&env, today, "11:00").await;

	let response = env
		.app
		.post(&format!("/reservations/{}/check-in", code.to_lowercase()))
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test(flavor = "multi_thread")]
async fn check_in_day_before_visit() {
	let env = TestEnv::new().await;

	let tomorrow = Utc::now().date_naive() + Duration::days(1);
	let code = book(&env, tomorrow, "11:00").await;

	let response =
		env.app.post(&format!("/reservations/{code}/check-in")).await;

	assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test(flavor = "multi_thread")]
async fn check_in_day_after_visit() {
	let env = TestEnv::new().await;

	let yesterday = Utc::now().date_naive() - Duration::days(1);
	let eleven = NaiveTime::from_hms_opt(11, 0, 0).unwrap();

	env.insert_direct(direct_reservation("LATEVIS1", yesterday, eleven))
		.await;

	let response =
		env.app.post("/reservations/LATEVIS1/check-in").await;

	assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test(flavor = "multi_thread")]
async fn rejects_distant_visit_dates() {
	let env = TestEnv::new().await;

	let future = Utc::now().date_naive() + Duration::days(3);
	let code = book(&env, future, "11:00").await;

	let response =
		env.app.post(&format!("/reservations/{code}/check-in")).await;

	assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

	let body = response.json::<Value>();

	assert_eq!(body["code"], 9);

	let info: Value =
		serde_json::from_str(body["info"].as_str().unwrap()).unwrap();

	assert_eq!(info["visitDate"], future.to_string());

	// A visit three days in the past is just as unusable
	let past = Utc::now().date_naive() - Duration::days(3);
	let eleven = NaiveTime::from_hms_opt(11, 0, 0).unwrap();

	env.insert_direct(direct_reservation("OLDVISIT", past, eleven)).await;

	let response =
		env.app.post("/reservations/OLDVISIT/check-in").await;

	assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test(flavor = "multi_thread")]
async fn check_in_unknown_code() {
	let env = TestEnv::new().await;

	let response = env.app.post("/reservations/ZZZZ9999/check-in").await;

	assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_check_ins_have_one_winner() {
	let env = TestEnv::new().await;

	let today = Utc::now().date_naive();
	let code = book(&env, today, "11:00").await;
	let url = format!("/reservations/{code}/check-in");

	let requests: Vec<_> =
		(0..2).map(|_| env.app.post(&url).into_future()).collect();
	let responses = futures::future::join_all(requests).await;

	let succeeded = responses
		.iter()
		.filter(|r| r.status_code() == StatusCode::OK)
		.count();
	let conflicts = responses
		.iter()
		.filter(|r| r.status_code() == StatusCode::CONFLICT)
		.count();

	assert_eq!(succeeded, 1);
	assert_eq!(conflicts, 1);
}
