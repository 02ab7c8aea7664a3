use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::controllers::healthcheck;
use crate::controllers::museum::{
	create_museum,
	get_museum,
	get_museum_availability,
	get_museums,
};
use crate::controllers::report::{
	get_overview_report,
	get_section_report,
	get_time_slot_report,
	get_visitor_report,
};
use crate::controllers::reservation::{
	check_in_reservation,
	check_slot_availability,
	create_reservation,
	get_reservation,
	get_reservations,
	lookup_reservations,
};

/// Get the app router
pub fn get_app_router(state: AppState) -> Router {
	let api_routes = Router::new()
		.route("/healthcheck", get(healthcheck))
		.nest("/museums", museum_routes())
		.nest("/reservations", reservation_routes())
		.nest("/reports", report_routes());

	Router::new()
		.merge(api_routes)
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(TimeoutLayer::new(Duration::from_secs(10)))
				.layer(CompressionLayer::new()),
		)
		.with_state(state)
}

/// Museum catalogue and day grid routes
fn museum_routes() -> Router<AppState> {
	Router::new()
		.route("/", get(get_museums).post(create_museum))
		.route("/{id}", get(get_museum))
		.route("/{id}/availability", get(get_museum_availability))
}

/// Booking and check-in routes
fn reservation_routes() -> Router<AppState> {
	Router::new()
		.route("/", get(get_reservations).post(create_reservation))
		.route("/availability", get(check_slot_availability))
		.route("/lookup", get(lookup_reservations))
		.route("/{code}", get(get_reservation))
		.route("/{code}/check-in", post(check_in_reservation))
}

/// Dashboard report routes
fn report_routes() -> Router<AppState> {
	Router::new()
		.route("/overview", get(get_overview_report))
		.route("/sections", get(get_section_report))
		.route("/time-slots", get(get_time_slot_report))
		.route("/visitors", get(get_visitor_report))
}
