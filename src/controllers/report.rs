use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{NaiveDate, Utc};
use common::{DbPool, Error};
use models::{
	OverviewReport,
	ReportWindow,
	SectionReport,
	TimeSlotReport,
	VisitorFilter,
	VisitorReport,
};

use crate::controllers::or_default;
use crate::schemas::report::{
	OverviewResponse,
	ReportWindowQuery,
	SectionReportResponse,
	TimeSlotReportResponse,
	VisitorReportResponse,
};

/// Get booking totals for the fixed dashboard windows
#[instrument(skip(pool))]
pub async fn get_overview_report(
	State(pool): State<DbPool>,
) -> Result<impl IntoResponse, Error> {
	let today = Utc::now().date_naive();

	let report = or_default(overview_report(today, &pool).await)?;

	Ok((StatusCode::OK, Json(OverviewResponse::from(report))))
}

async fn overview_report(
	today: NaiveDate,
	pool: &DbPool,
) -> Result<OverviewReport, Error> {
	let conn = pool.get().await?;

	OverviewReport::generate(today, &conn).await
}

/// Get per-section booking totals for a window of visit days
#[instrument(skip(pool))]
pub async fn get_section_report(
	State(pool): State<DbPool>,
	Query(query): Query<ReportWindowQuery>,
) -> Result<impl IntoResponse, Error> {
	let today = Utc::now().date_naive();

	let reports = or_default(section_report(query.window, today, &pool).await)?;
	let response: Vec<SectionReportResponse> =
		reports.into_iter().map(Into::into).collect();

	Ok((StatusCode::OK, Json(response)))
}

async fn section_report(
	window: ReportWindow,
	today: NaiveDate,
	pool: &DbPool,
) -> Result<Vec<SectionReport>, Error> {
	let conn = pool.get().await?;

	SectionReport::for_window(window, today, &conn).await
}

/// Get per-hour booking totals for a window of visit days
#[instrument(skip(pool))]
pub async fn get_time_slot_report(
	State(pool): State<DbPool>,
	Query(query): Query<ReportWindowQuery>,
) -> Result<impl IntoResponse, Error> {
	let today = Utc::now().date_naive();

	let reports =
		or_default(time_slot_report(query.window, today, &pool).await)?;
	let response: Vec<TimeSlotReportResponse> =
		reports.into_iter().map(Into::into).collect();

	Ok((StatusCode::OK, Json(response)))
}

async fn time_slot_report(
	window: ReportWindow,
	today: NaiveDate,
	pool: &DbPool,
) -> Result<Vec<TimeSlotReport>, Error> {
	let conn = pool.get().await?;

	TimeSlotReport::for_window(window, today, &conn).await
}

/// Get booking totals grouped by visitor identity
#[instrument(skip(pool))]
pub async fn get_visitor_report(
	State(pool): State<DbPool>,
	Query(filter): Query<VisitorFilter>,
) -> Result<impl IntoResponse, Error> {
	let reports = or_default(visitor_report(filter, &pool).await)?;
	let response: Vec<VisitorReportResponse> =
		reports.into_iter().map(Into::into).collect();

	Ok((StatusCode::OK, Json(response)))
}

async fn visitor_report(
	filter: VisitorFilter,
	pool: &DbPool,
) -> Result<Vec<VisitorReport>, Error> {
	let conn = pool.get().await?;

	VisitorReport::all_grouped(filter, &conn).await
}
