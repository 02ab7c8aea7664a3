use chrono::NaiveDate;
use models::{
	OverviewCounts,
	OverviewReport,
	ReportWindow,
	SectionReport,
	TimeSlotReport,
	VisitorReport,
};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// Query string for the windowed report endpoints
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
pub struct ReportWindowQuery {
	#[serde(default)]
	pub window: ReportWindow,
}

/// Booking counters for one overview window
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewCountsResponse {
	pub reservations: i64,
	pub visitors:     i64,
	pub checked_in:   i64,
}

impl From<OverviewCounts> for OverviewCountsResponse {
	fn from(counts: OverviewCounts) -> Self {
		Self {
			reservations: counts.reservations,
			visitors:     counts.visitors,
			checked_in:   counts.checked_in,
		}
	}
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewResponse {
	pub today:      OverviewCountsResponse,
	pub this_week:  OverviewCountsResponse,
	pub this_month: OverviewCountsResponse,
	pub all_time:   OverviewCountsResponse,
}

impl From<OverviewReport> for OverviewResponse {
	fn from(report: OverviewReport) -> Self {
		Self {
			today:      report.today.into(),
			this_week:  report.this_week.into(),
			this_month: report.this_month.into(),
			all_time:   report.all_time.into(),
		}
	}
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionReportResponse {
	pub section:      String,
	pub reservations: i64,
	pub visitors:     i64,
}

impl From<SectionReport> for SectionReportResponse {
	fn from(report: SectionReport) -> Self {
		Self {
			section:      report.section,
			reservations: report.reservations,
			visitors:     report.visitors,
		}
	}
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlotReportResponse {
	pub hour:         u32,
	pub reservations: i64,
	pub visitors:     i64,
}

impl From<TimeSlotReport> for TimeSlotReportResponse {
	fn from(report: TimeSlotReport) -> Self {
		Self {
			hour:         report.hour,
			reservations: report.reservations,
			visitors:     report.visitors,
		}
	}
}

/// One visitor identity with its aggregated bookings
#[skip_serializing_none]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorReportResponse {
	pub visitor_name:  String,
	pub visitor_email: String,
	pub visits:        i64,
	pub total_guests:  i64,
	pub last_visit:    Option<NaiveDate>,
}

impl From<VisitorReport> for VisitorReportResponse {
	fn from(report: VisitorReport) -> Self {
		Self {
			visitor_name:  report.visitor_name,
			visitor_email: report.visitor_email,
			visits:        report.visits,
			total_guests:  report.total_guests,
			last_visit:    report.last_visit,
		}
	}
}
