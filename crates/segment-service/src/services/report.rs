//! Report service
//!
//! Replays the full membership history into a CSV export.

use chrono::{DateTime, Utc};
use segment_core::format_timestamp;
use tracing::{info, instrument};

use crate::dto::{ReportFile, ReportResponse, ReportRow};

use super::context::ServiceContext;
use super::error::{ResultExt, ServiceError, ServiceResult};

/// Column names of the CSV export
pub const REPORT_HEADER: [&str; 4] = ["user_id", "segment_name", "start_date", "end_date"];

/// A generated report
#[derive(Debug, Clone)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub rows: Vec<ReportRow>,
    /// `rows` serialized with a header line
    pub csv: String,
}

/// Report service
pub struct ReportService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReportService<'a> {
    /// Create a new ReportService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Build the report of every membership ever recorded, oldest first
    #[instrument(skip(self))]
    pub async fn make_report(&self) -> ServiceResult<Report> {
        const AT: &str = "ReportService::make_report";

        let generated_at = Utc::now();
        let history = self
            .ctx
            .report_repo()
            .membership_history()
            .await
            .at(AT)?;

        let rows: Vec<ReportRow> = history.iter().map(ReportRow::from).collect();
        let csv = to_csv(&rows)?;

        info!(rows = rows.len(), "Report generated");

        Ok(Report {
            generated_at,
            rows,
            csv,
        })
    }

    /// The report in its JSON form
    pub async fn report_response(&self) -> ServiceResult<ReportResponse> {
        let report = self.make_report().await?;
        Ok(ReportResponse {
            report_date: format_timestamp(&report.generated_at),
            report: report.csv,
        })
    }

    /// The report as a CSV attachment
    pub async fn report_file(&self) -> ServiceResult<ReportFile> {
        let report = self.make_report().await?;
        Ok(ReportFile {
            file_name: report_file_name(&report.generated_at),
            content: report.csv,
        })
    }
}

/// `report_HH-MM_DD.MM.YYYY.csv`
pub fn report_file_name(generated_at: &DateTime<Utc>) -> String {
    generated_at.format("report_%H-%M_%d.%m.%Y.csv").to_string()
}

fn to_csv(rows: &[ReportRow]) -> ServiceResult<String> {
    const AT: &str = "ReportService::to_csv";
    let failed = |e: csv::Error| ServiceError::internal(AT, "failed to write report as CSV").with_source(e);

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(REPORT_HEADER).map_err(failed)?;
    for row in rows {
        writer
            .write_record([
                row.user_id.to_string().as_str(),
                row.segment_name.as_str(),
                row.start_date.as_str(),
                row.end_date.as_str(),
            ])
            .map_err(failed)?;
    }

    let bytes = writer.into_inner().map_err(|e| {
        ServiceError::internal(AT, "failed to flush report").with_source(e.into_error())
    })?;
    String::from_utf8(bytes)
        .map_err(|e| ServiceError::internal(AT, "report is not valid UTF-8").with_source(e))
}
