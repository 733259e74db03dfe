//! Reporting endpoints for staff.

use api_types::report::{ShiftQuery, ShiftReportView};
use axum::{Extension, Json, extract::State};
use chrono::{FixedOffset, Utc};

use crate::{ServerError, require_staff, server::ServerState};
use engine::Account;

/// Totals for the rolling 24-hour shift containing the current moment.
pub async fn shift(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    payload: Option<Json<ShiftQuery>>,
) -> Result<Json<ShiftReportView>, ServerError> {
    require_staff(&account)?;

    let offset_seconds = payload
        .as_ref()
        .and_then(|Json(query)| query.utc_offset_seconds)
        .unwrap_or(0);
    let offset = FixedOffset::east_opt(offset_seconds)
        .ok_or_else(|| ServerError::Generic("invalid UTC offset".to_string()))?;

    let report = state.engine.shift_report(Utc::now(), offset).await?;
    Ok(Json(ShiftReportView {
        starts_at: report.starts_at.with_timezone(&offset),
        ends_at: report.ends_at.with_timezone(&offset),
        deposits_minor: report.deposits_minor,
        withdrawals_minor: report.withdrawals_minor,
        purchases_minor: report.purchases_minor,
        rent_charges_minor: report.rent_charges_minor,
        refunds_minor: report.refunds_minor,
    }))
}
