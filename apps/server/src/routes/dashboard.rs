//! # Dashboard Routes

use axum::extract::State;
use axum::Json;
use tracing::warn;

use cantina_db::{DashboardSummary, Database};

/// `GET /api/dashboard/summary`
///
/// Advisory read: degrades to zero-valued defaults on storage failure.
pub async fn summary(State(db): State<Database>) -> Json<DashboardSummary> {
    match db.reports().dashboard_summary().await {
        Ok(summary) => Json(summary),
        Err(err) => {
            warn!(error = %err, "Dashboard summary degraded to defaults");
            Json(DashboardSummary::default())
        }
    }
}
