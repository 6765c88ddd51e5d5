//! Practice indicators.

use teacare_domain::DashboardMetrics;

use super::{Context, api_failure};
use crate::output::{date, print_one};

fn render(metrics: &DashboardMetrics) -> String {
    let mut lines = vec![
        format!("Active patients:        {}", metrics.total_active_patients),
        format!("Scales this month:      {}", metrics.scales_applied_this_month),
        format!("Average progress:       {:.1}", metrics.average_progress),
        format!("Pending re-evaluations: {}", metrics.pending_revaluations),
        format!("Adherence:              {:.0}%", metrics.therapeutic_adherence_rate),
    ];
    if let Some(peak) = metrics.peak_progress() {
        lines.push(format!(
            "Best recent session:    {} on {} ({:.1})",
            peak.patient,
            date(peak.session_date),
            peak.progress
        ));
    }
    if !metrics.progress_series.is_empty() {
        lines.push("Recent sessions:".to_string());
        for point in &metrics.progress_series {
            lines.push(format!(
                "  {:<10} {:<24} progress {:>5.1}  adherence {:>3.0}%",
                date(point.session_date),
                point.patient,
                point.progress,
                point.adherence
            ));
        }
    }
    lines.join("\n")
}

pub async fn run(ctx: &Context) -> anyhow::Result<()> {
    ctx.require_session().await?;
    let metrics = ctx.api().dashboard().await.map_err(api_failure)?;
    print_one(ctx.json, &metrics, render)
}
