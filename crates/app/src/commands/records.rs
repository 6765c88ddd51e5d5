//! Clinical records nested under a patient.

use std::path::Path;

use anyhow::Context as _;
use serde::Serialize;
use teacare_domain::{
    Assessment, FamilySession, PatientId, PatientRecord, Report, SatisfactionSurvey,
    TherapySession,
};
use tokio::io::AsyncReadExt;

use super::{Context, api_failure};
use crate::cli::{RecordCommands, RecordKind};
use crate::output::{date, print_one, print_out};

/// One-line rendering of a record.
trait Describe {
    fn describe(&self) -> String;
}

impl Describe for Assessment {
    fn describe(&self) -> String {
        let score = self
            .score_total
            .map_or_else(|| "-".to_string(), |score| format!("{score:.1}"));
        format!(
            "#{} {} on {} score {}",
            self.id,
            self.scale.display_name(),
            date(Some(self.application_date)),
            score
        )
    }
}

impl Describe for TherapySession {
    fn describe(&self) -> String {
        format!(
            "#{} {:?} on {} ({} min) {}",
            self.id,
            self.session_type,
            date(Some(self.session_date)),
            self.duration_minutes,
            self.progress_notes
        )
    }
}

impl Describe for Report {
    fn describe(&self) -> String {
        let kind = if self.report_type_display.is_empty() {
            format!("{:?}", self.report_type)
        } else {
            self.report_type_display.clone()
        };
        format!(
            "#{} {} {}: {}",
            self.id,
            kind,
            date(self.generated_at.map(|at| at.date_naive())),
            self.summary
        )
    }
}

impl Describe for FamilySession {
    fn describe(&self) -> String {
        let follow_up = self
            .follow_up_date
            .map_or_else(String::new, |d| format!(" (follow-up {})", date(Some(d))));
        format!(
            "#{} {} {}{}",
            self.id,
            date(Some(self.session_date)),
            self.topic,
            follow_up
        )
    }
}

impl Describe for SatisfactionSurvey {
    fn describe(&self) -> String {
        format!(
            "#{} {} engagement {}%",
            self.id,
            date(Some(self.conducted_at)),
            self.engagement_index
        )
    }
}

async fn read_draft(path: &Path) -> anyhow::Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buffer = Vec::new();
        tokio::io::stdin().read_to_end(&mut buffer).await?;
        return Ok(buffer);
    }
    tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}

async fn list<R>(ctx: &Context, patient: PatientId) -> anyhow::Result<()>
where
    R: PatientRecord + Describe + Serialize,
{
    let records: Vec<R> = ctx
        .api()
        .list_records(patient)
        .await
        .map_err(api_failure)?;
    print_out(ctx.json, &records, Describe::describe)
}

async fn add<R>(ctx: &Context, patient: PatientId, data: &Path) -> anyhow::Result<()>
where
    R: PatientRecord + Describe + Serialize,
{
    let bytes = read_draft(data).await?;
    let draft: R::Draft = serde_json::from_slice(&bytes)
        .with_context(|| format!("invalid {} draft", R::COLLECTION))?;
    let record: R = ctx
        .api()
        .create_record(patient, &draft)
        .await
        .map_err(api_failure)?;
    print_one(ctx.json, &record, |r| format!("Created {}", r.describe()))
}

pub async fn run(ctx: &Context, command: RecordCommands) -> anyhow::Result<()> {
    ctx.require_session().await?;

    match command {
        RecordCommands::List { kind, patient } => match kind {
            RecordKind::Assessments => list::<Assessment>(ctx, patient).await,
            RecordKind::Sessions => list::<TherapySession>(ctx, patient).await,
            RecordKind::Reports => list::<Report>(ctx, patient).await,
            RecordKind::FamilySessions => list::<FamilySession>(ctx, patient).await,
            RecordKind::Surveys => list::<SatisfactionSurvey>(ctx, patient).await,
        },
        RecordCommands::Add {
            kind,
            patient,
            data,
        } => match kind {
            RecordKind::Assessments => add::<Assessment>(ctx, patient, &data).await,
            RecordKind::Sessions => add::<TherapySession>(ctx, patient, &data).await,
            RecordKind::Reports => add::<Report>(ctx, patient, &data).await,
            RecordKind::FamilySessions => add::<FamilySession>(ctx, patient, &data).await,
            RecordKind::Surveys => add::<SatisfactionSurvey>(ctx, patient, &data).await,
        },
    }
}
