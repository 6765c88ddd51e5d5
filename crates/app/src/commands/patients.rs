//! Patient commands.

use anyhow::Context as _;
use teacare_domain::patient::SCHOOL_HISTORY_FILE_FIELD;
use teacare_domain::{FilePart, NewPatient, Patient, PatientDetail, filter_patients};

use super::{Context, api_failure};
use crate::cli::{NewPatientArgs, PatientCommands};
use crate::output::{date, print_one, print_out};

fn row(patient: &Patient) -> String {
    let age = patient
        .age
        .map_or_else(String::new, |age| format!(", {age} years"));
    let status = if patient.active { "" } else { " [inactive]" };
    format!(
        "#{:<5} {}{} (born {}){}",
        patient.id,
        patient.full_name,
        age,
        date(patient.birth_date),
        status
    )
}

fn detail(detail: &PatientDetail) -> String {
    let patient = &detail.patient;
    let mut lines = vec![row(patient)];
    for (label, value) in [
        ("Contact", &patient.contact_email),
        ("Phone", &patient.contact_phone),
        ("Initial diagnosis", &patient.initial_diagnosis),
        ("Comorbidities", &patient.comorbidities),
    ] {
        if !value.is_empty() {
            lines.push(format!("  {label}: {value}"));
        }
    }
    lines.push(format!(
        "  Records: {} assessments, {} sessions, {} reports, {} surveys, {} family sessions",
        detail.assessments.len(),
        detail.sessions.len(),
        detail.reports.len(),
        detail.surveys.len(),
        detail.family_sessions.len(),
    ));
    lines.join("\n")
}

async fn new_patient(args: NewPatientArgs) -> anyhow::Result<NewPatient> {
    let mut patient = NewPatient::new(args.full_name, args.birth_date, args.sex.into());
    patient.contact_email = args.contact_email;
    patient.contact_phone = args.contact_phone;
    patient.initial_diagnosis = args.initial_diagnosis;
    if let Some(path) = args.school_history_file {
        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map_or_else(|| "school-history".to_string(), |name| name.to_string_lossy().into_owned());
        patient.school_history_file = Some(FilePart::new(SCHOOL_HISTORY_FILE_FIELD, file_name, bytes));
    }
    Ok(patient)
}

pub async fn run(ctx: &Context, command: PatientCommands) -> anyhow::Result<()> {
    ctx.require_session().await?;
    let api = ctx.api();

    match command {
        PatientCommands::List { search } => {
            let patients = api.list_patients().await.map_err(api_failure)?;
            let shown: Vec<&Patient> = filter_patients(&patients, search.as_deref().unwrap_or(""));
            print_out(ctx.json, &shown, |p| row(p))
        }
        PatientCommands::Show { id } => {
            let patient = api.patient(id).await.map_err(api_failure)?;
            print_one(ctx.json, &patient, detail)
        }
        PatientCommands::Create(args) => {
            let patient = new_patient(args).await?;
            let created = api.create_patient(&patient).await.map_err(api_failure)?;
            print_one(ctx.json, &created, |p| format!("Created {}", row(p)))
        }
        PatientCommands::Activate { id } => {
            let patient = api.set_patient_active(id, true).await.map_err(api_failure)?;
            print_one(ctx.json, &patient, row)
        }
        PatientCommands::Deactivate { id } => {
            let patient = api.set_patient_active(id, false).await.map_err(api_failure)?;
            print_one(ctx.json, &patient, row)
        }
    }
}
