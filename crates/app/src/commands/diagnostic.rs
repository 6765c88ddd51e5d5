//! Interactive diagnostic questionnaire and report download.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use teacare_application::diagnostic::{DiagnosticFlow, DiagnosticWizard, PdfReport, WizardCursor};
use teacare_domain::{DiagnosticResult, PatientId, Score};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{Context, api_failure, app_failure};
use crate::output::print_one;

/// A line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Answer(Score),
    Observe(String),
    Next,
    Back,
    Jump(usize),
    Review,
    Submit,
    Quit,
}

/// What the loop does after applying an input.
#[derive(Debug, PartialEq, Eq)]
enum Step {
    Continue,
    Submit,
    Quit,
}

const HELP: &str = "s = Sim, n = Não, o <text> = observation, enter = next, b = back, \
                    j <n> = go to question n, r = review, e = submit, q = quit";

fn parse_input(line: &str) -> Option<Input> {
    let line = line.trim();
    let (command, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(command, rest)| (command, rest.trim()));
    let input = match command.to_lowercase().as_str() {
        "" => Input::Next,
        "s" | "sim" | "1" => Input::Answer(Score::Yes),
        "n" | "nao" | "não" | "0" => Input::Answer(Score::No),
        "o" | "obs" => Input::Observe(rest.to_string()),
        "b" | "back" => Input::Back,
        "r" | "review" => Input::Review,
        "e" | "enviar" | "submit" => Input::Submit,
        "q" | "quit" => Input::Quit,
        "j" | "jump" => {
            let number: usize = rest.parse().ok()?;
            Input::Jump(number.checked_sub(1)?)
        }
        _ => return None,
    };
    Some(input)
}

/// Applies one input to the wizard. Answers advance automatically.
fn apply(wizard: &mut DiagnosticWizard, input: Input) -> anyhow::Result<Step> {
    match input {
        Input::Answer(score) => {
            let id = wizard
                .current_question()
                .map(|question| question.id.clone())
                .context("no question is being shown")?;
            wizard.set_score(&id, score)?;
            wizard.next()?;
        }
        Input::Observe(text) => {
            let id = wizard
                .current_question()
                .map(|question| question.id.clone())
                .context("no question is being shown")?;
            wizard.set_observation(&id, text)?;
        }
        Input::Next => wizard.next()?,
        Input::Back => match wizard.cursor() {
            WizardCursor::Summary { .. } => wizard.back_to_questions()?,
            _ => wizard.previous()?,
        },
        Input::Jump(index) => wizard.jump_to(index)?,
        Input::Review => wizard.show_summary()?,
        Input::Submit => {
            if !wizard.can_submit() {
                // Surfaces the reason: missing patient or answers.
                wizard.begin_submission()?;
            }
            return Ok(Step::Submit);
        }
        Input::Quit => return Ok(Step::Quit),
    }
    Ok(Step::Continue)
}

fn render_question(wizard: &DiagnosticWizard, index: usize) -> String {
    let Some(question) = wizard.current_question() else {
        return String::new();
    };
    let answer = wizard
        .response(&question.id)
        .and_then(|entry| entry.score)
        .map_or_else(String::new, |score| format!(" [{}]", score.label()));
    let critical = if question.critical { " *" } else { "" };
    format!(
        "\n{}% answered\n[{}/{}] {}{}\n  {}{}",
        wizard.progress(),
        index + 1,
        wizard.question_count(),
        question.axis,
        critical,
        question.text,
        answer
    )
}

fn render_summary(wizard: &DiagnosticWizard) -> String {
    let mut lines = vec!["\nReview your answers:".to_string()];
    for axis in wizard.summary() {
        lines.push(format!("{}:", axis.label));
        for item in axis.items {
            let observation = if item.observation.is_empty() {
                String::new()
            } else {
                format!(" ({})", item.observation)
            };
            lines.push(format!(
                "  {:>2}. {} -> {}{}",
                item.index + 1,
                item.text,
                item.score_label,
                observation
            ));
        }
    }
    lines.push("Type e to submit, j <n> to revise an answer, b to go back.".to_string());
    lines.join("\n")
}

fn render_result(result: &DiagnosticResult) -> String {
    let mut lines = vec![
        format!("Assessment #{} recorded", result.id),
        format!("  Patient:          {}", result.patient_name().unwrap_or("-")),
        format!("  Failed items:     {}", result.failed_items()),
        format!("  Critical failed:  {}", result.critical_failed),
        format!("  Screening:        {}", result.screen_label()),
        format!("  High risk:        {}", if result.high_risk { "Sim" } else { "Não" }),
        format!("  Functional level: {}", result.functional_level_label()),
    ];
    if let Some(recommendations) = &result.recommendations {
        lines.push(format!("  Recommendations:  {recommendations}"));
    }
    lines.join("\n")
}

async fn save_report(report: &PdfReport, target: &Path) -> anyhow::Result<PathBuf> {
    let path = if target.is_dir() {
        target.join(&report.file_name)
    } else {
        target.to_path_buf()
    };
    tokio::fs::write(&path, &report.bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

pub async fn run(
    ctx: &Context,
    patient: Option<PatientId>,
    report_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    ctx.require_session().await?;
    let mut flow = DiagnosticFlow::new(ctx.api().clone());
    if let Some(id) = patient {
        flow.wizard_mut().select_patient(Some(id));
    }
    flow.load().await;

    if let Some(error) = flow.wizard().error() {
        anyhow::bail!("{error}");
    }
    if let Some(id) = patient {
        flow.select_patient(id).map_err(app_failure)?;
    }
    let Some(selected) = flow.wizard().patient() else {
        anyhow::bail!("No patients found. Register a patient first.");
    };
    if let Some(patient) = flow.patients().iter().find(|p| p.id == selected) {
        println!("Diagnostic assessment for {}", patient.full_name);
    }
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match flow.wizard().cursor() {
            WizardCursor::Active(index) => println!("{}", render_question(flow.wizard(), index)),
            WizardCursor::Summary { .. } => println!("{}", render_summary(flow.wizard())),
            WizardCursor::Loading | WizardCursor::Submitted => break,
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let Some(input) = parse_input(&line) else {
            println!("{HELP}");
            continue;
        };
        match apply(flow.wizard_mut(), input) {
            Ok(Step::Continue) => {}
            Ok(Step::Quit) => return Ok(()),
            Ok(Step::Submit) => {
                if let Err(err) = flow.submit().await {
                    println!("{}", app_failure(err));
                }
            }
            Err(err) => println!("{err}"),
        }
    }

    let Some(result) = flow.wizard().result().cloned() else {
        return Ok(());
    };
    print_one(ctx.json, &result, render_result)?;

    if let Some(dir) = report_dir {
        let report = flow.download_report().await.map_err(app_failure)?;
        let path = save_report(&report, &dir).await?;
        println!("Report saved to {}", path.display());
    }
    Ok(())
}

/// Downloads the report of an earlier assessment.
pub async fn report(ctx: &Context, id: u64, output: Option<PathBuf>) -> anyhow::Result<()> {
    ctx.require_session().await?;
    let bytes = ctx.api().diagnostic_pdf(id).await.map_err(api_failure)?;
    let report = PdfReport {
        file_name: format!("laudo-diagnostico-{id}.pdf"),
        bytes,
    };
    let target = output.unwrap_or_else(|| PathBuf::from("."));
    let path = save_report(&report, &target).await?;
    println!("Report saved to {}", path.display());
    Ok(())
}
