//! Account commands: login, register, logout, profile.

use std::io::{BufRead, Write};

use anyhow::Context as _;
use teacare_domain::{Credentials, Profile, ProfileUpdate, Registration};

use super::{Context, api_failure, app_failure};
use crate::cli::{ProfileArgs, RegisterArgs};
use crate::output::print_one;

fn describe(profile: &Profile) -> String {
    let profession = profile
        .profession
        .map_or("", |profession| profession.display_name());
    format!(
        "{} <{}>\n  CRP: {}\n  {}{}",
        profile.full_name,
        profile.email,
        profile.crp,
        profession,
        if profile.institution.is_empty() {
            String::new()
        } else {
            format!(" at {}", profile.institution)
        }
    )
}

/// Reads a password from stdin when it was not given on the command line.
fn password(given: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = given {
        return Ok(password);
    }
    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub async fn login(ctx: &Context, email: String, given: Option<String>) -> anyhow::Result<()> {
    let credentials = Credentials::new(email, password(given)?);
    let profile = ctx.session.login(&credentials).await.map_err(api_failure)?;
    print_one(ctx.json, &profile, |p| format!("Signed in as {}", p.full_name))
}

pub async fn register(ctx: &Context, args: RegisterArgs) -> anyhow::Result<()> {
    let registration = Registration {
        full_name: args.full_name,
        email: args.email,
        password: password(args.password)?,
        crp: args.crp,
        profession: Some(args.profession.into()),
        institution: args.institution,
    };
    let profile = ctx
        .session
        .register(&registration)
        .await
        .map_err(app_failure)?;
    print_one(ctx.json, &profile, |p| {
        format!("Account created for {}. Sign in with `teacare login`.", p.email)
    })
}

pub async fn logout(ctx: &Context) {
    ctx.session.logout().await;
    if !ctx.json {
        println!("Signed out.");
    }
}

pub async fn whoami(ctx: &Context) -> anyhow::Result<()> {
    let profile = ctx.require_session().await?;
    print_one(ctx.json, &profile, describe)
}

pub async fn update_profile(ctx: &Context, args: ProfileArgs) -> anyhow::Result<()> {
    let current = ctx.require_session().await?;
    let mut update = ProfileUpdate::from(&current);
    if let Some(full_name) = args.full_name {
        update.full_name = full_name;
    }
    if let Some(institution) = args.institution {
        update.institution = institution;
    }
    if let Some(crp) = args.crp {
        update.crp = crp;
    }
    if let Some(notifications) = args.notifications {
        update.accepts_notifications = notifications;
    }
    let profile = ctx
        .session
        .update_profile(&update)
        .await
        .map_err(api_failure)?;
    print_one(ctx.json, &profile, describe)
}
