//! Command line definition.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use teacare_domain::{Profession, Sex};
use teacare_infrastructure::ConfigOverrides;

#[derive(Parser, Debug)]
#[command(name = "teacare", version, about = "TEAcare clinical records client")]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase log verbosity")]
    pub verbose: u8,
    #[arg(long, global = true, help = "API base URL")]
    pub base_url: Option<String>,
    #[arg(long, global = true, help = "Where session tokens are stored")]
    pub token_file: Option<PathBuf>,
    #[arg(long, global = true, help = "Request timeout in seconds")]
    pub timeout: Option<u64>,
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            base_url: self.base_url.clone(),
            token_file: self.token_file.clone(),
            timeout_secs: self.timeout,
        }
    }

    /// Default log filter for the verbosity flag.
    pub const fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and store the session tokens.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "TEACARE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create a professional account.
    Register(RegisterArgs),
    /// Forget the stored session.
    Logout,
    /// Show the signed-in profile.
    Whoami,
    /// Edit the signed-in profile.
    Profile(ProfileArgs),
    Patients {
        #[command(subcommand)]
        command: PatientCommands,
    },
    Records {
        #[command(subcommand)]
        command: RecordCommands,
    },
    /// Practice indicators.
    Dashboard,
    /// Run the diagnostic questionnaire interactively.
    Diagnostic {
        #[arg(long, help = "Patient under assessment (defaults to the first)")]
        patient: Option<u64>,
        #[arg(long, help = "Directory where the PDF report is saved after submission")]
        report_dir: Option<PathBuf>,
    },
    /// Download the PDF report of a diagnostic result.
    Report {
        id: u64,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub full_name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "TEACARE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    #[arg(long)]
    pub crp: String,
    #[arg(long, value_enum)]
    pub profession: ProfessionArg,
    #[arg(long, default_value = "")]
    pub institution: String,
}

#[derive(Args, Debug)]
pub struct ProfileArgs {
    #[arg(long)]
    pub full_name: Option<String>,
    #[arg(long)]
    pub institution: Option<String>,
    #[arg(long)]
    pub crp: Option<String>,
    #[arg(long)]
    pub notifications: Option<bool>,
}

#[derive(Subcommand, Debug)]
pub enum PatientCommands {
    List {
        #[arg(long)]
        search: Option<String>,
    },
    Show {
        id: u64,
    },
    Create(NewPatientArgs),
    Activate {
        id: u64,
    },
    Deactivate {
        id: u64,
    },
}

#[derive(Args, Debug)]
pub struct NewPatientArgs {
    #[arg(long)]
    pub full_name: String,
    #[arg(long, help = "YYYY-MM-DD")]
    pub birth_date: NaiveDate,
    #[arg(long, value_enum, default_value_t = SexArg::M)]
    pub sex: SexArg,
    #[arg(long, default_value = "")]
    pub contact_email: String,
    #[arg(long, default_value = "")]
    pub contact_phone: String,
    #[arg(long, default_value = "")]
    pub initial_diagnosis: String,
    #[arg(long, help = "School history document to attach")]
    pub school_history_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum RecordCommands {
    List {
        #[arg(value_enum)]
        kind: RecordKind,
        patient: u64,
    },
    /// Create a record from a JSON draft.
    Add {
        #[arg(value_enum)]
        kind: RecordKind,
        patient: u64,
        #[arg(long, help = "JSON draft file, or - for stdin")]
        data: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RecordKind {
    Assessments,
    Sessions,
    Reports,
    FamilySessions,
    Surveys,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProfessionArg {
    Psychologist,
    Psychopedagogist,
}

impl From<ProfessionArg> for Profession {
    fn from(value: ProfessionArg) -> Self {
        match value {
            ProfessionArg::Psychologist => Self::Psychologist,
            ProfessionArg::Psychopedagogist => Self::Psychopedagogist,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SexArg {
    M,
    F,
    O,
}

impl From<SexArg> for Sex {
    fn from(value: SexArg) -> Self {
        match value {
            SexArg::M => Self::Male,
            SexArg::F => Self::Female,
            SexArg::O => Self::Other,
        }
    }
}
