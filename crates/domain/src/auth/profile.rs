//! Professional profile and account payloads

use serde::{Deserialize, Deserializer, Serialize};

use crate::validation::ValidationErrors;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 10;

/// Area of practice of the professional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profession {
    /// Psychologist.
    Psychologist,
    /// Psychopedagogist.
    Psychopedagogist,
}

impl Profession {
    /// Human-readable name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Psychologist => "Psychologist",
            Self::Psychopedagogist => "Psychopedagogist",
        }
    }
}

/// The server stores an unset profession as an empty string.
fn blank_profession<'de, D>(deserializer: D) -> Result<Option<Profession>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Known(Profession),
        Other(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Known(profession)) => Some(profession),
        Some(Raw::Other(_)) | None => None,
    })
}

/// Authenticated user record returned by `GET /auth/me/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Server identifier.
    pub id: u64,
    /// Login e-mail.
    pub email: String,
    /// Full name.
    pub full_name: String,
    /// Professional registration number.
    #[serde(default)]
    pub crp: String,
    /// Area of practice.
    #[serde(default, deserialize_with = "blank_profession")]
    pub profession: Option<Profession>,
    /// Institution.
    #[serde(default)]
    pub institution: String,
    /// Whether the professional receives review reminders.
    #[serde(default = "default_true")]
    pub accepts_notifications: bool,
}

const fn default_true() -> bool {
    true
}

/// Login credentials for `POST /auth/login/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Login e-mail.
    pub email: String,
    /// Password.
    pub password: String,
}

impl Credentials {
    /// Creates credentials.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Account creation payload for `POST /auth/register/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Full name.
    pub full_name: String,
    /// Login e-mail.
    pub email: String,
    /// Password.
    pub password: String,
    /// Professional registration number.
    pub crp: String,
    /// Area of practice.
    pub profession: Option<Profession>,
    /// Institution.
    #[serde(default)]
    pub institution: String,
}

impl Registration {
    /// Checks the form before it is sent.
    ///
    /// Returns field-level messages in the same shape as server-side
    /// validation failures, so both can be rendered the same way.
    #[must_use]
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();
        if self.full_name.trim().is_empty() {
            errors.insert_field("full_name", "Full name is required.");
        }
        if self.email.trim().is_empty() {
            errors.insert_field("email", "A valid professional e-mail is required.");
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.insert_field(
                "password",
                format!("Password must have at least {MIN_PASSWORD_LEN} characters."),
            );
        }
        if self.crp.trim().is_empty() {
            errors.insert_field("crp", "Professional registration (CRP) is required.");
        }
        if self.profession.is_none() {
            errors.insert_field("profession", "Select an area of practice.");
        }
        if !errors.is_empty() {
            errors.set_global("Review the highlighted fields before continuing.");
        }
        errors
    }
}

/// Editable profile fields for `PUT /auth/me/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    /// Full name.
    pub full_name: String,
    /// Institution.
    pub institution: String,
    /// Professional registration number.
    pub crp: String,
    /// Notification preference.
    pub accepts_notifications: bool,
}

impl From<&Profile> for ProfileUpdate {
    fn from(profile: &Profile) -> Self {
        Self {
            full_name: profile.full_name.clone(),
            institution: profile.institution.clone(),
            crp: profile.crp.clone(),
            accepts_notifications: profile.accepts_notifications,
        }
    }
}
