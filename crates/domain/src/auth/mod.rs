//! Authentication domain types

mod profile;
mod tokens;

pub use profile::{Credentials, Profession, Profile, ProfileUpdate, Registration};
pub use tokens::{RefreshGrant, TokenKind, TokenPair, token_preview};
