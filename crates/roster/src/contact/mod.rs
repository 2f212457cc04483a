//! "Request this associate" inquiries.
//!
//! A [`ContactRequest`] is validated, routed to the inbox of the office that
//! handles the profile, and handed to a [`Mailer`]. Delivery problems are
//! logged and never reported back to the visitor.

mod mailer;

use std::{collections::HashMap, sync::Arc};

use ahash::AHashMap;
pub use error::ContactError;
pub use mailer::{EmailMessage, HttpMailer, LogMailer, Mailer};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::{model::Profile, store::ProfileStore};

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex"));

/// Body of `POST /api/contact`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    /// Number or numeric string.
    #[serde(default)]
    pub profile_id: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    /// Route to this office instead of the profile's own.
    #[serde(default)]
    pub location: Option<String>,
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidContact {
    pub profile_id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub comment: String,
    pub location: Option<String>,
}

fn required(value: Option<&str>, field: &'static str) -> Result<String, ContactError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .ok_or(ContactError::MissingField(field))
}

fn optional(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_owned)
}

fn profile_id(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl ContactRequest {
    /// Check required fields in order: profile id, name, email, comment.
    pub fn validate(&self) -> Result<ValidContact, ContactError> {
        let profile_id =
            profile_id(self.profile_id.as_ref()).ok_or(ContactError::MissingField("profileId"))?;
        let name = required(self.name.as_deref(), "name")?;
        let email = required(self.email.as_deref(), "email")?;
        let comment = required(self.comment.as_deref(), "comment")?;
        if !EMAIL.is_match(&email) {
            return Err(ContactError::InvalidEmail);
        }

        Ok(ValidContact {
            profile_id,
            name,
            email,
            phone: optional(self.phone.as_deref()),
            comment,
            location: optional(self.location.as_deref()),
        })
    }
}

/// Office name to inbox, with a fallback for unknown offices.
#[derive(Debug, Clone)]
pub struct OfficeDirectory {
    default_email: String,
    offices: AHashMap<String, String>,
}

impl OfficeDirectory {
    pub fn new(default_email: impl Into<String>, offices: &HashMap<String, String>) -> Self {
        Self {
            default_email: default_email.into(),
            offices: offices
                .iter()
                .map(|(office, email)| (office.trim().to_lowercase(), email.clone()))
                .collect(),
        }
    }

    pub fn default_email(&self) -> &str {
        &self.default_email
    }

    /// Inbox for `office`, matched case-insensitively.
    pub fn email_for(&self, office: Option<&str>) -> &str {
        office
            .and_then(|o| self.offices.get(&o.trim().to_lowercase()))
            .map_or(self.default_email.as_str(), String::as_str)
    }
}

/// What happened to an accepted request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactReceipt {
    pub routed_to: String,
    pub delivered: bool,
}

pub struct ContactService {
    store: Arc<dyn ProfileStore>,
    directory: OfficeDirectory,
    mailer: Arc<dyn Mailer>,
    from_email: String,
}

impl ContactService {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        directory: OfficeDirectory,
        mailer: Arc<dyn Mailer>,
        from_email: impl Into<String>,
    ) -> Self {
        Self {
            store,
            directory,
            mailer,
            from_email: from_email.into(),
        }
    }

    /// Validate, route and send. Only validation failures are errors.
    #[instrument(name = "Contact request", skip_all)]
    pub async fn submit(&self, request: &ContactRequest) -> Result<ContactReceipt, ContactError> {
        let contact = request.validate()?;

        let profile = match self.store.profile(contact.profile_id).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(
                    profile_id = contact.profile_id,
                    error = %e,
                    "Profile lookup failed, routing to default inbox"
                );
                None
            }
        };
        let office = contact
            .location
            .as_deref()
            .or_else(|| profile.as_ref().map(|p| p.office.as_str()))
            .filter(|o| !o.trim().is_empty());
        let to = self.directory.email_for(office).to_owned();

        let message = EmailMessage {
            to: to.clone(),
            from: self.from_email.clone(),
            subject: subject(contact.profile_id, profile.as_ref()),
            text: body(&contact, profile.as_ref(), office),
            reply_to: contact.email.clone(),
        };

        let delivered = match self.mailer.send(&message).await {
            Ok(()) => {
                info!(profile_id = contact.profile_id, %to, "Contact request sent");
                true
            }
            Err(e) => {
                error!(
                    profile_id = contact.profile_id,
                    %to,
                    error = %e,
                    "Contact request could not be sent"
                );
                false
            }
        };
        Ok(ContactReceipt {
            routed_to: to,
            delivered,
        })
    }
}

fn display_name(profile: &Profile) -> String {
    format!("{} {}.", profile.first_name, profile.last_initial)
}

fn subject(profile_id: i64, profile: Option<&Profile>) -> String {
    profile.map_or_else(
        || format!("Associate request for profile #{profile_id}"),
        |p| format!("Associate request: {} (#{profile_id})", display_name(p)),
    )
}

fn body(contact: &ValidContact, profile: Option<&Profile>, office: Option<&str>) -> String {
    let mut lines = vec![format!("Profile: #{}", contact.profile_id)];
    if let Some(profile) = profile {
        lines.push(format!("Associate: {}", display_name(profile)));
        lines.push(format!("Profession: {}", profile.profession_type));
    }
    if let Some(office) = office {
        lines.push(format!("Office: {office}"));
    }
    lines.push(format!("From: {} <{}>", contact.name, contact.email));
    if let Some(phone) = &contact.phone {
        lines.push(format!("Phone: {phone}"));
    }
    lines.push(String::new());
    lines.push(contact.comment.clone());
    lines.join("\n")
}

mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum ContactError {
        #[error("Missing required field: {0}")]
        MissingField(&'static str),
        #[error("Invalid email address")]
        InvalidEmail,
        #[error("HTTP error: {0}")]
        Http(#[from] reqwest::Error),
        #[error("Mail relay rejected the message: {0}")]
        Rejected(String),
    }

    impl ContactError {
        /// Machine-readable reason for validation failures.
        pub const fn reason(&self) -> Option<&'static str> {
            match self {
                Self::MissingField(_) => Some("missing_field"),
                Self::InvalidEmail => Some("invalid_email"),
                Self::Http(_) | Self::Rejected(_) => None,
            }
        }

        pub const fn field(&self) -> Option<&'static str> {
            match self {
                Self::MissingField(field) => Some(*field),
                _ => None,
            }
        }
    }
}
