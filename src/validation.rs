//! Checks applied to the public capture forms before anything reaches the
//! store.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;

use crate::{
    clock,
    error::FieldError,
    models::{non_blank, LeadDraft, ReviewDraft},
};

pub const NAME_MAX: usize = 100;
pub const EMAIL_MAX: usize = 255;
pub const SERVICE_MAX: usize = 100;
pub const MESSAGE_MAX: usize = 1000;
pub const PHONE_DIGITS: std::ops::RangeInclusive<usize> = 10..=15;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct BookingForm {
    #[serde(default)]
    pub service_id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    pub email: Option<String>,
    #[serde(default)]
    pub preferred_date: String,
    pub message: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    pub email: Option<String>,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub service: String,
    pub message: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ReviewForm {
    #[serde(default)]
    pub name: String,
    pub email: Option<String>,
    pub rating: Option<String>,
    #[serde(default)]
    pub review: String,
}

/// Booking request from the per-service dialog. `service_name` is `None`
/// when the posted service id does not resolve to an active service.
pub fn booking(
    form: &BookingForm,
    service_name: Option<&str>,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Result<LeadDraft, Vec<FieldError>> {
    let mut errors = Vec::new();
    let full_name = form.full_name.trim();
    let phone = form.phone.trim();

    if full_name.is_empty() {
        errors.push(FieldError::new("full_name", "Full name is required."));
    }
    if phone.is_empty() {
        errors.push(FieldError::new("phone", "Phone number is required."));
    }
    if service_name.is_none() {
        errors.push(FieldError::new("service_id", "Please choose a service."));
    }

    let preferred = match clock::parse_form_datetime(&form.preferred_date, offset) {
        Some(at) if clock::local_date(at, offset) < clock::local_date(now, offset) => {
            errors.push(FieldError::new(
                "preferred_date",
                "Preferred date cannot be in the past.",
            ));
            None
        }
        Some(at) => Some(clock::to_db_timestamp(at)),
        None => {
            errors.push(FieldError::new("preferred_date", "Please pick a preferred date."));
            None
        }
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(LeadDraft {
        full_name: full_name.to_string(),
        phone: Some(phone.to_string()),
        email: non_blank(form.email.clone()),
        service_interested: service_name.map(str::to_string),
        preferred_date: preferred,
        message: non_blank(form.message.clone()),
    })
}

/// Schema-checked contact form.
pub fn contact(form: &ContactForm) -> Result<LeadDraft, Vec<FieldError>> {
    let mut errors = Vec::new();
    let name = form.name.trim();
    let phone = form.phone.trim();
    let service = form.service.trim();
    let email = non_blank(form.email.clone());
    let message = non_blank(form.message.clone());

    if name.is_empty() {
        errors.push(FieldError::new("name", "Name is required."));
    } else if name.chars().count() > NAME_MAX {
        errors.push(FieldError::new(
            "name",
            format!("Name must be less than {NAME_MAX} characters."),
        ));
    }

    if let Some(email) = email.as_deref() {
        if email.chars().count() > EMAIL_MAX {
            errors.push(FieldError::new(
                "email",
                format!("Email must be less than {EMAIL_MAX} characters."),
            ));
        } else if !is_email(email) {
            errors.push(FieldError::new("email", "Please enter a valid email address."));
        }
    }

    if !is_phone(phone) {
        errors.push(FieldError::new(
            "phone",
            "Please enter a valid phone number (10-15 digits).",
        ));
    }

    if service.is_empty() {
        errors.push(FieldError::new("service", "Please tell us which service you need."));
    } else if service.chars().count() > SERVICE_MAX {
        errors.push(FieldError::new(
            "service",
            format!("Service must be less than {SERVICE_MAX} characters."),
        ));
    }

    if message
        .as_deref()
        .is_some_and(|message| message.chars().count() > MESSAGE_MAX)
    {
        errors.push(FieldError::new(
            "message",
            format!("Message must be less than {MESSAGE_MAX} characters."),
        ));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(LeadDraft {
        full_name: name.to_string(),
        phone: Some(phone.to_string()),
        email,
        service_interested: Some(service.to_string()),
        preferred_date: None,
        message,
    })
}

/// Review submission. A missing or zero rating is rejected here so no
/// insert is attempted.
pub fn review(form: &ReviewForm) -> Result<ReviewDraft, Vec<FieldError>> {
    let mut errors = Vec::new();
    let rating = form
        .rating
        .as_deref()
        .and_then(|value| value.trim().parse::<i64>().ok())
        .unwrap_or(0);

    if rating == 0 {
        errors.push(FieldError::new("rating", "Please select a rating"));
    } else if !(1..=5).contains(&rating) {
        errors.push(FieldError::new("rating", "Rating must be between 1 and 5"));
    }
    if form.name.trim().is_empty() {
        errors.push(FieldError::new("name", "Name is required."));
    }
    if form.review.trim().is_empty() {
        errors.push(FieldError::new("review", "Please write a few words about your experience."));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ReviewDraft {
        full_name: form.name.trim().to_string(),
        email: non_blank(form.email.clone()),
        rating,
        review_text: form.review.trim().to_string(),
    })
}

fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

fn is_phone(value: &str) -> bool {
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')'));
    let digits = value.chars().filter(char::is_ascii_digit).count();
    allowed && PHONE_DIGITS.contains(&digits)
}
