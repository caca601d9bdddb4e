use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    clock,
    error::{AppError, AppResult, FieldError},
};

/// Status enums stored as lowercase TEXT, each with a human label for the
/// back-office.
pub trait TextEnum: Copy + 'static {
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;

    fn label(self) -> &'static str;

    fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|item| item.as_str() == value)
    }

    fn choices() -> Vec<StatusChoice> {
        Self::ALL
            .iter()
            .map(|item| StatusChoice {
                value: item.as_str(),
                label: item.label(),
            })
            .collect()
    }

    /// Reads a list filter: missing, blank or `all` means no filter, anything
    /// else has to name a variant.
    fn from_filter(field: &'static str, value: Option<&str>) -> AppResult<Option<Self>> {
        match value.map(str::trim) {
            None | Some("") | Some("all") => Ok(None),
            Some(value) => Self::parse(value)
                .map(Some)
                .ok_or_else(|| AppError::invalid(field, format!("Unknown status {value}"))),
        }
    }
}

/// One `<select>` option: the stored value and what the admin reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StatusChoice {
    pub value: &'static str,
    pub label: &'static str,
}

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $value:literal, $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
        #[serde(rename_all = "lowercase")]
        #[sqlx(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl TextEnum for $name {
            const ALL: &'static [$name] = &[$($name::$variant),+];

            fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }

            fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }
    };
}

text_enum! {
    /// Scheduling state of an appointment. Any value may replace any other.
    AppointmentStatus {
        Scheduled => "scheduled", "Scheduled",
        Confirmed => "confirmed", "Confirmed",
        Completed => "completed", "Completed",
        Cancelled => "cancelled", "Cancelled",
    }
}

text_enum! {
    /// Payment state, independent of [`AppointmentStatus`].
    PaymentStatus {
        Pending => "pending", "Pending",
        Partial => "partial", "Partially paid",
        Paid => "paid", "Paid",
        Refunded => "refunded", "Refunded",
    }
}

text_enum! {
    LeadStatus {
        New => "new", "New",
        Contacted => "contacted", "Contacted",
        Converted => "converted", "Converted",
        Rejected => "rejected", "Rejected",
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
    Client,
}

impl Default for AppointmentStatus {
    fn default() -> Self {
        AppointmentStatus::Scheduled
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

impl Default for LeadStatus {
    fn default() -> Self {
        LeadStatus::New
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Profile {
    pub id: String,
    pub username: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    #[serde(skip)]
    pub password_hash: String,
    pub active: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Client {
    pub id: String,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: i64,
    pub price: f64,
    pub original_price: Option<f64>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Appointment {
    pub id: String,
    pub client_id: String,
    pub service_id: String,
    pub appointment_date: String,
    pub status: AppointmentStatus,
    pub payment_amount: f64,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Appointment joined with the names the admin list shows.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AppointmentDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub appointment: Appointment,
    pub client_name: String,
    pub service_name: String,
    pub service_price: f64,
}

/// What the back-office receives for an appointment: the stored row plus
/// the readable labels of both status axes.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentRow {
    #[serde(flatten)]
    pub detail: AppointmentDetail,
    pub status_label: &'static str,
    pub payment_status_label: &'static str,
}

impl From<AppointmentDetail> for AppointmentRow {
    fn from(detail: AppointmentDetail) -> Self {
        Self {
            status_label: detail.appointment.status.label(),
            payment_status_label: detail.appointment.payment_status.label(),
            detail,
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Lead {
    pub id: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub service_interested: Option<String>,
    pub preferred_date: Option<String>,
    pub message: Option<String>,
    pub status: LeadStatus,
    pub follow_up_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Lead {
    pub fn follow_up_at(&self) -> Option<DateTime<Utc>> {
        self.follow_up_date.as_deref().and_then(clock::parse_timestamp)
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Banner {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub priority: i64,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Review {
    pub id: String,
    pub full_name: String,
    pub email: Option<String>,
    pub rating: i64,
    pub review_text: String,
    pub is_approved: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientDraft {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

impl ClientDraft {
    pub fn normalize(mut self) -> Result<Self, Vec<FieldError>> {
        self.full_name = self.full_name.trim().to_string();
        self.email = non_blank(self.email);
        self.phone = non_blank(self.phone);
        self.address = non_blank(self.address);
        self.notes = non_blank(self.notes);

        if self.full_name.is_empty() {
            return Err(vec![FieldError::new("full_name", "Full name is required")]);
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceDraft {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_duration")]
    pub duration_minutes: i64,
    pub price: f64,
    pub original_price: Option<f64>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl ServiceDraft {
    pub fn normalize(mut self) -> Result<Self, Vec<FieldError>> {
        self.name = self.name.trim().to_string();
        self.description = non_blank(self.description);
        self.category = non_blank(self.category);
        self.image_url = non_blank(self.image_url);

        let mut errors = Vec::new();
        if self.name.is_empty() {
            errors.push(FieldError::new("name", "Service name is required"));
        }
        if self.duration_minutes <= 0 {
            errors.push(FieldError::new("duration_minutes", "Duration must be positive"));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            errors.push(FieldError::new("price", "Price must be zero or more"));
        }
        if let Some(original) = self.original_price {
            if !original.is_finite() || original < 0.0 {
                errors.push(FieldError::new("original_price", "Original price must be zero or more"));
            }
        }
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(errors)
        }
    }
}

/// Appointment form. `appointment_date` holds the normalized database
/// timestamp once the admin handler has parsed it.
#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentDraft {
    pub client_id: String,
    pub service_id: String,
    pub appointment_date: String,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub payment_amount: f64,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
}

impl AppointmentDraft {
    /// Resolves `appointment_date` against the business offset and stores it
    /// in database form.
    pub fn normalize(mut self, offset: FixedOffset) -> Result<Self, Vec<FieldError>> {
        self.client_id = self.client_id.trim().to_string();
        self.service_id = self.service_id.trim().to_string();
        self.notes = non_blank(self.notes);

        let mut errors = Vec::new();
        if self.client_id.is_empty() {
            errors.push(FieldError::new("client_id", "Client is required"));
        }
        if self.service_id.is_empty() {
            errors.push(FieldError::new("service_id", "Service is required"));
        }
        match clock::parse_form_datetime(&self.appointment_date, offset) {
            Some(at) => self.appointment_date = clock::to_db_timestamp(at),
            None => errors.push(FieldError::new(
                "appointment_date",
                "Appointment date and time are required",
            )),
        }
        if !self.payment_amount.is_finite() || self.payment_amount < 0.0 {
            errors.push(FieldError::new("payment_amount", "Payment amount must be zero or more"));
        }
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BannerDraft {
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    #[serde(default)]
    pub priority: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl BannerDraft {
    pub fn normalize(mut self) -> Result<Self, Vec<FieldError>> {
        self.title = self.title.trim().to_string();
        self.description = non_blank(self.description);
        self.image_url = non_blank(self.image_url);
        self.link_url = non_blank(self.link_url);

        if self.title.is_empty() {
            return Err(vec![FieldError::new("title", "Title is required")]);
        }
        Ok(self)
    }
}

/// A lead as captured by one of the public forms.
#[derive(Debug, Clone, Default)]
pub struct LeadDraft {
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub service_interested: Option<String>,
    pub preferred_date: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReviewDraft {
    pub full_name: String,
    pub email: Option<String>,
    pub rating: i64,
    pub review_text: String,
}

pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn default_true() -> bool {
    true
}

fn default_duration() -> i64 {
    60
}
