use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Ticket lifecycle state.
///
/// Valid transitions: submitted -> processing -> processed, plus
/// processing -> submitted when a processing attempt fails. `processed`
/// is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum TicketStatus {
    Submitted,
    Processing,
    Processed,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 3] = [Self::Submitted, Self::Processing, Self::Processed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Processing => "processing",
            Self::Processed => "processed",
        }
    }
}

/// Ticket priority assigned by classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
pub enum TicketPriority {
    Low,
    High,
}

impl TicketPriority {
    pub const ALL: [TicketPriority; 2] = [Self::Low, Self::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::High => "High",
        }
    }
}

/// Ticket category assigned by classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
pub enum TicketCategory {
    #[serde(rename = "Account Access")]
    #[sqlx(rename = "Account Access")]
    AccountAccess,
    #[serde(rename = "Feature Request")]
    #[sqlx(rename = "Feature Request")]
    FeatureRequest,
    Unknown,
}

impl TicketCategory {
    pub const ALL: [TicketCategory; 3] = [Self::AccountAccess, Self::FeatureRequest, Self::Unknown];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccountAccess => "Account Access",
            Self::FeatureRequest => "Feature Request",
            Self::Unknown => "Unknown",
        }
    }
}

/// Join enum wire values into a separator-delimited list, used to splice the
/// fixed vocabularies into classification prompts.
pub fn vocabulary_csv(values: &[&str], sep: &str) -> String {
    values.join(sep)
}

/// One customer support request and its processing state.
///
/// `category`/`priority` and their confidence fields are written together by
/// the background processor or not at all; `processed_at` is set exactly when
/// the status becomes `processed`.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Ticket {
    pub id: Uuid,
    pub subject: String,
    pub body: String,
    pub customer_email: String,
    pub status: TicketStatus,
    pub category: Option<TicketCategory>,
    pub priority: Option<TicketPriority>,
    pub category_confidence: Option<f64>,
    pub priority_confidence: Option<f64>,
    pub initial_response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl Ticket {
    /// Build a fresh ticket from intake fields. Classification fields start
    /// empty and are only ever written by the background processor.
    pub fn new(subject: String, body: String, customer_email: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject,
            body,
            customer_email,
            status: TicketStatus::Submitted,
            category: None,
            priority: None,
            category_confidence: None,
            priority_confidence: None,
            initial_response: None,
            created_at: Utc::now(),
            processed_at: None,
        }
    }
}
