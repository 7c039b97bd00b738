use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::ticket::{Ticket, TicketCategory, TicketPriority, TicketStatus};

/// Request body for ticket creation. Field validation (required fields,
/// email format) happens here; everything else is immutable intake data.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTicketRequest {
    #[validate(length(min = 1, message = "subject must not be empty"))]
    pub subject: String,
    #[validate(length(min = 1, message = "body must not be empty"))]
    pub body: String,
    #[validate(email(message = "customer_email must be a valid email address"))]
    pub customer_email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TicketCreated {
    pub ticket_id: Uuid,
    pub status: TicketStatus,
    pub message: String,
}

/// Query parameters for `GET /v1/tickets`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ListTicketsQuery {
    pub status: Option<TicketStatus>,
    pub category: Option<TicketCategory>,
    pub priority: Option<TicketPriority>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedTickets {
    pub tickets: Vec<Ticket>,
    pub total: usize,
    pub page: u32,
    pub per_page: u32,
}

/// Response for the bulk processing trigger.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProcessAccepted {
    pub message: String,
    pub job_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PingResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// Classification result produced by the LLM: category and priority drawn
/// from the fixed vocabularies, each with a confidence in [0.0, 1.0].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Classification {
    pub category: TicketCategory,
    pub priority: TicketPriority,
    pub category_confidence: f64,
    pub priority_confidence: f64,
}

impl Classification {
    /// Both confidence scores must land in [0.0, 1.0]; anything else means
    /// the model ignored the prompt contract.
    pub fn confidences_in_range(&self) -> bool {
        (0.0..=1.0).contains(&self.category_confidence)
            && (0.0..=1.0).contains(&self.priority_confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_rejects_bad_email() {
        let req = CreateTicketRequest {
            subject: "Login issue".into(),
            body: "Cannot log in".into(),
            customer_email: "not-an-email".into(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn create_request_rejects_empty_subject() {
        let req = CreateTicketRequest {
            subject: "".into(),
            body: "Cannot log in".into(),
            customer_email: "a@b.com".into(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn create_request_accepts_valid_input() {
        let req = CreateTicketRequest {
            subject: "Login issue".into(),
            body: "Cannot log in".into(),
            customer_email: "a@b.com".into(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn classification_confidence_bounds() {
        let mut classification = Classification {
            category: TicketCategory::AccountAccess,
            priority: TicketPriority::High,
            category_confidence: 0.9,
            priority_confidence: 0.7,
        };
        assert!(classification.confidences_in_range());

        classification.priority_confidence = 1.2;
        assert!(!classification.confidences_in_range());
    }

    #[test]
    fn classification_parses_model_output() {
        let raw = r#"{
            "category": "Account Access",
            "category_confidence": 0.92,
            "priority": "High",
            "priority_confidence": 0.85
        }"#;
        let parsed: Classification = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.category, TicketCategory::AccountAccess);
        assert_eq!(parsed.priority, TicketPriority::High);
    }
}
