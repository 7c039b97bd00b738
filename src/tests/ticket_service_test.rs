use chrono::Utc;
use uuid::Uuid;

use crate::models::{Ticket, TicketCategory, TicketPriority, TicketStatus};
use crate::services::TicketService;
use crate::tests::common::{create_test_db, sample_classification, seed_ticket};
use crate::utils::ApiError;

#[tokio::test]
async fn save_then_get_returns_identical_record() {
    let tickets = TicketService::new(create_test_db().await);
    let ticket = seed_ticket(&tickets, "Login issue").await;

    let fetched = tickets.get(ticket.id).await.unwrap().expect("ticket should exist");
    assert_eq!(fetched.id, ticket.id);
    assert_eq!(fetched.subject, "Login issue");
    assert_eq!(fetched.status, TicketStatus::Submitted);
    assert!(fetched.category.is_none());
    assert!(fetched.processed_at.is_none());

    // Idempotence: a second read without intervening writes is identical
    let again = tickets.get(ticket.id).await.unwrap().unwrap();
    assert_eq!(again, fetched);
}

#[tokio::test]
async fn get_missing_ticket_is_none_not_error() {
    let tickets = TicketService::new(create_test_db().await);
    let result = tickets.get(Uuid::new_v4()).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn duplicate_id_is_a_constraint_violation() {
    let tickets = TicketService::new(create_test_db().await);
    let ticket = seed_ticket(&tickets, "First").await;

    let mut duplicate = Ticket::new("Second".into(), "body".into(), "a@b.com".into());
    duplicate.id = ticket.id;

    let err = tickets.save(&duplicate).await.unwrap_err();
    assert!(matches!(err, ApiError::Constraint(_)));
}

#[tokio::test]
async fn filter_paginates_newest_first() {
    let tickets = TicketService::new(create_test_db().await);
    for i in 0..5 {
        seed_ticket(&tickets, &format!("Ticket {}", i)).await;
    }

    let first_page = tickets.filter(1, 2, None, None, None).await.unwrap();
    assert_eq!(first_page.len(), 2);

    let second_page = tickets.filter(2, 2, None, None, None).await.unwrap();
    assert_eq!(second_page.len(), 2);

    let third_page = tickets.filter(3, 2, None, None, None).await.unwrap();
    assert_eq!(third_page.len(), 1);

    // No overlap between pages
    assert!(first_page.iter().all(|t| second_page.iter().all(|u| u.id != t.id)));
}

#[tokio::test]
async fn filter_rejects_out_of_range_pagination() {
    let tickets = TicketService::new(create_test_db().await);

    let err = tickets.filter(0, 10, None, None, None).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    let err = tickets.filter(1, 0, None, None, None).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    let err = tickets.filter(1, 51, None, None, None).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn filter_by_classification_fields() {
    let tickets = TicketService::new(create_test_db().await);
    let classified = seed_ticket(&tickets, "Classified").await;
    seed_ticket(&tickets, "Unclassified").await;

    tickets
        .complete(classified.id, &sample_classification(), "A reply", Utc::now())
        .await
        .unwrap();

    let matches = tickets
        .filter(1, 50, None, Some(TicketCategory::AccountAccess), Some(TicketPriority::High))
        .await
        .unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].id, classified.id);

    let processed = tickets
        .filter(1, 50, Some(TicketStatus::Processed), None, None)
        .await
        .unwrap();
    assert_eq!(processed.len(), 1);

    let submitted = tickets
        .filter(1, 50, Some(TicketStatus::Submitted), None, None)
        .await
        .unwrap();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].subject, "Unclassified");
}

#[tokio::test]
async fn filter_by_status_is_unpaginated() {
    let tickets = TicketService::new(create_test_db().await);
    for i in 0..3 {
        seed_ticket(&tickets, &format!("Ticket {}", i)).await;
    }

    let submitted = tickets.filter_by_status(TicketStatus::Submitted).await.unwrap();
    assert_eq!(submitted.len(), 3);

    let processed = tickets.filter_by_status(TicketStatus::Processed).await.unwrap();
    assert!(processed.is_empty());
}

#[tokio::test]
async fn set_status_on_missing_ticket_fails() {
    let tickets = TicketService::new(create_test_db().await);
    let err = tickets
        .set_status(Uuid::new_v4(), TicketStatus::Processing)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::TicketNotFound { .. }));
}

#[tokio::test]
async fn complete_writes_all_classification_fields_together() {
    let tickets = TicketService::new(create_test_db().await);
    let ticket = seed_ticket(&tickets, "Login issue").await;

    let processed_at = Utc::now();
    tickets
        .complete(ticket.id, &sample_classification(), "Thanks, we are on it.", processed_at)
        .await
        .unwrap();

    let fetched = tickets.get(ticket.id).await.unwrap().unwrap();
    assert_eq!(fetched.status, TicketStatus::Processed);
    assert_eq!(fetched.category, Some(TicketCategory::AccountAccess));
    assert_eq!(fetched.priority, Some(TicketPriority::High));
    assert_eq!(fetched.category_confidence, Some(0.92));
    assert_eq!(fetched.priority_confidence, Some(0.85));
    assert_eq!(fetched.initial_response.as_deref(), Some("Thanks, we are on it."));
    assert!(fetched.processed_at.is_some());
}
