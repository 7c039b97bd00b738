use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::models::{Classification, Ticket, TicketCategory, TicketPriority, TicketStatus};
use crate::utils::{ApiError, ApiResult};

pub const MAX_PER_PAGE: u32 = 50;

/// Repository for ticket records.
///
/// Exclusively owns ticket persistence. Every write is a single
/// self-contained statement; there is no multi-record atomicity across
/// calls, so the background processor can crash between steps without
/// corrupting data.
#[derive(Clone)]
pub struct TicketService {
    pool: SqlitePool,
}

impl TicketService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a new ticket. A duplicate id is a constraint violation.
    pub async fn save(&self, ticket: &Ticket) -> ApiResult<()> {
        sqlx::query(
            r#"
            INSERT INTO tickets
                (id, subject, body, customer_email, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(ticket.id)
        .bind(&ticket.subject)
        .bind(&ticket.body)
        .bind(&ticket.customer_email)
        .bind(ticket.status)
        .bind(ticket.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiError::constraint(format!("Ticket {} already exists", ticket.id))
            },
            _ => ApiError::from(e),
        })?;

        Ok(())
    }

    /// Fetch a ticket by id. Absence is not an error.
    pub async fn get(&self, ticket_id: Uuid) -> ApiResult<Option<Ticket>> {
        let ticket = sqlx::query_as("SELECT * FROM tickets WHERE id = ?")
            .bind(ticket_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(ticket)
    }

    /// Page through tickets matching the optional filters, newest first.
    ///
    /// `page` starts at 1; `per_page` is capped at [`MAX_PER_PAGE`]. The id
    /// tie-breaker keeps the order stable across identical timestamps.
    pub async fn filter(
        &self,
        page: u32,
        per_page: u32,
        status: Option<TicketStatus>,
        category: Option<TicketCategory>,
        priority: Option<TicketPriority>,
    ) -> ApiResult<Vec<Ticket>> {
        if page < 1 {
            return Err(ApiError::validation("page must be >= 1"));
        }
        if per_page < 1 || per_page > MAX_PER_PAGE {
            return Err(ApiError::validation(format!(
                "per_page must be between 1 and {}",
                MAX_PER_PAGE
            )));
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM tickets WHERE 1 = 1");

        if let Some(status) = status {
            builder.push(" AND status = ").push_bind(status);
        }
        if let Some(category) = category {
            builder.push(" AND category = ").push_bind(category);
        }
        if let Some(priority) = priority {
            builder.push(" AND priority = ").push_bind(priority);
        }

        builder.push(" ORDER BY created_at DESC, id");
        builder.push(" LIMIT ").push_bind(per_page as i64);
        builder
            .push(" OFFSET ")
            .push_bind(((page - 1) as i64) * (per_page as i64));

        let tickets = builder.build_query_as::<Ticket>().fetch_all(&self.pool).await?;
        Ok(tickets)
    }

    /// All tickets in a given status, unpaginated. Used by the bulk trigger
    /// to collect the submitted backlog.
    pub async fn filter_by_status(&self, status: TicketStatus) -> ApiResult<Vec<Ticket>> {
        let tickets = sqlx::query_as(
            "SELECT * FROM tickets WHERE status = ? ORDER BY created_at, id",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(tickets)
    }

    /// Transition a ticket to a new status. Fails if the ticket is gone.
    pub async fn set_status(&self, ticket_id: Uuid, status: TicketStatus) -> ApiResult<()> {
        let result = sqlx::query("UPDATE tickets SET status = ? WHERE id = ?")
            .bind(status)
            .bind(ticket_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::TicketNotFound { ticket_id });
        }
        Ok(())
    }

    /// Record a successful processing attempt as one statement: category,
    /// priority, both confidences, the drafted response, processed_at and
    /// the terminal status land together or not at all.
    pub async fn complete(
        &self,
        ticket_id: Uuid,
        classification: &Classification,
        initial_response: &str,
        processed_at: DateTime<Utc>,
    ) -> ApiResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET status = ?,
                category = ?,
                priority = ?,
                category_confidence = ?,
                priority_confidence = ?,
                initial_response = ?,
                processed_at = ?
            WHERE id = ?
            "#,
        )
        .bind(TicketStatus::Processed)
        .bind(classification.category)
        .bind(classification.priority)
        .bind(classification.category_confidence)
        .bind(classification.priority_confidence)
        .bind(initial_response)
        .bind(processed_at)
        .bind(ticket_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::TicketNotFound { ticket_id });
        }
        Ok(())
    }
}
