pub mod llm;
pub mod queue;
pub mod ticket_service;
pub mod worker;

pub use llm::{AnthropicClassifier, OpenAiDrafter, ResponseDrafter, TicketClassifier};
pub use queue::{Job, JobDispatcher, JobHandle, JobPayload, RedisJobQueue};
pub use ticket_service::TicketService;
pub use worker::{JobConsumer, TicketProcessor};
