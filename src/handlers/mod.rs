pub mod health;
pub mod ticket;
