pub mod schemas;
pub mod ticket;

pub use schemas::*;
pub use ticket::*;
