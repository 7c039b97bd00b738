mod common;
mod ticket_service_test;
