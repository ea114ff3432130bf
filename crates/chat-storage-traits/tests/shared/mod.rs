//! Storage test functions shared by every backend

pub mod conversation_tests;
pub mod message_tests;
pub mod user_tests;
