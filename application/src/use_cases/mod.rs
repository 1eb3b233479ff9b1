//! Use cases (application services)

pub mod group_chat;
