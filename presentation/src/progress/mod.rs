//! Console progress and event rendering

pub mod reporter;
