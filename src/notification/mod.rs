//! Delivery of formatted notifications.
//!
//! The handler only talks to the `SlackClientTrait`, so tests can swap the
//! webhook client for a recording fake.
pub mod slack;

pub use slack::{SlackClient, SlackClientTrait};
