//! Reply Desk - Conversational reply pipeline for social posts
//!
//! This crate decides whether an inbound post goes to a human or gets an
//! automated reply, composes and repairs that reply, and turns human
//! corrections into training runs.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
