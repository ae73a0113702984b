//! Bus arrival notifier.
//!
//! A background service that answers: "is the bus I'm waiting for
//! close enough that I should leave for the stop now?"

pub mod cache;
pub mod config;
pub mod domain;
pub mod feed;
pub mod monitor;
pub mod notify;
pub mod stops;
