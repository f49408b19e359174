#![deny(warnings)]

//! Prosody control plane for conversational speech synthesis.
//!
//! [`prosody`] turns text plus an affect signal into advisory timing, pitch and emphasis
//! controls. [`rhythm`] derives live conversational timing statistics from speech
//! lifecycle events.

pub mod clock;
pub mod config;
pub mod prosody;
pub mod rhythm;
pub mod util;
