//! BingeBox terminal client.
//!
//! `http` implements the [`onboard_flow::Gateway`] contract over the
//! backend's JSON API; the binary in `main.rs` drives the four onboarding
//! stages from a terminal.

pub mod http;
