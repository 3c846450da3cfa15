//! Export sessions: configuration, the per-export state machine, and the controller that
//! allows one export at a time.

/// Target ratios and export settings.
pub mod config;
/// Single-slot export controller.
pub mod controller;
/// Export state machine.
pub mod export;
