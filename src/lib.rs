//! Evaluation Engine for attendance-adjusted performance payouts
//!
//! This crate derives monthly work rates from a business calendar and
//! attendance exceptions, turns a grade plus work rate into a payout, and
//! gates every change to attendance records behind a two-stage (team, then
//! HR) approval workflow. Committed changes reprice the stored evaluations
//! of every month they touch.

#![warn(missing_docs)]

pub mod api;
pub mod approval;
pub mod calculation;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod models;
pub mod store;
