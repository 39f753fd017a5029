//! HTTP Route Handlers

pub mod classify;
pub mod history;
