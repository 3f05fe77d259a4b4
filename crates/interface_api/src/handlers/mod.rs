//! Request handlers

pub mod health;
pub mod plans;
pub mod premiums;
pub mod scenarios;
pub mod simulations;
