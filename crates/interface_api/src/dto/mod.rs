//! Request and response bodies

pub mod plans;
pub mod premiums;
pub mod simulations;
