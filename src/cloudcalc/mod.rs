// src/cloudcalc/mod.rs

pub mod calculator;
pub mod client_wrapper;
pub mod clients;
pub mod config;
pub mod evaluator;
pub mod event;
pub mod history;
pub mod resolver;
pub mod session;

// Export the driver directly so it can be reached as cloudcalc::Calculator
// instead of cloudcalc::calculator::Calculator
pub use calculator::Calculator;
pub use session::Session;
