//! Portfolio payoff profiles and Black-Scholes pricing for stock, European
//! call, European put and zero-coupon bond legs.

pub mod config;
pub mod console;
pub mod errors;
pub mod models;
pub mod portfolio;
pub mod render;
pub mod server;
pub mod state;
