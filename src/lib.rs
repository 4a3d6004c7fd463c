//! fxtrade
//!
//! Turns a buy/sell signal into a single protected EUR_USD position on a
//! REST broker: close what is open, size from account risk, submit a market
//! order, then attach stop-loss and take-profit.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
