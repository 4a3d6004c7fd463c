pub mod account_service;
pub mod position_sizer;
pub mod protective_levels;
pub mod quote_service;
pub mod trade_closer;
pub mod trade_orchestrator;

#[cfg(test)]
pub mod mock_broker;
