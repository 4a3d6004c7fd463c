pub mod broker_client_factory;
pub mod oanda_client;
