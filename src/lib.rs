pub mod config;
pub mod demo_source;
pub mod error;
pub mod filter;
pub mod http_client;
pub mod league_fetch;
pub mod query_cache;
pub mod route;
pub mod state;
pub mod table;
pub mod views;
pub mod worker;
