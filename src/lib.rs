pub mod accounts;
pub mod bidding;
pub mod comments;
pub mod config;
pub mod database;
pub mod error;
pub mod event_store;
pub mod handlers;
pub mod listing;
pub mod message_broker;
pub mod notifications;
pub mod query;
pub mod routes;
pub mod scheduler;
pub mod state;
pub mod watchlist;
