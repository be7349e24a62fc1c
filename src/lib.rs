pub mod aggregate;
pub mod collect;
pub mod combine;
pub mod config;
pub mod fbr_api;
pub mod http_client;
pub mod models;
pub mod pacing;
pub mod table;
pub mod teams;
