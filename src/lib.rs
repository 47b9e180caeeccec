pub mod api_client;
pub mod config;
pub mod data_exporter;
pub mod filter;
pub mod monitor;
pub mod table;
pub mod table_display;
pub mod ui;
pub mod utils;
