pub mod app;
pub mod filter_bar;
pub mod monitor_screen;
pub mod records_screen;
pub mod table_input;
pub mod table_renderer;
