pub mod category;
pub mod config;
pub mod data;
pub mod rakuten;
pub mod selector;
pub mod state;
