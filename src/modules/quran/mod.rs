pub mod catalog;
pub mod client;
pub mod prayer_times;
pub mod search_engine;
