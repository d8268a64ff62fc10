pub mod http;
pub mod memorization;
pub mod playback;
pub mod quran;
pub mod storage;
pub mod ui;
