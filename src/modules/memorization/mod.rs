pub mod action;
pub mod counter;
pub mod session;
