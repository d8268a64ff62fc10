mod modals;
pub mod renderer;
