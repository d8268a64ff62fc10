pub mod channel;
pub mod coordinator;
pub mod media_session;
pub mod rodio_backend;
