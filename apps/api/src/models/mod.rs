pub mod feedback;
pub mod interview;
pub mod session;
pub mod transcript;
