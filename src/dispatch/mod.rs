pub mod sender;
pub mod upload;
