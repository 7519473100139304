pub mod token;
pub mod token_file;
pub mod token_manager;
