mod common;

mod send_and_retry;
mod token_refresh;
