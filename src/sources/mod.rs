pub mod credential_exchange;
