pub mod classify;
pub mod config;
pub mod document;
pub mod validator;
