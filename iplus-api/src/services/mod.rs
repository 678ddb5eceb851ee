pub mod auth;
pub mod tokens;
pub mod authz;
pub mod uploads;
