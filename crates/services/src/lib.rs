pub mod auth;
pub mod dao;
pub mod notify;

pub use auth::AuthService;
pub use dao::*;
