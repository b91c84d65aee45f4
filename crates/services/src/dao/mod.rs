pub mod base;
pub mod item;
pub mod user;

pub use base::{DaoError, DaoResult};
pub use item::ItemDao;
pub use user::UserDao;
