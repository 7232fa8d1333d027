//! Authentication utilities

mod session;
mod token;

pub use session::{Claims, Session};
pub use token::TokenStore;
