//! Client-credentials authentication.

mod token;


pub use token::{TOKEN_GRANT_PATH, TokenManager, TokenResponse};
