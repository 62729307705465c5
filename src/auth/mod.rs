mod role;
pub mod service;
pub mod token;

pub use role::{Role, UnknownRole};
pub use service::{AuthService, ClientInfo, LoginTokens, RefreshedToken, Registration};
pub use token::{Claims, Subject, TokenCodec, TokenError, TokenKind};
