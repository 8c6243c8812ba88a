pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{AuthUser, generate_token, validate_token};
pub use middleware::{MaybeUser, auth_context_middleware};
pub use password::{hash_password, verify_password};
