pub mod jwt;
pub mod password;
pub mod policy;

pub use password::{hash_password, verify_password};
pub use policy::{authorize, require_admin, Action};
