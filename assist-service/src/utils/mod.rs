pub mod cookies;
pub mod password;
pub mod validation;

pub use cookies::{clear_cookie, client_cookie, session_cookie};
pub use password::{hash_password, verify_password, Password, PasswordHashString};
pub use validation::ValidatedJson;
