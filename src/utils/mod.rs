pub mod transport;

pub use transport::{extract_user_agent, is_secure_request};
