mod jwks;
mod validator;

pub mod guards;
pub mod model;
pub mod policy;

use std::sync::Arc;

use crate::features::users::UserService;

pub use jwks::JwksClient;
pub use validator::JwtValidator;

/// State for the authentication middleware
#[derive(Clone)]
pub struct AuthState {
    pub validator: Arc<JwtValidator>,
    pub users: Arc<UserService>,
}
