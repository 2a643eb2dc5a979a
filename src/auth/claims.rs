use serde::{Deserialize, Serialize};

use crate::auth::repo_types::Role;

/// JWT payload issued on sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,      // user identifier
    pub roles: Vec<Role>, // roles at issue time
    pub iat: usize,       // issued at (unix timestamp)
    pub exp: usize,       // expires at (unix timestamp)
    pub iss: String,      // issuer
    pub aud: String,      // audience
}
