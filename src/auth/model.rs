use serde::{Deserialize, Serialize};

/// JWT claims carried by an access token. `sub` is the user id; the web
/// boundary resolves it into an explicit identity before any core call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub exp: usize,
    pub iat: usize,
    pub token_type: String,
}
