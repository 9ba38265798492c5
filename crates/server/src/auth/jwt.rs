use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::game::PlayerId;

/// Issued by the accounts side of the app; this server only verifies them.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: PlayerId,
    pub exp: i64,
}

/// The player a token was issued to. Only HS256 tokens carrying an
/// unexpired `exp` claim are accepted.
pub fn verify(token: &str, secret: &str) -> Option<PlayerId> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["exp"]);

    match decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation) {
        Ok(data) => Some(data.claims.user_id),
        Err(e) => {
            tracing::debug!("Token refused: {e}");
            None
        }
    }
}
