use std::sync::Arc;

use jsonwebtoken::{DecodingKey, Validation, decode};

use vidora_core::Engine;
use vidora_types::api::Claims;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub engine: Engine,
    pub jwt_secret: String,
}

impl AppStateInner {
    pub fn new(engine: Engine, jwt_secret: impl Into<String>) -> AppState {
        Arc::new(Self {
            engine,
            jwt_secret: jwt_secret.into(),
        })
    }

    /// Verify an access token. Issuing tokens happens outside this service.
    pub fn verify_token(&self, token: &str) -> Option<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .ok()
        .map(|data| data.claims)
    }
}
