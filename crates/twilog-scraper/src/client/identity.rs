use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ScraperError;
use crate::types::Identity;

use super::{Credentials, FeedClient, USER_LOOKUP_OPERATION};

#[derive(Deserialize)]
struct UserLookup {
    rest_id: String,
    legacy: UserLookupLegacy,
}

#[derive(Deserialize)]
struct UserLookupLegacy {
    name: String,
    screen_name: String,
}

impl FeedClient {
    /// Resolves a screen name to its account id and display name.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::UserNotFound`] if the response carries no
    /// usable user object, plus any transport error from the request.
    pub async fn lookup_user(
        &self,
        credentials: &Credentials,
        screen_name: &str,
    ) -> Result<Identity, ScraperError> {
        let variables = json!({
            "screen_name": screen_name,
            "withSafetyModeUserFields": true,
        });
        let body = self
            .get_json(credentials, USER_LOOKUP_OPERATION, &variables)
            .await?;
        parse_identity(&body, screen_name)
    }
}

fn parse_identity(body: &Value, screen_name: &str) -> Result<Identity, ScraperError> {
    let not_found = || ScraperError::UserNotFound {
        screen_name: screen_name.to_owned(),
    };
    let result = body.pointer("/data/user/result").ok_or_else(not_found)?;
    if result.get("__typename").and_then(Value::as_str) == Some("UserUnavailable") {
        return Err(not_found());
    }
    let user = UserLookup::deserialize(result).map_err(|_| not_found())?;
    if user.rest_id.is_empty() {
        return Err(not_found());
    }
    Ok(Identity {
        user_id: user.rest_id,
        name: user.legacy.name,
        screen_name: user.legacy.screen_name,
    })
}

/// Memoized screen name to [`Identity`] lookups.
///
/// Owned by the caller and passed in explicitly; keys are compared
/// case-insensitively.
#[derive(Debug, Default)]
pub struct IdentityCache {
    entries: HashMap<String, Identity>,
}

impl IdentityCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn key(screen_name: &str) -> String {
        screen_name.to_ascii_lowercase()
    }

    #[must_use]
    pub fn get(&self, screen_name: &str) -> Option<&Identity> {
        self.entries.get(&Self::key(screen_name))
    }

    /// Seeds the cache, e.g. from a cached identity file.
    pub fn insert(&mut self, identity: Identity) {
        self.entries.insert(Self::key(&identity.screen_name), identity);
    }

    /// Returns the cached identity or looks it up once through `client`.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`FeedClient::lookup_user`]; failures are
    /// not cached.
    pub async fn resolve(
        &mut self,
        client: &FeedClient,
        credentials: &Credentials,
        screen_name: &str,
    ) -> Result<Identity, ScraperError> {
        if let Some(identity) = self.get(screen_name) {
            return Ok(identity.clone());
        }
        let identity = client.lookup_user(credentials, screen_name).await?;
        tracing::debug!(screen_name, user_id = %identity.user_id, "resolved identity");
        self.entries
            .insert(Self::key(screen_name), identity.clone());
        Ok(identity)
    }
}
