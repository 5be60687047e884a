use crate::domain::entities::publish_config::{AccessToken, TOKEN_USERNAME};
use git2::{Cred, CredentialType, RemoteCallbacks};
use tracing::debug;

/// HTTPS basic credentials used for both clone and push
#[derive(Debug, Clone)]
pub struct GitCredentials {
    username: String,
    token: Option<AccessToken>,
}

impl GitCredentials {
    /// Token credentials with the fixed `x-access-token` username
    pub fn for_token(token: Option<AccessToken>) -> Self {
        Self {
            username: TOKEN_USERNAME.to_string(),
            token,
        }
    }

    /// No credentials; only works against remotes that do not ask for any
    pub fn anonymous() -> Self {
        Self::for_token(None)
    }

    /// Username sent with the token
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Whether a token was configured
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Callbacks that answer the remote's credential request
    ///
    /// libgit2 asks again when the remote rejects what it was given; the
    /// second request fails instead of looping on the same token.
    pub fn remote_callbacks(&self) -> RemoteCallbacks<'_> {
        let mut callbacks = RemoteCallbacks::new();
        let mut attempts = 0u32;

        callbacks.credentials(move |url, _username_from_url, allowed_types| {
            attempts += 1;
            if attempts > 1 {
                return Err(git2::Error::from_str(&format!(
                    "authentication to {} was rejected",
                    url
                )));
            }

            let token = self.token.as_ref().ok_or_else(|| {
                git2::Error::from_str(&format!(
                    "{} requires authentication but no token was provided",
                    url
                ))
            })?;

            if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
                debug!("Supplying token credentials for {}", url);
                Cred::userpass_plaintext(&self.username, token.expose())
            } else {
                Err(git2::Error::from_str(&format!(
                    "{} does not accept username/password authentication",
                    url
                )))
            }
        });

        callbacks
    }
}
