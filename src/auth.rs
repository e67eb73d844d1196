//! Session authentication against the legacy site's login form.

use tracing::{debug, info};

use crate::config::Config;
use crate::login_page;
use crate::network::{Transport, TransportError};

/// Login credentials for the legacy committee site.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Read credentials from the environment (PMG_COMMITTEE_USER /
    /// PMG_COMMITTEE_PASS).
    pub fn from_env() -> Result<Self, AuthError> {
        let email = std::env::var(Config::USER_ENV_VAR)
            .map_err(|_| AuthError::MissingCredentials(Config::USER_ENV_VAR))?;
        let password = std::env::var(Config::PASS_ENV_VAR)
            .map_err(|_| AuthError::MissingCredentials(Config::PASS_ENV_VAR))?;
        Ok(Self { email, password })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Credential environment variable {0} is not set")]
    MissingCredentials(&'static str),

    #[error("Login page at {0} has no {form} form", form = Config::LOGIN_FORM_NAME)]
    NoLoginForm(String),

    #[error("Login to the legacy site failed: credentials rejected")]
    LoginRejected,

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Establishes (and re-establishes) an authenticated session.
///
/// Authentication is a side effect on the transport's cookie state: after a
/// successful `authenticate` call, every subsequent request through the same
/// transport carries the session.
#[derive(Debug, Clone)]
pub struct Authenticator {
    login_url: String,
    credentials: Credentials,
}

impl Authenticator {
    pub fn new(login_url: String, credentials: Credentials) -> Self {
        Self {
            login_url,
            credentials,
        }
    }

    /// Fetch the login page, replay its form fields with our credentials
    /// substituted in, and POST. Rejected credentials are fatal and never
    /// retried here.
    pub async fn authenticate<T: Transport + ?Sized>(&self, transport: &T) -> Result<(), AuthError> {
        debug!(url = %self.login_url, "Fetching login page");
        let login_page_response = transport.get(&self.login_url).await?;

        let mut fields =
            login_page::extract_form_fields(&login_page_response.body, Config::LOGIN_FORM_NAME)
                .ok_or_else(|| AuthError::NoLoginForm(self.login_url.clone()))?;

        for (name, value) in fields.iter_mut() {
            if name == "email" {
                *value = self.credentials.email.clone();
            } else if name == "password" {
                *value = self.credentials.password.clone();
            }
        }

        let response = transport.post_form(&self.login_url, &fields).await?;
        if login_page::indicates_login_failure(&response.body) {
            return Err(AuthError::LoginRejected);
        }

        info!("Authenticated against {}", self.login_url);
        Ok(())
    }
}
