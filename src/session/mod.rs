//! Companion service session.
//!
//! Owns the cookie jar and the transport, and drives the login state
//! machine: a profile request that lands on a login page triggers at most
//! one interactive login (credentials, then an optional verification code)
//! before the request is replayed.

pub mod cookies;
pub mod transport;

use reqwest::Url;
use secrecy::SecretString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use self::cookies::CookieJar;
use self::transport::{HttpRequest, HttpTransport, Method, Transport};
use crate::config::CompanionConfig;
use crate::profile::Profile;
use crate::prompt::PromptProvider;
use crate::types::EdapiError;

pub const PROFILE_PATH: &str = "profile";
pub const LOGIN_PATH: &str = "user/login";
pub const CONFIRM_PATH: &str = "user/confirm";

/// Redirect hops followed per request.
pub const MAX_REDIRECTS: usize = 10;

/// Body markers of the login and verification forms.
const PASSWORD_MARKER: &str = "type=\"password\"";
const CODE_MARKER: &str = "name=\"code\"";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Requesting,
    LoginRequired,
    AwaitingCredentials,
    AwaitingTwoFactor,
    Authenticated,
    /// Terminal: the service still refused access after a completed login.
    Failed,
}

/// Final response of a request after redirects.
#[derive(Debug)]
struct Page {
    url: Url,
    status: u16,
    body: String,
}

impl Page {
    fn is_login(&self) -> bool {
        self.url.path().ends_with(LOGIN_PATH) || self.body.contains(PASSWORD_MARKER)
    }

    fn is_verification(&self) -> bool {
        self.url.path().ends_with(CONFIRM_PATH) || self.body.contains(CODE_MARKER)
    }

    fn needs_login(&self) -> bool {
        self.is_login() || self.is_verification()
    }
}

fn prompt_error(err: anyhow::Error) -> EdapiError {
    EdapiError::Prompt(format!("{err:#}"))
}

fn cookie_error(err: anyhow::Error) -> EdapiError {
    EdapiError::CookieStore(format!("{err:#}"))
}

pub struct CompanionSession {
    base: Url,
    jar: CookieJar,
    cookie_path: PathBuf,
    transport: Box<dyn Transport>,
    state: SessionState,
}

impl CompanionSession {
    /// Open a session against the configured service with a reqwest transport.
    pub fn new(config: &CompanionConfig, cookie_path: impl Into<PathBuf>) -> Result<Self, EdapiError> {
        let transport = HttpTransport::new(Duration::from_secs(config.timeout_secs))
            .map_err(|e| EdapiError::Transport(format!("{e:#}")))?;
        Self::with_transport(&config.base_url, cookie_path, Box::new(transport))
    }

    /// Open a session with an explicit transport. The cookie jar is loaded,
    /// or created empty and saved straight away.
    pub fn with_transport(
        base_url: &str,
        cookie_path: impl Into<PathBuf>,
        transport: Box<dyn Transport>,
    ) -> Result<Self, EdapiError> {
        let base = Url::parse(base_url)
            .map_err(|e| EdapiError::Transport(format!("invalid base URL '{base_url}': {e}")))?;
        let cookie_path = cookie_path.into();
        let jar = CookieJar::load_or_create(&cookie_path).map_err(cookie_error)?;

        Ok(Self {
            base,
            jar,
            cookie_path,
            transport,
            state: SessionState::Unauthenticated,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn cookie_path(&self) -> &Path {
        &self.cookie_path
    }

    /// Forget every cookie and persist the empty jar, forcing a fresh login.
    pub fn clear_cookies(&mut self) -> Result<(), EdapiError> {
        self.jar.clear();
        self.jar.save(&self.cookie_path).map_err(cookie_error)?;
        info!(path = %self.cookie_path.display(), "Cookies cleared");
        Ok(())
    }

    /// Fetch the commander profile, logging in once if the service asks.
    pub async fn fetch_profile(&mut self, prompt: &dyn PromptProvider) -> Result<Profile, EdapiError> {
        self.state = SessionState::Requesting;
        let mut page = self.request(Method::Get, PROFILE_PATH, None).await?;

        if page.needs_login() {
            self.state = SessionState::LoginRequired;
            self.login(prompt).await?;

            self.state = SessionState::Requesting;
            page = self.request(Method::Get, PROFILE_PATH, None).await?;
            if page.needs_login() {
                self.state = SessionState::Failed;
                return Err(EdapiError::Authentication(
                    "access still denied after login".into(),
                ));
            }
        }

        if !(200..300).contains(&page.status) {
            self.state = SessionState::Failed;
            return Err(EdapiError::Transport(format!(
                "profile request returned HTTP {}",
                page.status
            )));
        }

        self.state = SessionState::Authenticated;
        let profile = Profile::from_json(&page.body)?;
        debug!(bytes = page.body.len(), "Profile received");
        Ok(profile)
    }

    // -- Login -------------------------------------------------------------

    async fn login(&mut self, prompt: &dyn PromptProvider) -> Result<(), EdapiError> {
        // The base page tells whether the cookies are still good.
        let probe = self.request(Method::Get, "", None).await?;
        if !probe.needs_login() {
            debug!("Cookies still valid, replaying request");
            return Ok(());
        }

        self.state = SessionState::AwaitingCredentials;
        prompt.notify("Login required for the companion service.");
        let email = prompt.ask_text("E-mail", None).map_err(prompt_error)?;
        let password = prompt.ask_secret("Password").map_err(prompt_error)?;

        self.state = SessionState::Requesting;
        let form = vec![("email", SecretString::new(email)), ("password", password)];
        let page = self.request(Method::Post, LOGIN_PATH, Some(form)).await?;

        if page.is_login() {
            self.state = SessionState::Failed;
            warn!("Companion service rejected credentials");
            return Err(EdapiError::Authentication("Login failed".into()));
        }

        if page.is_verification() {
            self.state = SessionState::AwaitingTwoFactor;
            prompt.notify("A verification code has been sent to your e-mail address.");
            let code = prompt.ask_text("Verification code", None).map_err(prompt_error)?;

            self.state = SessionState::Requesting;
            let form = vec![("code", SecretString::new(code))];
            let page = self.request(Method::Post, CONFIRM_PATH, Some(form)).await?;
            if page.needs_login() {
                self.state = SessionState::Failed;
                warn!("Companion service rejected verification code");
                return Err(EdapiError::Authentication("Verification failed".into()));
            }
        }

        info!("Logged in to companion service");
        Ok(())
    }

    // -- Requests ----------------------------------------------------------

    /// Send one request, following redirects, then persist the jar whether
    /// or not the request succeeded.
    async fn request(
        &mut self,
        method: Method,
        path: &str,
        form: Option<Vec<(&'static str, SecretString)>>,
    ) -> Result<Page, EdapiError> {
        let result = self.follow(method, path, form).await;
        let saved = self.jar.save(&self.cookie_path);

        match (result, saved) {
            (Ok(page), Ok(())) => Ok(page),
            (Ok(_), Err(e)) => Err(cookie_error(e)),
            (Err(err), saved) => {
                if let Err(e) = saved {
                    warn!(error = %format!("{e:#}"), "Failed to save cookies after request error");
                }
                Err(err)
            }
        }
    }

    async fn follow(
        &mut self,
        mut method: Method,
        path: &str,
        mut form: Option<Vec<(&'static str, SecretString)>>,
    ) -> Result<Page, EdapiError> {
        let mut url = self
            .base
            .join(path)
            .map_err(|e| EdapiError::Transport(format!("invalid path '{path}': {e}")))?;

        for hop in 0..=MAX_REDIRECTS {
            debug!(method = ?method, url = %url, hop, "Companion request");
            let request = HttpRequest {
                method,
                url: url.to_string(),
                cookie_header: self.jar.header_value(),
                form: form.take(),
            };
            let response = self
                .transport
                .send(request)
                .await
                .map_err(|e| EdapiError::Transport(format!("{e:#}")))?;

            for cookie in &response.set_cookies {
                self.jar.absorb(cookie);
            }

            match response.location.as_deref() {
                Some(location) if response.is_redirect() => {
                    url = url.join(location).map_err(|e| {
                        EdapiError::Transport(format!("invalid redirect '{location}': {e}"))
                    })?;
                    method = Method::Get;
                }
                _ => {
                    return Ok(Page {
                        url,
                        status: response.status,
                        body: response.body,
                    })
                }
            }
        }

        Err(EdapiError::Transport(format!(
            "more than {MAX_REDIRECTS} redirects requesting '{path}'"
        )))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
