use crate::api::ApiClient;
use crate::error::ApiError;
use crate::modal::{LogInModal, SignUpModal};
use crate::models::User;
use log::{debug, warn};

pub const BRAND: &str = "Speak Football";
pub const HERO_TITLE: &str = "Find the latest football event around you";
pub const HERO_TAGLINE: &str =
    "Explore football related events, screening, activities -- all in one place";

/// The landing page: nav bar, hero, and the two auth modals.
///
/// Owns the "who is logged in" state for everything it renders. Only one
/// modal is ever open; opening one closes the other.
pub struct PageShell {
    user: Option<User>,
    loading: bool,
    pub log_in: LogInModal,
    pub sign_up: SignUpModal,
}

impl Default for PageShell {
    fn default() -> Self {
        Self::new()
    }
}

impl PageShell {
    pub fn new() -> Self {
        Self {
            user: None,
            loading: true,
            log_in: LogInModal::new()
                .with_forgot_password(|| debug!("Forgot password requested, nothing wired up")),
            sign_up: SignUpModal::new(),
        }
    }

    /// The one session check on mount. Absence of a user is just "logged out".
    pub async fn mount(&mut self, api: &ApiClient) {
        self.user = api.current_user().await;
        self.loading = false;
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn open_log_in(&mut self) {
        self.sign_up.close();
        self.log_in.open();
    }

    pub fn open_sign_up(&mut self) {
        self.log_in.close();
        self.sign_up.open();
    }

    pub fn switch_to_sign_up(&mut self) {
        self.open_sign_up();
    }

    pub fn switch_to_log_in(&mut self) {
        self.open_log_in();
    }

    pub fn close_modals(&mut self) {
        self.log_in.close();
        self.sign_up.close();
    }

    pub fn has_open_modal(&self) -> bool {
        self.log_in.is_open() || self.sign_up.is_open()
    }

    /// Submits the log-in modal; a successful login becomes the page's user.
    pub async fn submit_log_in(&mut self, api: &ApiClient) -> bool {
        let user = &mut self.user;
        self.log_in
            .submit(api, |logged_in| *user = Some(logged_in))
            .await
    }

    /// Submits the sign-up modal; a fresh account is logged in straight away.
    pub async fn submit_sign_up(&mut self, api: &ApiClient) -> bool {
        let user = &mut self.user;
        self.sign_up
            .submit(api, |signed_up| *user = Some(signed_up))
            .await
    }

    /// Best effort. On failure the error is logged and handed back, and the
    /// user we were showing stays put.
    pub async fn logout(&mut self, api: &ApiClient) -> Result<(), ApiError> {
        match api.logout().await {
            Ok(()) => {
                self.user = None;
                Ok(())
            }
            Err(err) => {
                warn!("Failed to logout: {err}");
                Err(err)
            }
        }
    }

    pub fn render_nav(&self) -> String {
        let right = if self.loading {
            "Loading...".to_string()
        } else {
            match &self.user {
                Some(user) => format!("{}  [Logout]", user.username),
                None => "[Log In]".to_string(),
            }
        };
        format!("{BRAND}  |  {right}")
    }

    pub fn render_hero(&self) -> String {
        format!("{HERO_TITLE}\n{HERO_TAGLINE}")
    }

    /// Nav, then whichever modal is open, or the hero when none is.
    pub fn render(&self) -> String {
        let body = self
            .log_in
            .render()
            .or_else(|| self.sign_up.render())
            .unwrap_or_else(|| self.render_hero());
        format!("{}\n\n{}", self.render_nav(), body)
    }
}
