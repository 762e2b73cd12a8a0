use crate::api::{ApiClient, CSRF_COOKIE, cookie_pairs};
use crate::config::config_dir;
use crate::models::User;
use anyhow::Result;
use keyring::Entry;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const KEYRING_SERVICE: &str = "speak-football";

/// What survives between runs. The session cookie itself is not in here,
/// it goes to the OS keyring.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct SessionFile {
    pub api_url: Option<String>,
    pub csrftoken: Option<String>,
    pub user: Option<User>,
}

/// Persists the cookie jar and mirrored user across process runs.
///
/// In the browser the cookie store just exists. Here it gets loaded into the
/// jar at startup and written back after each command.
pub struct SessionStore {
    path: PathBuf,
    use_keyring: bool,
}

impl SessionStore {
    /// The real store: `session.toml` in the config dir plus the OS keyring.
    pub fn open() -> Result<Self> {
        Ok(Self {
            path: config_dir()?.join("session.toml"),
            use_keyring: true,
        })
    }

    /// A store at an explicit path. Without the keyring, session cookies are
    /// simply not persisted.
    pub fn at(path: impl Into<PathBuf>, use_keyring: bool) -> Self {
        Self {
            path: path.into(),
            use_keyring,
        }
    }

    pub fn load(&self) -> Result<Option<SessionFile>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(Some(toml::from_str(&content)?))
    }

    /// Seeds the client's jar and user mirror. A store written for a
    /// different backend is ignored.
    pub fn restore(&self, api: &ApiClient) -> Result<()> {
        let Some(file) = self.load()? else {
            return Ok(());
        };

        let origin = api.base_url().as_str();
        if file.api_url.as_deref() != Some(origin) {
            debug!("Stored session belongs to {:?}, not {origin}", file.api_url);
            return Ok(());
        }

        if let Some(token) = &file.csrftoken {
            api.restore_cookie(CSRF_COOKIE, token);
        }
        api.remember_user(file.user);

        if let Some(cookies) = self.secret_cookies(origin) {
            for (name, value) in cookie_pairs(&cookies) {
                api.restore_cookie(name, value);
            }
        }

        Ok(())
    }

    /// Writes the jar back. Nothing worth keeping (no user, no session
    /// cookie) means the stored session is removed instead.
    pub fn persist(&self, api: &ApiClient) -> Result<()> {
        let origin = api.base_url().as_str().to_string();
        let header = api.cookie_header().unwrap_or_default();

        let mut csrftoken = None;
        let mut secret = Vec::new();
        for (name, value) in cookie_pairs(&header) {
            if name == CSRF_COOKIE {
                csrftoken = Some(value.to_string());
            } else {
                secret.push(format!("{name}={value}"));
            }
        }

        let user = api.cached_user();
        if user.is_none() && secret.is_empty() {
            return self.clear(&origin);
        }

        let file = SessionFile {
            api_url: Some(origin.clone()),
            csrftoken,
            user,
        };
        fs::write(&self.path, toml::to_string_pretty(&file)?)?;

        if self.use_keyring {
            match Entry::new(KEYRING_SERVICE, &origin) {
                Ok(entry) => {
                    let result = if secret.is_empty() {
                        entry.delete_credential()
                    } else {
                        entry.set_password(&secret.join("; "))
                    };
                    if let Err(err) = result {
                        warn!("Could not update session cookie in keyring: {err}");
                    }
                }
                Err(err) => warn!("Keyring unavailable: {err}"),
            }
        }

        Ok(())
    }

    /// Forgets everything: file and keyring entry.
    pub fn clear(&self, origin: &str) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        if self.use_keyring {
            if let Ok(entry) = Entry::new(KEYRING_SERVICE, origin) {
                let _ = entry.delete_credential();
            }
        }
        Ok(())
    }

    fn secret_cookies(&self, origin: &str) -> Option<String> {
        if !self.use_keyring {
            return None;
        }
        Entry::new(KEYRING_SERVICE, origin)
            .and_then(|entry| entry.get_password())
            .ok()
    }
}
