use crate::api::ApiClient;
use crate::models::{Credentials, SignupData, User};
use std::collections::HashMap;

pub const PASSWORD_MISMATCH: &str = "Passwords do not match";
const LOGIN_FALLBACK: &str = "Failed to login";
const SIGNUP_FALLBACK: &str = "Failed to sign up";

/// One input on a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub label: &'static str,
    pub secret: bool,
}

pub const LOG_IN_FIELDS: &[Field] = &[
    Field { name: "username", label: "Username", secret: false },
    Field { name: "password", label: "Password", secret: true },
];

pub const SIGN_UP_FIELDS: &[Field] = &[
    Field { name: "username", label: "Username", secret: false },
    Field { name: "email", label: "Email", secret: false },
    Field { name: "password", label: "Password", secret: true },
    Field { name: "password2", label: "Confirm Password", secret: true },
];

/// Form plumbing both modals share: values, error line, loading flag, open flag.
#[derive(Debug)]
struct AuthForm {
    fields: &'static [Field],
    values: HashMap<&'static str, String>,
    error: Option<String>,
    loading: bool,
    open: bool,
}

impl AuthForm {
    fn new(fields: &'static [Field]) -> Self {
        Self {
            fields,
            values: fields.iter().map(|f| (f.name, String::new())).collect(),
            error: None,
            loading: false,
            open: false,
        }
    }

    /// Replaces one field's value. Unknown names are ignored (returns false).
    fn set(&mut self, name: &str, value: String) -> bool {
        match self.fields.iter().find(|f| f.name == name) {
            Some(field) => {
                self.values.insert(field.name, value);
                true
            }
            None => false,
        }
    }

    fn value(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or_default()
    }

    /// Presence check, same as the `required` attribute on every input.
    fn require_all(&self) -> Result<(), String> {
        match self.fields.iter().find(|f| self.value(f.name).is_empty()) {
            Some(field) => Err(format!("{} is required", field.label)),
            None => Ok(()),
        }
    }

    fn begin_submit(&mut self) {
        self.error = None;
        self.loading = true;
    }

    /// Runs on every exit path of a submit, success or not.
    fn finish_submit(&mut self, outcome: Result<(), String>) {
        self.loading = false;
        if let Err(message) = outcome {
            self.error = Some(message);
        }
    }

    fn close(&mut self) {
        self.open = false;
        self.error = None;
        self.loading = false;
        for value in self.values.values_mut() {
            value.clear();
        }
    }

    fn render_fields(&self, out: &mut Vec<String>) {
        if let Some(error) = &self.error {
            out.push(format!("! {error}"));
        }
        for field in self.fields {
            let value = self.value(field.name);
            let shown = if field.secret {
                "•".repeat(value.chars().count())
            } else {
                value.to_string()
            };
            out.push(format!("{}: {}", field.label, shown));
        }
    }
}

/// Read/write access to a modal's fields, used by whatever drives the input.
pub trait FormFields {
    fn fields(&self) -> &'static [Field];

    fn value(&self, name: &str) -> &str;

    /// Replaces one field's value, the way a keystroke does.
    /// Returns false for names the form doesn't have.
    fn set_field(&mut self, name: &str, value: impl Into<String>) -> bool;
}

fn message_or(err: crate::error::ApiError, fallback: &str) -> String {
    let message = err.message();
    if message.is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

/// The log-in dialog.
pub struct LogInModal {
    form: AuthForm,
    on_forgot_password: Box<dyn Fn() + Send + Sync>,
}

impl Default for LogInModal {
    fn default() -> Self {
        Self::new()
    }
}

impl FormFields for LogInModal {
    fn fields(&self) -> &'static [Field] {
        self.form.fields
    }

    fn value(&self, name: &str) -> &str {
        self.form.value(name)
    }

    fn set_field(&mut self, name: &str, value: impl Into<String>) -> bool {
        self.form.set(name, value.into())
    }
}

impl LogInModal {
    pub fn new() -> Self {
        Self {
            form: AuthForm::new(LOG_IN_FIELDS),
            on_forgot_password: Box::new(|| {}),
        }
    }

    /// Sets what "Forgot password?" does. Nothing, by default.
    pub fn with_forgot_password(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_forgot_password = Box::new(callback);
        self
    }

    pub fn is_open(&self) -> bool {
        self.form.open
    }

    pub fn open(&mut self) {
        self.form.open = true;
    }

    pub fn close(&mut self) {
        self.form.close();
    }

    pub fn is_loading(&self) -> bool {
        self.form.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.form.error.as_deref()
    }

    pub fn forgot_password(&self) {
        (self.on_forgot_password)();
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.value("username").to_string(),
            password: self.value("password").to_string(),
        }
    }

    /// Submits the form. On success `on_success` gets the user and the modal
    /// closes; on failure the message sticks around for the next render.
    ///
    /// Returns whether the login went through. A closed modal does nothing.
    pub async fn submit<F: FnOnce(User)>(&mut self, api: &ApiClient, on_success: F) -> bool {
        if !self.form.open {
            return false;
        }

        self.form.begin_submit();
        let result = match self.form.require_all() {
            Ok(()) => api
                .login(&self.credentials())
                .await
                .map_err(|err| message_or(err, LOGIN_FALLBACK)),
            Err(message) => Err(message),
        };

        match result {
            Ok(user) => {
                self.form.finish_submit(Ok(()));
                on_success(user);
                self.close();
                true
            }
            Err(message) => {
                self.form.finish_submit(Err(message));
                false
            }
        }
    }

    /// Text rendition of the dialog, or `None` while closed.
    pub fn render(&self) -> Option<String> {
        if !self.form.open {
            return None;
        }

        let mut out = vec![
            "Welcome to Speak Football".to_string(),
            "Log in to your account".to_string(),
            String::new(),
        ];
        self.form.render_fields(&mut out);
        out.push("Forgot password?".to_string());
        out.push(format!(
            "[ {} ]",
            if self.form.loading { "Logging in..." } else { "Continue" }
        ));
        out.push("Don't have an account? Sign up".to_string());
        Some(out.join("\n"))
    }
}

/// The sign-up dialog. Same shape as [`LogInModal`], two more fields.
pub struct SignUpModal {
    form: AuthForm,
}

impl Default for SignUpModal {
    fn default() -> Self {
        Self::new()
    }
}

impl FormFields for SignUpModal {
    fn fields(&self) -> &'static [Field] {
        self.form.fields
    }

    fn value(&self, name: &str) -> &str {
        self.form.value(name)
    }

    fn set_field(&mut self, name: &str, value: impl Into<String>) -> bool {
        self.form.set(name, value.into())
    }
}

impl SignUpModal {
    pub fn new() -> Self {
        Self {
            form: AuthForm::new(SIGN_UP_FIELDS),
        }
    }

    pub fn is_open(&self) -> bool {
        self.form.open
    }

    pub fn open(&mut self) {
        self.form.open = true;
    }

    pub fn close(&mut self) {
        self.form.close();
    }

    pub fn is_loading(&self) -> bool {
        self.form.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.form.error.as_deref()
    }

    pub fn signup_data(&self) -> SignupData {
        SignupData {
            username: self.value("username").to_string(),
            email: self.value("email").to_string(),
            password: self.value("password").to_string(),
            password2: self.value("password2").to_string(),
        }
    }

    /// Same contract as [`LogInModal::submit`]. Mismatched passwords fail
    /// locally and never reach the network.
    pub async fn submit<F: FnOnce(User)>(&mut self, api: &ApiClient, on_success: F) -> bool {
        if !self.form.open {
            return false;
        }

        self.form.begin_submit();
        let data = self.signup_data();
        let result = match self.form.require_all() {
            Err(message) => Err(message),
            Ok(()) if !data.passwords_match() => Err(PASSWORD_MISMATCH.to_string()),
            Ok(()) => api
                .signup(&data)
                .await
                .map_err(|err| message_or(err, SIGNUP_FALLBACK)),
        };

        match result {
            Ok(user) => {
                self.form.finish_submit(Ok(()));
                on_success(user);
                self.close();
                true
            }
            Err(message) => {
                self.form.finish_submit(Err(message));
                false
            }
        }
    }

    pub fn render(&self) -> Option<String> {
        if !self.form.open {
            return None;
        }

        let mut out = vec![
            "Welcome to Speak Football".to_string(),
            "Sign up to continue".to_string(),
            String::new(),
        ];
        self.form.render_fields(&mut out);
        out.push(
            "By creating an account, I am agreeing to Speak Football's Terms of Service and Privacy Policy."
                .to_string(),
        );
        out.push(format!(
            "[ {} ]",
            if self.form.loading { "Signing up..." } else { "Continue" }
        ));
        out.push("Already have an account? Log in".to_string());
        Some(out.join("\n"))
    }
}
