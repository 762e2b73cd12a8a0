use crate::api::ApiClient;
use crate::cli::ConfigAction;
use crate::config::Config;
use crate::logger::Logger;
use crate::modal::FormFields;
use crate::models::User;
use crate::page::PageShell;
use anyhow::Result;
use comfy_table::Table;
use indicatif::{ProgressBar, ProgressStyle};
use inquire::{Password, Select, Text};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    LogIn,
    SignUp,
    Logout,
    Quit,
}

impl fmt::Display for MenuChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MenuChoice::LogIn => "Log In",
            MenuChoice::SignUp => "Sign Up",
            MenuChoice::Logout => "Logout",
            MenuChoice::Quit => "Quit",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModalAction {
    Submit,
    ForgotPassword,
    Switch,
    Close,
}

/// Which modal is asking. Decides the labels on the action menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialog {
    LogIn,
    SignUp,
}

struct ActionLabel(Dialog, ModalAction);

impl fmt::Display for ActionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ActionLabel(_, ModalAction::Submit) => "Continue",
            ActionLabel(_, ModalAction::ForgotPassword) => "Forgot password?",
            ActionLabel(Dialog::LogIn, ModalAction::Switch) => "Don't have an account? Sign up",
            ActionLabel(Dialog::SignUp, ModalAction::Switch) => "Already have an account? Log in",
            ActionLabel(_, ModalAction::Close) => "Close",
        })
    }
}

/// Spinner standing in for the loading placeholders.
fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

async fn mount(shell: &mut PageShell, api: &ApiClient) {
    let pb = spinner("Loading...");
    shell.mount(api).await;
    pb.finish_and_clear();
}

/// Prompts for every field of a modal, prefilling what's already there.
/// Passwords are asked for fresh each time.
fn prompt_fields<M: FormFields>(modal: &mut M) -> Result<()> {
    for field in modal.fields() {
        let label = format!("{}:", field.label);
        let value = if field.secret {
            Password::new(&label)
                .with_display_mode(inquire::PasswordDisplayMode::Masked)
                .without_confirmation()
                .with_validator(inquire::required!())
                .prompt()?
        } else {
            let current = modal.value(field.name).to_string();
            Text::new(&label)
                .with_initial_value(&current)
                .with_validator(inquire::required!())
                .prompt()?
                .trim()
                .to_string()
        };
        modal.set_field(field.name, value);
    }
    Ok(())
}

/// Drives whichever modal is open until both are closed.
async fn run_modals(shell: &mut PageShell, api: &ApiClient) -> Result<()> {
    loop {
        let dialog = if shell.log_in.is_open() {
            Dialog::LogIn
        } else if shell.sign_up.is_open() {
            Dialog::SignUp
        } else {
            return Ok(());
        };

        if let Some(view) = shell.log_in.render().or_else(|| shell.sign_up.render()) {
            Logger::panel(view);
        }

        let mut actions = vec![ModalAction::Submit];
        if dialog == Dialog::LogIn {
            actions.push(ModalAction::ForgotPassword);
        }
        actions.extend([ModalAction::Switch, ModalAction::Close]);
        let labels: Vec<ActionLabel> = actions.iter().map(|a| ActionLabel(dialog, *a)).collect();

        let ActionLabel(_, action) = Select::new("", labels).prompt()?;
        match (dialog, action) {
            (Dialog::LogIn, ModalAction::Submit) => {
                prompt_fields(&mut shell.log_in)?;
                let pb = spinner("Logging in...");
                let ok = shell.submit_log_in(api).await;
                pb.finish_and_clear();
                report(shell.user(), ok);
            }
            (Dialog::SignUp, ModalAction::Submit) => {
                prompt_fields(&mut shell.sign_up)?;
                let pb = spinner("Signing up...");
                let ok = shell.submit_sign_up(api).await;
                pb.finish_and_clear();
                report(shell.user(), ok);
            }
            (_, ModalAction::ForgotPassword) => shell.log_in.forgot_password(),
            (Dialog::LogIn, ModalAction::Switch) => shell.switch_to_sign_up(),
            (Dialog::SignUp, ModalAction::Switch) => shell.switch_to_log_in(),
            (_, ModalAction::Close) => shell.close_modals(),
        }
    }
}

/// Failures aren't printed here, the modal carries its error line into the
/// next render.
fn report(user: Option<&User>, ok: bool) {
    if let Some(line) = success_line(user, ok) {
        Logger::success(line);
    }
}

fn success_line(user: Option<&User>, ok: bool) -> Option<String> {
    match (ok, user) {
        (true, Some(user)) => Some(format!(
            "Logged in as {}!",
            Logger::highlight(&user.username)
        )),
        _ => None,
    }
}

/// The landing page: nav, hero, then a menu until the user quits.
pub async fn home(api: &ApiClient) -> Result<()> {
    Logger::banner();
    let mut shell = PageShell::new();
    mount(&mut shell, api).await;

    Logger::header(shell.render_nav());
    Logger::panel(shell.render_hero());

    loop {
        let choices = if shell.user().is_some() {
            vec![MenuChoice::Logout, MenuChoice::Quit]
        } else {
            vec![MenuChoice::LogIn, MenuChoice::SignUp, MenuChoice::Quit]
        };

        match Select::new("What next?", choices).prompt()? {
            MenuChoice::LogIn => {
                shell.open_log_in();
                run_modals(&mut shell, api).await?;
            }
            MenuChoice::SignUp => {
                shell.open_sign_up();
                run_modals(&mut shell, api).await?;
            }
            MenuChoice::Logout => {
                logout_shell(&mut shell, api).await;
            }
            MenuChoice::Quit => return Ok(()),
        }

        Logger::header(shell.render_nav());
    }
}

pub async fn login(api: &ApiClient) -> Result<()> {
    let mut shell = PageShell::new();
    mount(&mut shell, api).await;
    if let Some(user) = shell.user() {
        Logger::info(format!(
            "Already logged in as {}.",
            Logger::highlight(&user.username)
        ));
        return Ok(());
    }

    shell.open_log_in();
    run_modals(&mut shell, api).await
}

pub async fn signup(api: &ApiClient) -> Result<()> {
    let mut shell = PageShell::new();
    mount(&mut shell, api).await;
    if let Some(user) = shell.user() {
        Logger::info(format!(
            "Already logged in as {}. Log out first to create another account.",
            Logger::highlight(&user.username)
        ));
        return Ok(());
    }

    shell.open_sign_up();
    run_modals(&mut shell, api).await
}

pub async fn logout(api: &ApiClient) -> Result<()> {
    let mut shell = PageShell::new();
    mount(&mut shell, api).await;
    logout_shell(&mut shell, api).await;
    Ok(())
}

/// Returns whether the server agreed. A failed logout only warns, the
/// shell keeps showing whoever was logged in.
async fn logout_shell(shell: &mut PageShell, api: &ApiClient) -> bool {
    let pb = spinner("Logging out...");
    let result = shell.logout(api).await;
    pb.finish_and_clear();

    match result {
        Ok(()) => {
            Logger::success("Logged out successfully.");
            true
        }
        Err(err) => {
            Logger::warn(format!("Logout failed: {err}"));
            false
        }
    }
}

pub async fn whoami(api: &ApiClient) -> Result<()> {
    let mut shell = PageShell::new();
    mount(&mut shell, api).await;
    Logger::header(shell.render_nav());

    match shell.user() {
        Some(user) => println!("\n{}", profile_table(user)),
        None => Logger::info(format!(
            "Not logged in. Run {} to sign in.",
            Logger::highlight("speak-football login")
        )),
    }
    Ok(())
}

fn profile_table(user: &User) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["ID".to_string(), user.id.to_string()]);
    table.add_row(vec!["Username".to_string(), user.username.clone()]);
    table.add_row(vec!["Email".to_string(), user.email.clone()]);

    let optional = [
        ("First name", &user.first_name),
        ("Last name", &user.last_name),
        ("Profile picture", &user.profile_picture),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            table.add_row(vec![label.to_string(), value.clone()]);
        }
    }
    table
}

pub fn config(action: &ConfigAction, override_url: Option<&str>) -> Result<()> {
    let mut config = Config::load()?;
    match action {
        ConfigAction::Show => {
            Logger::info(format!(
                "Backend: {}",
                Logger::highlight(config.effective_api_url(override_url))
            ));
            Logger::info(Logger::dim(format!("Config file: {}", Config::path()?.display())));
        }
        ConfigAction::SetUrl { url } => {
            config.set_api_url(url)?;
            config.save()?;
            Logger::success(format!("Backend set to {}", Logger::highlight(url)));
        }
    }
    Ok(())
}
