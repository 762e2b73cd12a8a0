mod common;

use speak_football::ApiClient;
use speak_football::modal::{FormFields, PASSWORD_MISMATCH};
use speak_football::page::PageShell;
use speak_football::session::SessionStore;

fn fill_log_in(shell: &mut PageShell, username: &str, password: &str) {
    shell.log_in.set_field("username", username);
    shell.log_in.set_field("password", password);
}

fn fill_sign_up(shell: &mut PageShell, username: &str, password: &str, password2: &str) {
    shell.sign_up.set_field("username", username);
    shell.sign_up.set_field("email", format!("{username}@x.com"));
    shell.sign_up.set_field("password", password);
    shell.sign_up.set_field("password2", password2);
}

#[tokio::test]
async fn log_in_sets_user_and_closes_modal() {
    let server = common::spawn().await;
    let api = ApiClient::new(&server.origin).unwrap();
    let mut shell = PageShell::new();
    shell.mount(&api).await;
    assert!(shell.user().is_none());

    shell.open_log_in();
    fill_log_in(&mut shell, "alice", "secret");
    assert!(shell.submit_log_in(&api).await);

    assert_eq!(shell.user().map(|u| u.username.as_str()), Some("alice"));
    assert!(!shell.has_open_modal());
    assert_eq!(shell.render_nav(), "Speak Football  |  alice  [Logout]");
}

#[tokio::test]
async fn bad_password_keeps_modal_open_with_message() {
    let server = common::spawn().await;
    let api = ApiClient::new(&server.origin).unwrap();
    let mut shell = PageShell::new();
    shell.mount(&api).await;

    shell.open_log_in();
    fill_log_in(&mut shell, "alice", "wrong");
    assert!(!shell.submit_log_in(&api).await);

    assert!(shell.user().is_none());
    assert!(shell.log_in.is_open());
    assert!(!shell.log_in.is_loading());
    assert_eq!(shell.log_in.error(), Some("Invalid credentials"));

    let view = shell.render();
    assert!(view.contains("! Invalid credentials"));
    assert!(view.contains("[ Continue ]"));
}

#[tokio::test]
async fn retry_clears_previous_error() {
    let server = common::spawn().await;
    let api = ApiClient::new(&server.origin).unwrap();
    let mut shell = PageShell::new();

    shell.open_log_in();
    fill_log_in(&mut shell, "alice", "wrong");
    assert!(!shell.submit_log_in(&api).await);

    shell.log_in.set_field("password", "secret");
    assert!(shell.submit_log_in(&api).await);
    assert!(shell.log_in.error().is_none());
}

#[tokio::test]
async fn mismatched_passwords_never_reach_the_server() {
    let server = common::spawn().await;
    let api = ApiClient::new(&server.origin).unwrap();
    let mut shell = PageShell::new();

    shell.open_sign_up();
    fill_sign_up(&mut shell, "bob", "one", "two");
    assert!(!shell.submit_sign_up(&api).await);

    assert_eq!(shell.sign_up.error(), Some(PASSWORD_MISMATCH));
    assert!(shell.sign_up.is_open());
    assert!(server.backend.calls().is_empty());
}

#[tokio::test]
async fn sign_up_logs_the_new_account_in() {
    let server = common::spawn().await;
    let api = ApiClient::new(&server.origin).unwrap();
    let mut shell = PageShell::new();

    shell.open_sign_up();
    fill_sign_up(&mut shell, "bob", "pw", "pw");
    assert!(shell.submit_sign_up(&api).await);

    let user = shell.user().unwrap();
    assert_eq!(user.username, "bob");
    assert_eq!(user.email, "bob@x.com");
    assert!(!shell.has_open_modal());
    assert_eq!(server.backend.count("POST", "/api/users/register/"), 1);
}

#[tokio::test]
async fn taken_username_shows_server_error() {
    let server = common::spawn().await;
    let api = ApiClient::new(&server.origin).unwrap();
    let mut shell = PageShell::new();

    shell.open_sign_up();
    fill_sign_up(&mut shell, "taken", "pw", "pw");
    assert!(!shell.submit_sign_up(&api).await);

    assert!(shell.user().is_none());
    assert_eq!(shell.sign_up.error(), Some("Username already taken"));
}

#[tokio::test]
async fn session_survives_into_the_next_mount() {
    let server = common::spawn().await;
    let api = ApiClient::new(&server.origin).unwrap();

    let mut first = PageShell::new();
    first.open_log_in();
    fill_log_in(&mut first, "alice", "secret");
    assert!(first.submit_log_in(&api).await);

    // A fresh page on the same client sees the session through the cookie.
    let mut second = PageShell::new();
    second.mount(&api).await;
    assert_eq!(second.user().map(|u| u.username.as_str()), Some("alice"));
}

#[tokio::test]
async fn logout_outcome_decides_what_the_nav_shows() {
    let server = common::spawn().await;
    let api = ApiClient::new(&server.origin).unwrap();
    let mut shell = PageShell::new();
    shell.open_log_in();
    fill_log_in(&mut shell, "alice", "secret");
    assert!(shell.submit_log_in(&api).await);
    shell.mount(&api).await;

    server.backend.fail_logout();
    let err = shell.logout(&api).await.unwrap_err();
    assert_eq!(err.to_string(), "Logout failed");
    assert_eq!(shell.render_nav(), "Speak Football  |  alice  [Logout]");

    let healthy = common::spawn().await;
    let api = ApiClient::new(&healthy.origin).unwrap();
    let mut shell = PageShell::new();
    shell.open_log_in();
    fill_log_in(&mut shell, "alice", "secret");
    assert!(shell.submit_log_in(&api).await);
    shell.mount(&api).await;

    shell.logout(&api).await.unwrap();
    assert!(shell.user().is_none());
    assert_eq!(shell.render_nav(), "Speak Football  |  [Log In]");
}

#[tokio::test]
async fn expired_session_is_forgotten_on_next_run() {
    let server = common::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.toml");
    // No keyring: the session cookie doesn't survive, like a server-side expiry.
    let store = SessionStore::at(&path, false);

    let api = ApiClient::new(&server.origin).unwrap();
    let mut shell = PageShell::new();
    shell.open_log_in();
    fill_log_in(&mut shell, "alice", "secret");
    assert!(shell.submit_log_in(&api).await);
    store.persist(&api).unwrap();
    assert!(path.exists());

    let next_run = ApiClient::new(&server.origin).unwrap();
    store.restore(&next_run).unwrap();
    assert!(next_run.cached_user().is_some());

    let mut shell = PageShell::new();
    shell.mount(&next_run).await;
    assert!(shell.user().is_none());
    assert!(next_run.cached_user().is_none());

    store.persist(&next_run).unwrap();
    assert!(!path.exists());
}
