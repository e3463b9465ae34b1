use inquire::{Password, Text};
use serde_json::json;

use super::credentials::{Credentials, delete_credentials, load_credentials, save_credentials};
use super::http_client::{ApiClient, LoginData};

fn normalize_server_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');

    // Strip trailing API paths to avoid duplication when constructing request URLs
    let url = url
        .trim_end_matches("/api/v1")
        .trim_end_matches("/api")
        .trim_end_matches('/');

    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }

    // Default to http:// for localhost/127.0.0.1, https:// for others
    if url.starts_with("localhost") || url.starts_with("127.0.0.1") {
        format!("http://{}", url)
    } else {
        format!("https://{}", url)
    }
}

pub fn run_auth_login(
    server: Option<String>,
    username: Option<String>,
    password: Option<String>,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let server = if let Some(s) = server {
        if s.trim().is_empty() {
            anyhow::bail!("Server URL cannot be empty");
        }
        s
    } else if non_interactive {
        anyhow::bail!("--server is required in non-interactive mode");
    } else {
        Text::new("Server URL:")
            .with_validator(|input: &str| {
                if input.trim().is_empty() {
                    Ok(inquire::validator::Validation::Invalid(
                        "Server URL is required".into(),
                    ))
                } else {
                    Ok(inquire::validator::Validation::Valid)
                }
            })
            .prompt()?
    };

    let server_url = normalize_server_url(&server);

    let username = if let Some(u) = username {
        u
    } else if non_interactive {
        anyhow::bail!("--username is required in non-interactive mode");
    } else {
        Text::new("Username:").prompt()?
    };

    let password = if let Some(p) = password {
        p
    } else if non_interactive {
        anyhow::bail!("--password is required in non-interactive mode");
    } else {
        Password::new("Password:")
            .without_confirmation()
            .prompt()?
    };

    let client = ApiClient::unauthenticated(&server_url)?;
    let login: LoginData = client.post(
        "/auth/login",
        &json!({"username": username, "password": password}),
    )?;

    save_credentials(&Credentials {
        server_url: server_url.clone(),
        token: login.access_token,
    })?;

    println!();
    println!(
        "Logged in to {} as {} ({})",
        server_url, login.user.username, login.user.role.name
    );
    println!();

    Ok(())
}

pub fn run_auth_logout() -> anyhow::Result<()> {
    // Revoke the session server-side; a dead server still lets the local
    // credentials be cleared.
    if let Ok(creds) = load_credentials() {
        let client = ApiClient::new(&creds)?;
        if let Err(e) = client.post::<serde_json::Value, _>("/auth/logout", &json!({})) {
            eprintln!("Warning: could not revoke the session on the server: {e}");
        }
    }

    if delete_credentials()? {
        println!();
        println!("Logged out successfully.");
        println!();
    } else {
        println!();
        println!("No credentials found.");
        println!();
    }
    Ok(())
}
