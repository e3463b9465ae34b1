use inquire::{Confirm, Password, Select, Text};
use serde_json::{Map, Value, json};

use super::credentials::load_credentials;
use super::http_client::{ApiClient, UserInfo, find_section_by_name};
use crate::types::Role;

fn find_role_by_name(roles: &[Role], name: &str) -> anyhow::Result<Role> {
    roles
        .iter()
        .find(|r| r.name.eq_ignore_ascii_case(name))
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("No role named '{name}'"))
}

pub fn run_user_create(
    username: Option<String>,
    password: Option<String>,
    role: Option<String>,
    section: Option<String>,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let creds = load_credentials()?;
    let client = ApiClient::new(&creds)?;

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
        Password::new("Password:").prompt()?
    };

    let roles: Vec<Role> = client.get("/roles")?;
    let role = if let Some(name) = role {
        find_role_by_name(&roles, &name)?
    } else if non_interactive {
        anyhow::bail!("--role is required in non-interactive mode");
    } else {
        let names: Vec<&str> = roles.iter().map(|r| r.name.as_str()).collect();
        let chosen = Select::new("Role:", names).prompt()?;
        find_role_by_name(&roles, chosen)?
    };

    let section_id = match section {
        Some(name) => {
            let sections = client.fetch_sections()?;
            Some(find_section_by_name(&sections, &name)?.id)
        }
        None => None,
    };

    let user: UserInfo = client.post(
        "/users",
        &json!({
            "username": username,
            "password": password,
            "role_id": role.id,
            "section_id": section_id,
        }),
    )?;

    println!("Created user '{}' ({})", user.username, user.id);
    Ok(())
}

pub fn run_user_list(json_output: bool) -> anyhow::Result<()> {
    let creds = load_credentials()?;
    let client = ApiClient::new(&creds)?;

    if json_output {
        let raw: Value = client.get("/users")?;
        println!("{}", serde_json::to_string_pretty(&raw)?);
        return Ok(());
    }

    let users: Vec<UserInfo> = client.get("/users")?;

    if users.is_empty() {
        println!("No users found.");
        return Ok(());
    }

    println!(
        "{:<36}  {:<20}  {:<12}  {:<10}",
        "ID", "USERNAME", "ROLE", "SECTION"
    );
    for u in &users {
        let section = u.section.as_ref().map_or("-", |s| s.name.as_str());
        println!(
            "{:<36}  {:<20}  {:<12}  {:<10}",
            u.id, u.username, u.role.name, section
        );
    }

    Ok(())
}

pub fn run_user_update(
    id: String,
    username: Option<String>,
    password: Option<String>,
    role: Option<String>,
    section: Option<String>,
) -> anyhow::Result<()> {
    let creds = load_credentials()?;
    let client = ApiClient::new(&creds)?;

    let mut body = Map::new();

    if let Some(username) = username {
        body.insert("username".to_string(), json!(username));
    }

    if let Some(password) = password {
        body.insert("password".to_string(), json!(password));
    }

    if let Some(name) = role {
        let roles: Vec<Role> = client.get("/roles")?;
        let role = find_role_by_name(&roles, &name)?;
        body.insert("role_id".to_string(), json!(role.id));
    }

    if let Some(name) = section {
        if name.eq_ignore_ascii_case("none") {
            body.insert("section_id".to_string(), Value::Null);
        } else {
            let sections = client.fetch_sections()?;
            let section = find_section_by_name(&sections, &name)?;
            body.insert("section_id".to_string(), json!(section.id));
        }
    }

    if body.is_empty() {
        anyhow::bail!("Nothing to update. Pass --username, --password, --role, or --section.");
    }

    let user: UserInfo = client.patch(&format!("/users/{id}"), &Value::Object(body))?;

    println!("Updated user '{}' ({})", user.username, user.id);
    Ok(())
}

pub fn run_user_delete(id: String, yes: bool) -> anyhow::Result<()> {
    let creds = load_credentials()?;
    let client = ApiClient::new(&creds)?;

    if !yes {
        let confirmed = Confirm::new(&format!("Delete user {id}?"))
            .with_default(false)
            .prompt()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    client.delete(&format!("/users/{id}"))?;

    println!("Deleted user {id}");
    Ok(())
}
