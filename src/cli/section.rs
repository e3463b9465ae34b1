use inquire::{Confirm, Text};
use serde_json::json;

use super::credentials::load_credentials;
use super::http_client::ApiClient;
use crate::types::Section;

pub fn run_section_create(name: Option<String>, non_interactive: bool) -> anyhow::Result<()> {
    let creds = load_credentials()?;
    let client = ApiClient::new(&creds)?;

    let name = if let Some(n) = name {
        n
    } else if non_interactive {
        anyhow::bail!("--name is required in non-interactive mode");
    } else {
        Text::new("Section name:").prompt()?
    };

    let section: Section = client.post("/sections", &json!({"name": name}))?;

    println!("Created section '{}' ({})", section.name, section.id);
    Ok(())
}

pub fn run_section_list(json_output: bool) -> anyhow::Result<()> {
    let creds = load_credentials()?;
    let client = ApiClient::new(&creds)?;

    let sections: Vec<Section> = client.get("/sections")?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&sections)?);
        return Ok(());
    }

    if sections.is_empty() {
        println!("No sections found.");
        return Ok(());
    }

    println!("{:<36}  {:<20}", "ID", "NAME");
    for s in &sections {
        println!("{:<36}  {:<20}", s.id, s.name);
    }

    Ok(())
}

pub fn run_section_rename(id: String, name: String) -> anyhow::Result<()> {
    let creds = load_credentials()?;
    let client = ApiClient::new(&creds)?;

    let section: Section = client.patch(&format!("/sections/{id}"), &json!({"name": name}))?;

    println!("Renamed section {} to '{}'", section.id, section.name);
    Ok(())
}

pub fn run_section_delete(id: String, yes: bool) -> anyhow::Result<()> {
    let creds = load_credentials()?;
    let client = ApiClient::new(&creds)?;

    if !yes {
        let confirmed = Confirm::new(&format!("Delete section {id}?"))
            .with_default(false)
            .prompt()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    client.delete(&format!("/sections/{id}"))?;

    println!("Deleted section {id}");
    Ok(())
}
