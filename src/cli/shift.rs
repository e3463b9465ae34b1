use inquire::{Confirm, Text};
use serde_json::{Map, Value, json};

use super::credentials::load_credentials;
use super::http_client::ApiClient;
use crate::types::Shift;

pub fn run_shift_create(
    name: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let creds = load_credentials()?;
    let client = ApiClient::new(&creds)?;

    let name = if let Some(n) = name {
        n
    } else if non_interactive {
        anyhow::bail!("--name is required in non-interactive mode");
    } else {
        Text::new("Shift name:").prompt()?
    };

    let start_time = if let Some(t) = start_time {
        t
    } else if non_interactive {
        anyhow::bail!("--start-time is required in non-interactive mode");
    } else {
        Text::new("Start time (HH:MM:SS):").prompt()?
    };

    let end_time = if let Some(t) = end_time {
        t
    } else if non_interactive {
        anyhow::bail!("--end-time is required in non-interactive mode");
    } else {
        Text::new("End time (HH:MM:SS):").prompt()?
    };

    let shift: Shift = client.post(
        "/shifts",
        &json!({"name": name, "start_time": start_time, "end_time": end_time}),
    )?;

    println!(
        "Created shift '{}' ({} - {})",
        shift.name, shift.start_time, shift.end_time
    );
    Ok(())
}

pub fn run_shift_list(json_output: bool) -> anyhow::Result<()> {
    let creds = load_credentials()?;
    let client = ApiClient::new(&creds)?;

    let shifts: Vec<Shift> = client.get("/shifts")?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&shifts)?);
        return Ok(());
    }

    if shifts.is_empty() {
        println!("No shifts found.");
        return Ok(());
    }

    println!("{:<36}  {:<10}  {:<10}  {:<10}", "ID", "NAME", "START", "END");
    for s in &shifts {
        println!(
            "{:<36}  {:<10}  {:<10}  {:<10}",
            s.id, s.name, s.start_time, s.end_time
        );
    }

    Ok(())
}

pub fn run_shift_update(
    id: String,
    name: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
) -> anyhow::Result<()> {
    let creds = load_credentials()?;
    let client = ApiClient::new(&creds)?;

    let mut body = Map::new();
    if let Some(name) = name {
        body.insert("name".to_string(), json!(name));
    }
    if let Some(start_time) = start_time {
        body.insert("start_time".to_string(), json!(start_time));
    }
    if let Some(end_time) = end_time {
        body.insert("end_time".to_string(), json!(end_time));
    }

    if body.is_empty() {
        anyhow::bail!("Nothing to update. Pass --name, --start-time, or --end-time.");
    }

    let shift: Shift = client.patch(&format!("/shifts/{id}"), &Value::Object(body))?;

    println!(
        "Updated shift '{}' ({} - {})",
        shift.name, shift.start_time, shift.end_time
    );
    Ok(())
}

pub fn run_shift_delete(id: String, yes: bool) -> anyhow::Result<()> {
    let creds = load_credentials()?;
    let client = ApiClient::new(&creds)?;

    if !yes {
        let confirmed = Confirm::new(&format!("Delete shift {id}?"))
            .with_default(false)
            .prompt()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    client.delete(&format!("/shifts/{id}"))?;

    println!("Deleted shift {id}");
    Ok(())
}
