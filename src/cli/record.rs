use inquire::{Select, Text};
use serde_json::{Map, Value, json};

use super::credentials::load_credentials;
use super::drafts::DraftStore;
use super::http_client::{ApiClient, find_section_by_name, find_shift_by_name};
use crate::types::{RecordWithRelations, Section, Shift};

const DRAFT_KIND: &str = "record";

enum FieldKind {
    Int,
    Float,
    Text,
}

/// The detail form for each section, in entry order.
fn form_fields(section_name: &str) -> Option<&'static [(&'static str, FieldKind)]> {
    match section_name {
        "CCS" => Some(&[
            ("baf_in", FieldKind::Int),
            ("baf_out", FieldKind::Int),
            ("crm_in", FieldKind::Int),
            ("crm_out", FieldKind::Int),
            ("shipped_out", FieldKind::Int),
            ("tugger_in", FieldKind::Int),
            ("tugger_off", FieldKind::Int),
            ("total_trucks_in", FieldKind::Int),
            ("total_trucks_out", FieldKind::Int),
            ("total_movements", FieldKind::Int),
            ("total_trucks", FieldKind::Int),
            ("hook", FieldKind::Int),
            ("down_time", FieldKind::Float),
            ("moved_of_shipping", FieldKind::Int),
            ("slitter_on", FieldKind::Int),
            ("slitter_off", FieldKind::Int),
            ("coils_hatted", FieldKind::Int),
            ("issues", FieldKind::Text),
        ]),
        "BAF" => Some(&[
            ("production_count", FieldKind::Int),
            ("defect_count", FieldKind::Int),
            ("machine_downtime", FieldKind::Float),
            ("notes", FieldKind::Text),
        ]),
        "Slitter" => Some(&[
            ("coils_processed", FieldKind::Int),
            ("total_weight", FieldKind::Float),
            ("scrap_weight", FieldKind::Float),
            ("blade_changes", FieldKind::Int),
            ("remarks", FieldKind::Text),
        ]),
        _ => None,
    }
}

fn detail_tag(section_name: &str) -> Option<&'static str> {
    match section_name {
        "CCS" => Some("ccs"),
        "BAF" => Some("baf"),
        "Slitter" => Some("slitter"),
        _ => None,
    }
}

fn pick_section(sections: &[Section], flag: Option<String>) -> anyhow::Result<Section> {
    if let Some(name) = flag {
        return find_section_by_name(sections, &name);
    }
    let names: Vec<&str> = sections.iter().map(|s| s.name.as_str()).collect();
    let chosen = Select::new("Section:", names).prompt()?;
    find_section_by_name(sections, chosen)
}

fn pick_shift(shifts: &[Shift], flag: Option<String>) -> anyhow::Result<Shift> {
    if let Some(name) = flag {
        return find_shift_by_name(shifts, &name);
    }
    let labels: Vec<String> = shifts
        .iter()
        .map(|s| format!("{} ({} - {})", s.name, s.start_time, s.end_time))
        .collect();
    let chosen = Select::new("Shift:", labels.clone()).prompt()?;
    let index = labels.iter().position(|l| *l == chosen).unwrap_or(0);
    Ok(shifts[index].clone())
}

fn prompt_field(
    name: &str,
    kind: &FieldKind,
    current: Option<&Value>,
) -> anyhow::Result<Option<Value>> {
    let label = format!("{name}:");
    let mut prompt = Text::new(&label);
    let current_text = current.map(|v| match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    });
    if let Some(text) = &current_text {
        prompt = prompt.with_initial_value(text);
    }

    let answer = prompt
        .with_help_message("leave empty to skip")
        .prompt()?;
    let answer = answer.trim();

    if answer.is_empty() {
        return Ok(None);
    }

    let value = match kind {
        FieldKind::Int => {
            let n: i64 = answer
                .parse()
                .map_err(|_| anyhow::anyhow!("'{answer}' is not a whole number"))?;
            json!(n)
        }
        FieldKind::Float => {
            let n: f64 = answer
                .parse()
                .map_err(|_| anyhow::anyhow!("'{answer}' is not a number"))?;
            json!(n)
        }
        FieldKind::Text => json!(answer),
    };

    Ok(Some(value))
}

pub fn run_record_submit(
    section: Option<String>,
    shift: Option<String>,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let creds = load_credentials()?;
    let client = ApiClient::new(&creds)?;

    let sections = client.fetch_sections()?;
    let shifts = client.fetch_shifts()?;

    let (section, shift) = if non_interactive {
        let section_name =
            section.ok_or_else(|| anyhow::anyhow!("--section is required in non-interactive mode"))?;
        let shift_name =
            shift.ok_or_else(|| anyhow::anyhow!("--shift is required in non-interactive mode"))?;
        (
            find_section_by_name(&sections, &section_name)?,
            find_shift_by_name(&shifts, &shift_name)?,
        )
    } else {
        (pick_section(&sections, section)?, pick_shift(&shifts, shift)?)
    };

    let drafts = DraftStore::open()?;
    let mut fields: Map<String, Value> = match drafts.load(DRAFT_KIND, &section.id, &shift.id)? {
        Some(Value::Object(map)) => {
            println!("Restored draft for {} / {}", section.name, shift.name);
            map
        }
        _ => Map::new(),
    };

    if !non_interactive {
        if let Some(form) = form_fields(&section.name) {
            for (name, kind) in form {
                match prompt_field(name, kind, fields.get(*name))? {
                    Some(value) => {
                        fields.insert((*name).to_string(), value);
                    }
                    None => {
                        fields.remove(*name);
                    }
                }
                // Write-through so an aborted run can resume where it left off
                drafts.save(DRAFT_KIND, &section.id, &shift.id, &Value::Object(fields.clone()))?;
            }
        }
    }

    let detail = if fields.is_empty() {
        None
    } else {
        let tag = detail_tag(&section.name)
            .ok_or_else(|| anyhow::anyhow!("Section '{}' has no detail form", section.name))?;
        let mut detail = fields.clone();
        detail.insert("section".to_string(), json!(tag));
        Some(Value::Object(detail))
    };

    let record: RecordWithRelations = client.post(
        "/records",
        &json!({
            "section_id": section.id,
            "shift_id": shift.id,
            "detail": detail,
        }),
    )?;

    drafts.clear(DRAFT_KIND, &section.id, &shift.id)?;

    println!();
    println!(
        "Submitted record {} for {} / {}",
        record.record.id, record.section.name, record.shift.name
    );
    println!();

    Ok(())
}

pub fn run_record_list(json_output: bool) -> anyhow::Result<()> {
    let creds = load_credentials()?;
    let client = ApiClient::new(&creds)?;

    let records: Vec<RecordWithRelations> = client.get("/records/my-records")?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No records found.");
        return Ok(());
    }

    println!(
        "{:<36}  {:<10}  {:<8}  {:<20}",
        "ID", "SECTION", "SHIFT", "CREATED"
    );
    for r in &records {
        println!(
            "{:<36}  {:<10}  {:<8}  {:<20}",
            r.record.id,
            r.section.name,
            r.shift.name,
            r.record.created_at.format("%Y-%m-%d %H:%M"),
        );
    }

    Ok(())
}

pub fn run_record_show(id: String) -> anyhow::Result<()> {
    let creds = load_credentials()?;
    let client = ApiClient::new(&creds)?;

    let record: RecordWithRelations = client.get(&format!("/records/{id}"))?;
    println!("{}", serde_json::to_string_pretty(&record)?);

    Ok(())
}
