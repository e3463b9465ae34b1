use chrono::NaiveDate;
use serde_json::json;

use super::commands::ReportArgs;
use super::credentials::load_credentials;
use super::http_client::{ApiClient, find_section_by_name, find_shift_by_name};
use crate::report::{RecordFilter, daily_stats, summary_stats};

fn parse_date(label: &str, value: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("Invalid {label} '{value}', expected YYYY-MM-DD"))
}

pub fn run_report(args: ReportArgs) -> anyhow::Result<()> {
    let creds = load_credentials()?;
    let client = ApiClient::new(&creds)?;

    let mut filter = RecordFilter::default();

    if let Some(name) = &args.section {
        let sections = client.fetch_sections()?;
        filter.section_id = Some(find_section_by_name(&sections, name)?.id);
    }

    if let Some(name) = &args.shift {
        let shifts = client.fetch_shifts()?;
        filter.shift_id = Some(find_shift_by_name(&shifts, name)?.id);
    }

    if let Some(date) = &args.start_date {
        filter.start_date = Some(parse_date("start date", date)?);
    }

    if let Some(date) = &args.end_date {
        filter.end_date = Some(parse_date("end date", date)?);
    }

    let records = client.fetch_visible_records()?;
    let filtered = filter.apply(&records);

    let daily = daily_stats(&filtered);
    let summary = summary_stats(&filtered);

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "daily": daily,
                "summary": summary,
            }))?
        );
        return Ok(());
    }

    if daily.is_empty() {
        println!("No records match the given filters.");
        return Ok(());
    }

    println!(
        "{:<12}  {:>8}  {:>10}  {:>9}  {:>9}  {:>10}",
        "DATE", "RECORDS", "MOVEMENTS", "TRUCKS IN", "TRUCKS OUT", "AVG DOWN"
    );
    for day in &daily {
        println!(
            "{:<12}  {:>8}  {:>10}  {:>9}  {:>9}  {:>10.1}",
            day.date.to_string(),
            day.total_records,
            day.total_movements,
            day.total_trucks_in,
            day.total_trucks_out,
            day.avg_down_time,
        );
    }

    println!();
    println!(
        "Total: {} records, {} movements, {} trucks in, {} trucks out, avg down time {:.1}",
        summary.total_records,
        summary.total_movements,
        summary.total_trucks_in,
        summary.total_trucks_out,
        summary.avg_down_time,
    );

    Ok(())
}
