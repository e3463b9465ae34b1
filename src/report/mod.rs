//! Aggregation over shift records for reporting.
//!
//! These helpers are pure functions over already-fetched records, so the
//! CLI can filter and bucket without another server round trip.

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::RecordWithRelations;

/// Client-side filter applied before aggregation.
///
/// Dates are inclusive on both ends. An empty filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub section_id: Option<String>,
    pub shift_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl RecordFilter {
    pub fn matches(&self, record: &RecordWithRelations) -> bool {
        if let Some(section_id) = &self.section_id {
            if record.record.section_id != *section_id {
                return false;
            }
        }

        if let Some(shift_id) = &self.shift_id {
            if record.record.shift_id != *shift_id {
                return false;
            }
        }

        let date = record.record.created_at.date_naive();

        if let Some(start) = self.start_date {
            if date < start {
                return false;
            }
        }

        if let Some(end) = self.end_date {
            if date > end {
                return false;
            }
        }

        true
    }

    pub fn apply<'a>(&self, records: &'a [RecordWithRelations]) -> Vec<&'a RecordWithRelations> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Per-day totals, sorted ascending by date. Days without records are
/// omitted rather than zero-filled.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub date: NaiveDate,
    pub total_records: usize,
    pub total_movements: i64,
    pub avg_down_time: f64,
    pub total_trucks_in: i64,
    pub total_trucks_out: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub total_records: usize,
    pub total_movements: i64,
    pub avg_down_time: f64,
    pub total_trucks_in: i64,
    pub total_trucks_out: i64,
}

#[derive(Default)]
struct Accumulator {
    total_records: usize,
    total_movements: i64,
    total_trucks_in: i64,
    total_trucks_out: i64,
    down_time_sum: f64,
}

impl Accumulator {
    fn add(&mut self, record: &RecordWithRelations) {
        self.total_records += 1;

        if let Some(ccs) = record.detail.as_ref().and_then(|d| d.as_ccs()) {
            self.total_movements += ccs.total_movements.unwrap_or(0);
            self.total_trucks_in += ccs.total_trucks_in.unwrap_or(0);
            self.total_trucks_out += ccs.total_trucks_out.unwrap_or(0);
            self.down_time_sum += ccs.down_time.unwrap_or(0.0);
        }
    }

    /// Per-record average: records without a downtime value still count
    /// in the denominator, contributing 0 to the sum.
    fn avg_down_time(&self) -> f64 {
        if self.total_records == 0 {
            return 0.0;
        }
        round_one_decimal(self.down_time_sum / self.total_records as f64)
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Buckets records by calendar day (UTC) and totals the CCS throughput
/// fields. Records without a CCS detail still count toward `total_records`
/// but contribute nothing to the sums.
pub fn daily_stats(records: &[&RecordWithRelations]) -> Vec<DailyStats> {
    let mut buckets: Vec<(NaiveDate, Accumulator)> = Vec::new();

    for record in records {
        let date = record.record.created_at.date_naive();
        let acc = match buckets.iter_mut().find(|(d, _)| *d == date) {
            Some((_, acc)) => acc,
            None => {
                buckets.push((date, Accumulator::default()));
                &mut buckets.last_mut().unwrap().1
            }
        };
        acc.add(record);
    }

    buckets.sort_by_key(|(date, _)| *date);

    buckets
        .into_iter()
        .map(|(date, acc)| DailyStats {
            date,
            total_records: acc.total_records,
            total_movements: acc.total_movements,
            avg_down_time: acc.avg_down_time(),
            total_trucks_in: acc.total_trucks_in,
            total_trucks_out: acc.total_trucks_out,
        })
        .collect()
}

/// Grand totals over the whole filtered set.
pub fn summary_stats(records: &[&RecordWithRelations]) -> SummaryStats {
    let mut acc = Accumulator::default();
    for record in records {
        acc.add(record);
    }

    SummaryStats {
        total_records: acc.total_records,
        total_movements: acc.total_movements,
        avg_down_time: acc.avg_down_time(),
        total_trucks_in: acc.total_trucks_in,
        total_trucks_out: acc.total_trucks_out,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        CcsDetails, Record, RecordDetail, Section, Shift, UserSummary,
    };
    use chrono::{DateTime, Utc};

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn ccs_record(
        id: &str,
        created_at: &str,
        movements: i64,
        down_time: f64,
        trucks_in: i64,
        trucks_out: i64,
    ) -> RecordWithRelations {
        RecordWithRelations {
            record: Record {
                id: id.to_string(),
                user_id: "u1".to_string(),
                section_id: "sec-ccs".to_string(),
                shift_id: "shift-1".to_string(),
                created_at: ts(created_at),
            },
            user: UserSummary {
                id: "u1".to_string(),
                username: "operator".to_string(),
            },
            section: Section {
                id: "sec-ccs".to_string(),
                name: "CCS".to_string(),
                created_at: ts(created_at),
                updated_at: ts(created_at),
            },
            shift: Shift {
                id: "shift-1".to_string(),
                name: "1st".to_string(),
                start_time: "07:00:00".to_string(),
                end_time: "15:00:00".to_string(),
                created_at: ts(created_at),
                updated_at: ts(created_at),
            },
            detail: Some(RecordDetail::Ccs(CcsDetails {
                total_movements: Some(movements),
                down_time: Some(down_time),
                total_trucks_in: Some(trucks_in),
                total_trucks_out: Some(trucks_out),
                ..Default::default()
            })),
        }
    }

    #[test]
    fn daily_stats_buckets_by_day_sorted_ascending() {
        let records = vec![
            ccs_record("r3", "2024-01-02T08:00:00Z", 1, 1.0, 1, 0),
            ccs_record("r1", "2024-01-01T08:00:00Z", 5, 2.0, 3, 2),
            ccs_record("r2", "2024-01-01T16:00:00Z", 3, 4.0, 1, 1),
        ];
        let refs: Vec<&RecordWithRelations> = records.iter().collect();

        let daily = daily_stats(&refs);
        assert_eq!(daily.len(), 2);

        assert_eq!(daily[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(daily[0].total_records, 2);
        assert_eq!(daily[0].total_movements, 8);
        assert_eq!(daily[0].avg_down_time, 3.0);
        assert_eq!(daily[0].total_trucks_in, 4);
        assert_eq!(daily[0].total_trucks_out, 3);

        assert_eq!(daily[1].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(daily[1].total_records, 1);
        assert_eq!(daily[1].total_movements, 1);
        assert_eq!(daily[1].avg_down_time, 1.0);
    }

    #[test]
    fn days_in_different_years_stay_separate() {
        let records = vec![
            ccs_record("r1", "2023-03-15T08:00:00Z", 2, 1.0, 1, 1),
            ccs_record("r2", "2024-03-15T08:00:00Z", 4, 2.0, 2, 2),
        ];
        let refs: Vec<&RecordWithRelations> = records.iter().collect();

        let daily = daily_stats(&refs);
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].date.to_string(), "2023-03-15");
        assert_eq!(daily[1].date.to_string(), "2024-03-15");
    }

    #[test]
    fn avg_down_time_rounds_to_one_decimal() {
        let records = vec![
            ccs_record("r1", "2024-01-01T08:00:00Z", 0, 1.0, 0, 0),
            ccs_record("r2", "2024-01-01T09:00:00Z", 0, 1.0, 0, 0),
            ccs_record("r3", "2024-01-01T10:00:00Z", 0, 2.0, 0, 0),
        ];
        let refs: Vec<&RecordWithRelations> = records.iter().collect();

        let daily = daily_stats(&refs);
        // 4/3 rounds to 1.3
        assert_eq!(daily[0].avg_down_time, 1.3);
    }

    #[test]
    fn records_without_ccs_detail_count_but_add_nothing() {
        let mut record = ccs_record("r1", "2024-01-01T08:00:00Z", 5, 2.0, 1, 1);
        record.detail = None;
        let records = vec![record];
        let refs: Vec<&RecordWithRelations> = records.iter().collect();

        let daily = daily_stats(&refs);
        assert_eq!(daily[0].total_records, 1);
        assert_eq!(daily[0].total_movements, 0);
        assert_eq!(daily[0].avg_down_time, 0.0);
    }

    #[test]
    fn avg_down_time_divides_by_all_records_in_bucket() {
        let mut no_detail = ccs_record("r2", "2024-01-01T12:00:00Z", 0, 0.0, 0, 0);
        no_detail.detail = None;
        let records = vec![
            ccs_record("r1", "2024-01-01T08:00:00Z", 0, 4.0, 0, 0),
            no_detail,
        ];
        let refs: Vec<&RecordWithRelations> = records.iter().collect();

        let daily = daily_stats(&refs);
        assert_eq!(daily[0].total_records, 2);
        assert_eq!(daily[0].avg_down_time, 2.0);

        let summary = summary_stats(&refs);
        assert_eq!(summary.avg_down_time, 2.0);
    }

    #[test]
    fn filter_by_section_and_shift() {
        let mut other = ccs_record("r2", "2024-01-01T08:00:00Z", 1, 1.0, 0, 0);
        other.record.section_id = "sec-baf".to_string();
        let records = vec![
            ccs_record("r1", "2024-01-01T08:00:00Z", 5, 2.0, 1, 1),
            other,
        ];

        let filter = RecordFilter {
            section_id: Some("sec-ccs".to_string()),
            ..Default::default()
        };
        let filtered = filter.apply(&records);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].record.id, "r1");

        let filter = RecordFilter {
            shift_id: Some("shift-2".to_string()),
            ..Default::default()
        };
        assert!(filter.apply(&records).is_empty());
    }

    #[test]
    fn date_filter_is_inclusive_on_both_ends() {
        let records = vec![
            ccs_record("r1", "2024-01-01T00:00:00Z", 1, 1.0, 0, 0),
            ccs_record("r2", "2024-01-02T23:59:59Z", 1, 1.0, 0, 0),
            ccs_record("r3", "2024-01-03T00:00:00Z", 1, 1.0, 0, 0),
        ];

        let filter = RecordFilter {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 2),
            ..Default::default()
        };
        let filtered = filter.apply(&records);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.record.id != "r3"));
    }

    #[test]
    fn summary_over_empty_set_is_zeroed() {
        let summary = summary_stats(&[]);
        assert_eq!(summary.total_records, 0);
        assert_eq!(summary.total_movements, 0);
        assert_eq!(summary.avg_down_time, 0.0);
    }

    #[test]
    fn summary_totals_span_days() {
        let records = vec![
            ccs_record("r1", "2024-01-01T08:00:00Z", 5, 2.0, 3, 2),
            ccs_record("r2", "2024-01-02T08:00:00Z", 1, 4.0, 1, 0),
        ];
        let refs: Vec<&RecordWithRelations> = records.iter().collect();

        let summary = summary_stats(&refs);
        assert_eq!(summary.total_records, 2);
        assert_eq!(summary.total_movements, 6);
        assert_eq!(summary.avg_down_time, 3.0);
        assert_eq!(summary.total_trucks_in, 4);
        assert_eq!(summary.total_trucks_out, 2);
    }
}
