use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::config::Config;
use crate::pipeline::{RunSummary, Tables};
use crate::record::{DeliveryRecord, MatchNumber, MatchRecord};
use crate::report::Reporter;

pub const WORKBOOK_FILE: &str = "cricket_tables.xlsx";
pub const SUMMARY_FILE: &str = "summary.json";

// Excel's sheet height, header row included.
const XLSX_MAX_ROWS: usize = 1_048_576;

const MATCH_COLUMNS: &[&str] = &[
    "match_id",
    "match_type",
    "season",
    "venue",
    "city",
    "dates",
    "teams",
    "toss_winner",
    "toss_decision",
    "outcome_result",
    "outcome_winner",
    "outcome_type",
    "outcome_by",
    "event_name",
    "event_match_number",
    "balls_per_over",
    "match_type_number",
    "overs",
    "gender",
    "officials",
    "player_of_match",
    "team_type",
];

const DELIVERY_COLUMNS: &[&str] = &[
    "match_id",
    "innings",
    "batting_team",
    "over",
    "delivery_in_over",
    "batter",
    "bowler",
    "non_striker",
    "runs_batter",
    "runs_extras",
    "runs_total",
    "wicket_kind",
    "wicket_player_out",
    "wicket_fielders",
];

pub struct ExportReport {
    pub files: Vec<PathBuf>,
}

/// Write the four tables in the configured formats plus `summary.json`.
pub fn export_tables(
    tables: &Tables,
    summary: &RunSummary,
    config: &Config,
    reporter: &dyn Reporter,
) -> Result<ExportReport> {
    let dir = &config.output_dir;
    fs::create_dir_all(dir).with_context(|| format!("create output dir {}", dir.display()))?;

    let sheets = [
        ("test_matches", match_rows(&tables.tests)),
        ("odi_matches", match_rows(&tables.odis)),
        ("t20_matches", match_rows(&tables.t20s)),
        ("deliveries", delivery_rows(&tables.deliveries)),
    ];

    let mut files = Vec::new();
    if config.format.writes_csv() {
        for (name, rows) in &sheets {
            let path = dir.join(format!("{name}.csv"));
            write_csv_file(&path, rows)?;
            reporter.table_written(name, &path, rows.len().saturating_sub(1));
            files.push(path);
        }
    }
    if config.format.writes_xlsx() {
        let path = dir.join(WORKBOOK_FILE);
        write_workbook(&path, &sheets)?;
        for (name, rows) in &sheets {
            reporter.table_written(name, &path, rows.len().saturating_sub(1));
        }
        files.push(path);
    }

    let path = dir.join(SUMMARY_FILE);
    let body = serde_json::to_string_pretty(summary).context("serialize run summary")?;
    fs::write(&path, body).with_context(|| format!("write {}", path.display()))?;
    files.push(path);

    Ok(ExportReport { files })
}

/// Header row followed by one row per match.
pub fn match_rows(records: &[MatchRecord]) -> Vec<Vec<String>> {
    let mut rows = vec![header(MATCH_COLUMNS)];
    rows.extend(records.iter().map(match_row));
    rows
}

fn match_row(m: &MatchRecord) -> Vec<String> {
    vec![
        m.match_id.clone(),
        m.match_type.clone(),
        m.season.clone().unwrap_or_default(),
        m.venue.clone().unwrap_or_default(),
        m.city.clone().unwrap_or_default(),
        list_to_string(&m.dates),
        list_to_string(&m.teams),
        m.toss_winner.clone().unwrap_or_default(),
        m.toss_decision.clone().unwrap_or_default(),
        m.outcome_result.clone().unwrap_or_default(),
        m.outcome_winner.clone().unwrap_or_default(),
        m.outcome_type.clone().unwrap_or_default(),
        opt_to_string(m.outcome_by),
        m.event_name.clone().unwrap_or_default(),
        match &m.event_match_number {
            Some(MatchNumber::Int(n)) => n.to_string(),
            Some(MatchNumber::Float(float)) => float.to_string(),
            Some(MatchNumber::Text(text)) => text.clone(),
            None => String::new(),
        },
        opt_to_string(m.balls_per_over),
        opt_to_string(m.match_type_number),
        opt_to_string(m.overs),
        m.gender.clone().unwrap_or_default(),
        m.officials
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_default(),
        if m.player_of_match.is_empty() {
            String::new()
        } else {
            list_to_string(&m.player_of_match)
        },
        m.team_type.clone().unwrap_or_default(),
    ]
}

pub fn delivery_rows(records: &[DeliveryRecord]) -> Vec<Vec<String>> {
    let mut rows = vec![header(DELIVERY_COLUMNS)];
    rows.extend(records.iter().map(delivery_row));
    rows
}

fn delivery_row(d: &DeliveryRecord) -> Vec<String> {
    let wicket = d.wicket.as_ref();
    vec![
        d.match_id.clone(),
        d.innings.to_string(),
        d.batting_team.clone().unwrap_or_default(),
        opt_to_string(d.over),
        d.delivery_in_over.to_string(),
        d.batter.clone().unwrap_or_default(),
        d.bowler.clone().unwrap_or_default(),
        d.non_striker.clone().unwrap_or_default(),
        opt_to_string(d.runs_batter),
        opt_to_string(d.runs_extras),
        opt_to_string(d.runs_total),
        wicket.and_then(|w| w.kind.clone()).unwrap_or_default(),
        wicket.and_then(|w| w.player_out.clone()).unwrap_or_default(),
        wicket.map(|w| list_to_string(&w.fielders)).unwrap_or_default(),
    ]
}

fn header(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| c.to_string()).collect()
}

fn list_to_string(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

fn opt_to_string<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/* ---------------- CSV ---------------- */

fn write_csv_file(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    write_csv_rows(&mut writer, rows).with_context(|| format!("write {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}

pub fn write_csv_rows<W: Write>(writer: &mut csv::Writer<W>, rows: &[Vec<String>]) -> csv::Result<()> {
    for row in rows {
        writer.write_record(row)?;
    }
    Ok(())
}

/* ---------------- XLSX ---------------- */

fn write_workbook(path: &Path, sheets: &[(&str, Vec<Vec<String>>)]) -> Result<()> {
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let Some((head, body)) = rows.split_first() else {
            continue;
        };
        // Tables taller than one sheet continue on `<name>_2`, `<name>_3`, ...
        let chunks = body.chunks(XLSX_MAX_ROWS - 1).collect::<Vec<_>>();
        let chunks = if chunks.is_empty() { vec![body] } else { chunks };
        for (part, chunk) in chunks.into_iter().enumerate() {
            let sheet_name = if part == 0 {
                name.to_string()
            } else {
                format!("{name}_{}", part + 1)
            };
            let sheet = workbook.add_worksheet();
            sheet.set_name(&sheet_name)?;
            write_rows(sheet, head, chunk)?;
        }
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(())
}

fn write_rows(worksheet: &mut Worksheet, head: &[String], rows: &[Vec<String>]) -> Result<()> {
    for (col_idx, value) in head.iter().enumerate() {
        worksheet
            .write_string(0, col_idx as u16, value)
            .with_context(|| format!("write header cell {col_idx}"))?;
    }
    for (row_idx, row) in rows.iter().enumerate() {
        let row_num = (row_idx + 1) as u32;
        for (col_idx, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            worksheet
                .write_string(row_num, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_num},{col_idx})"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{delivery_rows, match_rows, write_csv_rows};
    use crate::record::{DeliveryRecord, Dismissal, MatchNumber, MatchRecord};

    #[test]
    fn csv_round_trips_awkward_cells() {
        let rows = vec![
            vec!["name".to_string(), "note".to_string(), "empty".to_string()],
            vec!["plain".to_string(), "a,b".to_string(), String::new()],
            vec!["say \"hi\"".to_string(), "two\nlines".to_string(), String::new()],
        ];
        let mut writer = csv::Writer::from_writer(Vec::new());
        write_csv_rows(&mut writer, &rows).unwrap();
        let bytes = writer.into_inner().unwrap();

        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.starts_with("name,note,empty\nplain,\"a,b\",\n"));

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(bytes.as_slice());
        let read = reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        assert_eq!(read, rows);
    }

    #[test]
    fn fractional_match_number_renders_as_written() {
        let mut m = MatchRecord::empty("7", "t20");
        m.event_match_number = Some(MatchNumber::Float(2.5));
        assert_eq!(match_rows(&[m])[1][14], "2.5");
    }

    #[test]
    fn match_row_renders_lists_and_nulls() {
        let mut m = MatchRecord::empty("42", "odi");
        m.teams = vec!["India".to_string(), "Pakistan".to_string()];
        m.event_match_number = Some(MatchNumber::Int(3));
        let rows = match_rows(&[m]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], "match_id");
        assert_eq!(rows[1][6], r#"["India","Pakistan"]"#);
        assert_eq!(rows[1][14], "3");
        assert_eq!(rows[1][4], "");
        assert_eq!(rows[1][20], "");
    }

    #[test]
    fn delivery_row_leaves_wicket_cells_empty_without_dismissal() {
        let base = DeliveryRecord {
            match_id: "1".to_string(),
            innings: 1,
            batting_team: Some("A".to_string()),
            over: Some(0),
            delivery_in_over: 1,
            batter: Some("X".to_string()),
            bowler: Some("Y".to_string()),
            non_striker: Some("Z".to_string()),
            runs_batter: Some(4),
            runs_extras: Some(0),
            runs_total: Some(4),
            wicket: None,
        };
        let out = DeliveryRecord {
            wicket: Some(Dismissal {
                kind: Some("caught".to_string()),
                player_out: Some("X".to_string()),
                fielders: vec!["F".to_string()],
            }),
            ..base.clone()
        };
        let rows = delivery_rows(&[base, out]);
        assert_eq!(rows[1][10], "4");
        assert_eq!(&rows[1][11..], &["", "", ""]);
        assert_eq!(&rows[2][11..], &["caught", "X", r#"["F"]"#]);
    }
}
