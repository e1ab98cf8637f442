use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use chrono::Utc;
use serde::Serialize;

use crate::config::Config;
use crate::flatten::{flatten_match, match_id_from_path};
use crate::impute::impute_match_fields;
use crate::loader::{RawMatch, load_records};
use crate::record::{DeliveryRecord, MatchRecord, Tier};
use crate::report::Reporter;
use crate::sequence::fill_event_match_numbers;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub tests: usize,
    pub odis: usize,
    pub t20s: usize,
    pub deliveries: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub tests: Vec<MatchRecord>,
    pub odis: Vec<MatchRecord>,
    pub t20s: Vec<MatchRecord>,
    pub deliveries: Vec<DeliveryRecord>,
}

impl Tables {
    pub fn matches(&self, tier: Tier) -> &[MatchRecord] {
        match tier {
            Tier::Test => &self.tests,
            Tier::Odi => &self.odis,
            Tier::T20 => &self.t20s,
        }
    }

    fn matches_mut(&mut self, tier: Tier) -> &mut Vec<MatchRecord> {
        match tier {
            Tier::Test => &mut self.tests,
            Tier::Odi => &mut self.odis,
            Tier::T20 => &mut self.t20s,
        }
    }

    pub fn counts(&self) -> TableCounts {
        TableCounts {
            tests: self.tests.len(),
            odis: self.odis.len(),
            t20s: self.t20s.len(),
            deliveries: self.deliveries.len(),
        }
    }

    /// All three match tables in tier order; read-only evidence for imputation.
    pub fn universe(&self) -> Vec<MatchRecord> {
        Tier::ALL
            .into_iter()
            .flat_map(|tier| self.matches(tier).iter().cloned())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlattenStats {
    pub flattened: usize,
    pub unrecognized: usize,
    pub duplicates: usize,
    pub unnamed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub input_dir: PathBuf,
    pub started_at: String,
    pub finished_at: String,
    pub files_discovered: usize,
    pub files_failed: usize,
    pub flatten: FlattenStats,
    pub tables: TableCounts,
}

pub struct PipelineOutput {
    pub tables: Tables,
    pub summary: RunSummary,
}

pub fn run(config: &Config, reporter: &dyn Reporter) -> Result<PipelineOutput> {
    let started_at = Utc::now().to_rfc3339();
    let loaded = load_records(
        &config.input_dir,
        &config.file_ext,
        config.load_threads,
        reporter,
    )?;
    let (flat, flatten) = flatten_all(loaded.records, reporter);
    let tables = transform(flat);
    let counts = tables.counts();
    reporter.tables_built(&counts);

    Ok(PipelineOutput {
        tables,
        summary: RunSummary {
            input_dir: config.input_dir.clone(),
            started_at,
            finished_at: Utc::now().to_rfc3339(),
            files_discovered: loaded.discovered,
            files_failed: loaded.failed,
            flatten,
            tables: counts,
        },
    })
}

/// Flatten every parsed document into tier tables and the delivery table.
/// Matches with no tier, or whose id was already seen, are reported and left out
/// together with their deliveries.
pub fn flatten_all(records: Vec<RawMatch>, reporter: &dyn Reporter) -> (Tables, FlattenStats) {
    let mut tables = Tables::default();
    let mut stats = FlattenStats::default();
    let mut seen = HashSet::new();

    for raw in records {
        let Some(match_id) = match_id_from_path(&raw.path) else {
            stats.unnamed += 1;
            reporter.file_failed(&raw.path, &anyhow!("cannot derive match id from file name"));
            continue;
        };
        if seen.contains(&match_id) {
            stats.duplicates += 1;
            reporter.duplicate_match(&match_id, &raw.path);
            continue;
        }

        let flat = flatten_match(&raw.value, &match_id);
        let Some(tier) = flat.tier else {
            stats.unrecognized += 1;
            reporter.unrecognized_match_type(&match_id, &flat.record.match_type);
            continue;
        };
        seen.insert(match_id);
        stats.flattened += 1;
        tables.matches_mut(tier).push(flat.record);
        tables.deliveries.extend(flat.deliveries);
    }
    (tables, stats)
}

/// Impute every tier against the union of all tiers, then number matches within events.
pub fn transform(flat: Tables) -> Tables {
    let universe = flat.universe();
    let Tables {
        tests,
        odis,
        t20s,
        deliveries,
    } = flat;

    let finish = |records: Vec<MatchRecord>| {
        fill_event_match_numbers(impute_match_fields(records, &universe))
    };

    Tables {
        tests: finish(tests),
        odis: finish(odis),
        t20s: finish(t20s),
        deliveries,
    }
}
