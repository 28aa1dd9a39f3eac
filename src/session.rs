//! Explicit working state for one loaded table.
//!
//! A [`Session`] owns the table that was loaded, the profiles computed from
//! it, the cleaning plan, the cleaned table (once cleaning has been applied),
//! and the current search term. Loading a new table replaces all of it.

use anyhow::Result;
use log::debug;

use crate::{
    charts::{ChartSpec, build_charts, xy_chart},
    clean::{CleanOutcome, CleaningPlan, MissingStrategy, clean_table, ensure_known_column},
    config::ProfilerConfig,
    data::{Row, Table},
    profile::{ColumnProfile, profile_table},
    search::search_rows,
};

#[derive(Debug, Clone)]
pub struct Session {
    config: ProfilerConfig,
    table: Table,
    profiles: Vec<ColumnProfile>,
    plan: CleaningPlan,
    cleaned: Option<CleanOutcome>,
    search: String,
}

impl Session {
    pub fn load(table: Table, config: ProfilerConfig) -> Self {
        let profiles = profile_table(&table, &config);
        let plan = CleaningPlan::from_profiles(&profiles);
        debug!(
            "Loaded {} row(s) with {} column(s)",
            table.row_count(),
            profiles.len()
        );
        Self {
            config,
            table,
            profiles,
            plan,
            cleaned: None,
            search: String::new(),
        }
    }

    pub fn config(&self) -> &ProfilerConfig {
        &self.config
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn profiles(&self) -> &[ColumnProfile] {
        &self.profiles
    }

    pub fn plan(&self) -> &CleaningPlan {
        &self.plan
    }

    /// Overrides one column's strategy. Any previously cleaned table is
    /// discarded because it no longer reflects the plan.
    pub fn set_strategy(&mut self, column: &str, strategy: MissingStrategy) -> Result<()> {
        ensure_known_column(&self.profiles, column)?;
        self.plan.set(column, strategy);
        self.cleaned = None;
        Ok(())
    }

    pub fn apply_cleaning(&mut self) -> &CleanOutcome {
        let outcome = clean_table(&self.table, &self.profiles, &self.plan);
        self.cleaned.insert(outcome)
    }

    pub fn cleaned(&self) -> Option<&CleanOutcome> {
        self.cleaned.as_ref()
    }

    /// The cleaned table when cleaning has been applied, the loaded one otherwise.
    pub fn working_table(&self) -> &Table {
        self.cleaned
            .as_ref()
            .map(|outcome| &outcome.table)
            .unwrap_or(&self.table)
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn search_term(&self) -> &str {
        &self.search
    }

    pub fn visible_rows(&self) -> Vec<&Row> {
        search_rows(self.working_table(), &self.search)
    }

    /// Charts use the column types inferred at load time.
    pub fn charts(&self) -> Vec<ChartSpec> {
        build_charts(self.working_table(), &self.profiles, &self.config)
    }

    /// An x/y series over the working table for two named columns.
    pub fn xy_chart(&self, x: &str, y: &str) -> Result<ChartSpec> {
        ensure_known_column(&self.profiles, x)?;
        ensure_known_column(&self.profiles, y)?;
        Ok(xy_chart(self.working_table(), x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Cell;

    fn sample() -> Table {
        Table::new(vec![
            Row::new().with("name", "Ada").with("score", "90"),
            Row::new().with("name", "Bob").with("score", ""),
            Row::new().with("name", "Ada").with("score", "90"),
            Row::new().with("name", "Cy").with("score", "70"),
        ])
    }

    #[test]
    fn load_profiles_and_plans_defaults() {
        let session = Session::load(sample(), ProfilerConfig::default());
        assert_eq!(session.profiles().len(), 2);
        assert_eq!(session.plan().strategy("score"), MissingStrategy::Mean);
        assert!(session.cleaned().is_none());
        assert_eq!(session.working_table().row_count(), 4);
    }

    #[test]
    fn cleaning_switches_working_table() {
        let mut session = Session::load(sample(), ProfilerConfig::default());
        let outcome = session.apply_cleaning();
        assert_eq!(outcome.table.row_count(), 3);
        assert_eq!(session.working_table().row_count(), 3);
        assert_eq!(
            session.working_table().rows()[1].get("score"),
            Some(&Cell::text("80.00"))
        );
        assert_eq!(session.table().row_count(), 4);
    }

    #[test]
    fn changing_strategy_discards_cleaned_table() {
        let mut session = Session::load(sample(), ProfilerConfig::default());
        session.apply_cleaning();
        session
            .set_strategy("score", MissingStrategy::Remove)
            .expect("known column");
        assert!(session.cleaned().is_none());
        assert_eq!(session.apply_cleaning().table.row_count(), 2);
        assert!(session.set_strategy("missing", MissingStrategy::Mode).is_err());
    }

    #[test]
    fn search_filters_visible_rows() {
        let mut session = Session::load(sample(), ProfilerConfig::default());
        session.set_search("ada");
        assert_eq!(session.search_term(), "ada");
        assert_eq!(session.visible_rows().len(), 2);
        session.apply_cleaning();
        assert_eq!(session.visible_rows().len(), 1);
    }

    #[test]
    fn xy_chart_reads_working_table_and_checks_columns() {
        let mut session = Session::load(sample(), ProfilerConfig::default());
        session.apply_cleaning();
        match session.xy_chart("name", "score").expect("known columns") {
            ChartSpec::Scatter { points, .. } => {
                assert_eq!(points.len(), 3);
                assert_eq!(points[1].x, "Bob");
                assert_eq!(points[1].y, 80.0);
            }
            other => panic!("expected x/y series, got {other:?}"),
        }
        assert!(session.xy_chart("name", "height").is_err());
    }

    #[test]
    fn reload_replaces_everything() {
        let mut session = Session::load(sample(), ProfilerConfig::default());
        session.apply_cleaning();
        session = Session::load(
            Table::new(vec![Row::new().with("x", "1")]),
            session.config().clone(),
        );
        assert!(session.cleaned().is_none());
        assert_eq!(session.profiles()[0].name, "x");
    }
}
