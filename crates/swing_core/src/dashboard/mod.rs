//! # Dashboard Pipeline
//!
//! Synchronous state machine that turns committed selection changes into
//! render frames.
//!
//! ## Lifecycle
//! - `Loading` until [`Dashboard::complete_load`] is called once. Commits made
//!   meanwhile only update the selection (latest wins).
//! - `Ready`: every committed change runs one cycle
//!   `Idle → Resolving → Aggregating → Idle` and notifies listeners once.
//! - `Failed`: the load failed; nothing is ever rendered.
//!
//! Keystrokes in the player box only produce suggestions; they never run a
//! cycle.

pub mod gauge;

pub use gauge::{player_means, read_gauge, GaugeReading, GaugeScale, GaugeScales};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::DashboardConfig;
use crate::data::{RateLine, RateTable, RecordStore};
use crate::error::LoadError;
use crate::filter::{FilterResolver, Resolution, ResolutionTier};
use crate::index::PlayerIndex;
use crate::models::{CountChoice, PitchRecord, SelectionState};
use crate::stats::{self, Bin, Extent};

/// Readiness of the whole pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

/// Position within a recompute cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Idle,
    Resolving,
    Aggregating,
}

/// Output of one completed cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    pub selection: SelectionState,
    pub tier: ResolutionTier,
    pub row_count: usize,
    pub gauges: Vec<GaugeReading>,
    pub rates: Option<RateLine>,
}

/// Renderer hook, called once per completed cycle with the new subset.
pub trait RenderListener {
    fn on_frame(&mut self, frame: &RenderFrame, subset: &[&PitchRecord]);
}

struct FnListener<F>(F);

impl<F> RenderListener for FnListener<F>
where
    F: FnMut(&RenderFrame, &[&PitchRecord]),
{
    fn on_frame(&mut self, frame: &RenderFrame, subset: &[&PitchRecord]) {
        (self.0)(frame, subset)
    }
}

struct LoadedData {
    store: Arc<RecordStore>,
    index: PlayerIndex,
    scales: GaugeScales,
}

pub struct Dashboard {
    config: DashboardConfig,
    selection: SelectionState,
    load_state: LoadState,
    phase: PipelinePhase,
    data: Option<LoadedData>,
    rates: Option<RateTable>,
    resolution: Option<Resolution>,
    last_frame: Option<RenderFrame>,
    listeners: Vec<Box<dyn RenderListener>>,
    cycles: u64,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("config", &self.config)
            .field("selection", &self.selection)
            .field("load_state", &self.load_state)
            .field("phase", &self.phase)
            .field("cycles", &self.cycles)
            .finish_non_exhaustive()
    }
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            selection: SelectionState::default(),
            load_state: LoadState::Loading,
            phase: PipelinePhase::Idle,
            data: None,
            rates: None,
            resolution: None,
            last_frame: None,
            listeners: Vec::new(),
            cycles: 0,
        }
    }

    // ========================
    // Loading
    // ========================

    /// Finish the one-time dataset load.
    ///
    /// On success the player index and gauge scales are built and an initial
    /// cycle runs with whatever selection was committed while loading. On
    /// failure the dashboard stays unready for good and the error is returned
    /// to the caller. Calls after the first are ignored.
    pub fn complete_load(&mut self, result: Result<RecordStore, LoadError>) -> Result<(), LoadError> {
        if self.load_state != LoadState::Loading {
            warn!("Dataset load already completed, ignoring");
            return Ok(());
        }

        match result {
            Ok(store) => {
                let index = PlayerIndex::build(&store);
                let scales = GaugeScales::compute(&store, &self.config);
                info!(
                    rows = store.len(),
                    players = index.len(),
                    "Dashboard ready"
                );
                self.data = Some(LoadedData {
                    store: Arc::new(store),
                    index,
                    scales,
                });
                self.load_state = LoadState::Ready;
                self.run_cycle();
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Dataset load failed, dashboard left empty");
                self.load_state = LoadState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Attach the per-count rate tables. Re-renders when already ready.
    pub fn set_rates(&mut self, rates: RateTable) {
        self.rates = Some(rates);
        if self.is_ready() {
            self.run_cycle();
        }
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn is_ready(&self) -> bool {
        self.load_state == LoadState::Ready
    }

    pub fn phase(&self) -> PipelinePhase {
        self.phase
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Shared handle to the loaded rows.
    pub fn store(&self) -> Option<&Arc<RecordStore>> {
        self.data.as_ref().map(|d| &d.store)
    }

    pub fn player_index(&self) -> Option<&PlayerIndex> {
        self.data.as_ref().map(|d| &d.index)
    }

    pub fn gauge_scales(&self) -> Option<&GaugeScales> {
        self.data.as_ref().map(|d| &d.scales)
    }

    // ========================
    // Events
    // ========================

    /// Keystroke in the player box: suggestions only.
    pub fn on_player_input(&self, text: &str) -> Vec<String> {
        self.suggest_players(text, self.config.suggestion_limit)
    }

    /// Player name committed (blur, Enter, programmatic change).
    pub fn on_player_commit(&mut self, text: &str) {
        self.selection.player_query = text.to_string();
        self.after_selection_change();
    }

    /// Count toggle changed.
    pub fn on_count_change(&mut self, count: CountChoice) {
        self.selection.count = count;
        self.after_selection_change();
    }

    fn after_selection_change(&mut self) {
        match &self.load_state {
            LoadState::Ready => self.run_cycle(),
            LoadState::Loading => debug!(
                player = %self.selection.player_query,
                count = %self.selection.count,
                "Selection queued until dataset is loaded"
            ),
            LoadState::Failed(_) => debug!("Selection ignored, dataset failed to load"),
        }
    }

    pub fn subscribe<L: RenderListener + 'static>(&mut self, listener: L) {
        self.listeners.push(Box::new(listener));
    }

    /// Closure form of [`Dashboard::subscribe`].
    pub fn on_render<F>(&mut self, f: F)
    where
        F: FnMut(&RenderFrame, &[&PitchRecord]) + 'static,
    {
        self.subscribe(FnListener(f));
    }

    fn run_cycle(&mut self) {
        let Some(data) = self.data.as_ref() else {
            return;
        };

        self.phase = PipelinePhase::Resolving;
        debug!(phase = ?self.phase, "Cycle started");
        let resolution = FilterResolver::resolve(&data.store, &data.index, &self.selection);

        self.phase = PipelinePhase::Aggregating;
        debug!(phase = ?self.phase, tier = %resolution.tier, rows = resolution.len());
        let subset: Vec<&PitchRecord> = resolution.rows(&data.store).collect();
        let mut gauges: Vec<GaugeReading> = self
            .config
            .gauges
            .iter()
            .filter_map(|&field| data.scales.get(field))
            .map(|scale| read_gauge(subset.iter().copied(), scale))
            .collect();
        if resolution.tier == ResolutionTier::ExactPlayer {
            let count = self.selection.count;
            for reading in &mut gauges {
                let peers = player_means(
                    data.store.all().iter().filter(|r| count.matches(r)),
                    reading.field,
                );
                reading.percentile = Some(stats::percentile_rank(&peers, reading.value));
            }
        }
        let rates = self
            .rates
            .as_ref()
            .map(|table| table.lookup(self.selection.count, &self.selection.player_query));

        let frame = RenderFrame {
            selection: self.selection.clone(),
            tier: resolution.tier,
            row_count: subset.len(),
            gauges,
            rates,
        };
        for listener in self.listeners.iter_mut() {
            listener.on_frame(&frame, &subset);
        }

        self.resolution = Some(resolution);
        self.last_frame = Some(frame);
        self.cycles += 1;
        self.phase = PipelinePhase::Idle;
        debug!(phase = ?self.phase, cycle = self.cycles, "Cycle finished");
    }

    // ========================
    // Queries
    // ========================

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Rows of the last resolved subset; empty before the first cycle.
    pub fn active_subset(&self) -> Vec<&PitchRecord> {
        match (&self.data, &self.resolution) {
            (Some(data), Some(resolution)) => resolution.rows(&data.store).collect(),
            _ => Vec::new(),
        }
    }

    pub fn resolution_tier(&self) -> Option<ResolutionTier> {
        self.resolution.as_ref().map(|r| r.tier)
    }

    pub fn last_frame(&self) -> Option<&RenderFrame> {
        self.last_frame.as_ref()
    }

    /// Completed cycles so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn suggest_players(&self, query: &str, limit: usize) -> Vec<String> {
        self.player_index()
            .map(|idx| idx.suggest(query, limit))
            .unwrap_or_default()
    }

    pub fn mean(&self, field: impl AsRef<str>) -> f64 {
        stats::mean(self.active_subset(), field.as_ref())
    }

    pub fn extent(&self, field: impl AsRef<str>, max_floor: f64) -> Extent {
        stats::extent(self.active_subset(), field.as_ref(), max_floor)
    }

    pub fn scale_max(&self, field: impl AsRef<str>, round_to: f64) -> f64 {
        stats::scale_max(self.active_subset(), field.as_ref(), round_to)
    }

    /// Equal-width histogram of `field` over the active subset.
    pub fn histogram(&self, field: impl AsRef<str>, bin_count: usize) -> Vec<Bin> {
        let values: Vec<f64> = self
            .active_subset()
            .iter()
            .filter_map(|r| r.numeric(field.as_ref()))
            .collect();
        stats::histogram(&values, bin_count)
    }

    /// Pearson r between two fields over rows of the active subset that have both.
    pub fn correlation(&self, x: impl AsRef<str>, y: impl AsRef<str>) -> Option<f64> {
        let pairs: Vec<(f64, f64)> = self
            .active_subset()
            .iter()
            .filter_map(|r| Some((r.numeric(x.as_ref())?, r.numeric(y.as_ref())?)))
            .collect();
        stats::pearson(&pairs)
    }

    pub fn symmetric_scale_max(
        &self,
        field: impl AsRef<str>,
        round_to: f64,
        fallback_if_empty: f64,
    ) -> f64 {
        stats::symmetric_scale_max(
            self.active_subset(),
            field.as_ref(),
            round_to,
            fallback_if_empty,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MetricField;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn store() -> RecordStore {
        RecordStore::from_records(vec![
            PitchRecord::new("A", 0, 0).with_metric(MetricField::BatSpeed, 70.0),
            PitchRecord::new("A", 0, 2).with_metric(MetricField::BatSpeed, 60.0),
            PitchRecord::new("B", 0, 0).with_metric(MetricField::BatSpeed, 80.0),
        ])
    }

    fn ready() -> Dashboard {
        let mut dashboard = Dashboard::new(DashboardConfig::default());
        dashboard.complete_load(Ok(store())).unwrap();
        dashboard
    }

    fn recorded(dashboard: &mut Dashboard) -> Rc<RefCell<Vec<(ResolutionTier, usize)>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        dashboard.on_render(move |frame: &RenderFrame, subset: &[&PitchRecord]| {
            sink.borrow_mut().push((frame.tier, subset.len()));
        });
        seen
    }

    #[test]
    fn test_initial_cycle_shows_league_average() {
        let dashboard = ready();
        assert!(dashboard.is_ready());
        assert_eq!(dashboard.phase(), PipelinePhase::Idle);
        assert_eq!(dashboard.cycles(), 1);
        assert_eq!(
            dashboard.resolution_tier(),
            Some(ResolutionTier::LeagueAverage)
        );
        assert_eq!(dashboard.mean(MetricField::BatSpeed), 75.0);
    }

    #[test]
    fn test_commit_and_count_change_each_run_one_cycle() {
        let mut dashboard = ready();
        let seen = recorded(&mut dashboard);

        dashboard.on_player_commit("A");
        dashboard.on_count_change(CountChoice::ZeroTwo);

        assert_eq!(
            *seen.borrow(),
            vec![
                (ResolutionTier::ExactPlayer, 1),
                (ResolutionTier::ExactPlayer, 1)
            ]
        );
        assert_eq!(dashboard.mean(MetricField::BatSpeed), 60.0);
        assert_eq!(dashboard.cycles(), 3);
    }

    #[test]
    fn test_keystrokes_only_suggest() {
        let mut dashboard = ready();
        let seen = recorded(&mut dashboard);

        assert_eq!(dashboard.on_player_input("a"), vec!["A"]);
        assert!(dashboard.on_player_input("").is_empty());
        assert!(seen.borrow().is_empty());
        assert_eq!(dashboard.cycles(), 1);
    }

    #[test]
    fn test_commits_before_load_are_queued() {
        let mut dashboard = Dashboard::new(DashboardConfig::default());
        let seen = recorded(&mut dashboard);

        dashboard.on_player_commit("B");
        dashboard.on_count_change(CountChoice::ZeroTwo);
        dashboard.on_count_change(CountChoice::ZeroZero);
        assert!(seen.borrow().is_empty());
        assert!(dashboard.active_subset().is_empty());
        assert_eq!(dashboard.mean(MetricField::BatSpeed), 0.0);
        assert!(dashboard.on_player_input("b").is_empty());

        dashboard.complete_load(Ok(store())).unwrap();
        assert_eq!(*seen.borrow(), vec![(ResolutionTier::ExactPlayer, 1)]);
        assert_eq!(dashboard.mean(MetricField::BatSpeed), 80.0);
    }

    #[test]
    fn test_failed_load_never_renders() {
        let mut dashboard = Dashboard::new(DashboardConfig::default());
        let seen = recorded(&mut dashboard);

        let err = dashboard
            .complete_load(Err(LoadError::Malformed("truncated".to_string())))
            .unwrap_err();
        assert!(matches!(err, LoadError::Malformed(_)));
        assert!(matches!(dashboard.load_state(), LoadState::Failed(_)));

        dashboard.on_player_commit("A");
        assert!(seen.borrow().is_empty());
        assert_eq!(dashboard.resolution_tier(), None);
        assert_eq!(dashboard.selection().player_query, "A");

        // A late successful load does not revive it
        dashboard.complete_load(Ok(store())).unwrap();
        assert!(!dashboard.is_ready());
        assert!(dashboard.store().is_none());
    }

    #[test]
    fn test_frame_carries_gauges_in_config_order() {
        let mut config = DashboardConfig::default();
        config.gauges = vec![MetricField::SwingPathTilt, MetricField::BatSpeed];
        let mut dashboard = Dashboard::new(config);
        dashboard.complete_load(Ok(store())).unwrap();
        dashboard.on_player_commit("B");

        let frame = dashboard.last_frame().unwrap();
        assert_eq!(frame.tier, ResolutionTier::ExactPlayer);
        assert_eq!(frame.row_count, 1);
        let fields: Vec<MetricField> = frame.gauges.iter().map(|g| g.field).collect();
        assert_eq!(fields, vec![MetricField::SwingPathTilt, MetricField::BatSpeed]);
        assert_eq!(frame.gauges[1].value, 80.0);
        assert_eq!(frame.gauges[1].max, 80.0);
        assert_eq!(frame.gauges[1].league_average, 70.0);
        assert!(frame.rates.is_none());
    }

    #[test]
    fn test_rates_attach_to_frame() {
        let mut dashboard = ready();
        let mut rates = RateTable::default();
        rates
            .insert_count(
                CountChoice::ZeroZero,
                r#"[{"name_with_stand": "A", "whiff%": 0.3}]"#,
                r#"{"whiff%": 0.25}"#,
                &crate::data::LoadOptions::default(),
            )
            .unwrap();
        dashboard.set_rates(rates);
        assert_eq!(dashboard.cycles(), 2);

        let line = dashboard.last_frame().unwrap().rates.clone().unwrap();
        assert!(line.is_league);

        dashboard.on_player_commit("A");
        let line = dashboard.last_frame().unwrap().rates.clone().unwrap();
        assert_eq!(line.label, "A");
        assert_eq!(line.formatted(crate::data::RateStat::Whiff), "30.0%");
    }

    #[test]
    fn test_exact_player_gauges_carry_percentile() {
        let mut dashboard = Dashboard::new(DashboardConfig::default());
        dashboard
            .complete_load(Ok(RecordStore::from_records(vec![
                PitchRecord::new("A", 0, 0).with_metric(MetricField::BatSpeed, 70.0),
                PitchRecord::new("B", 0, 0).with_metric(MetricField::BatSpeed, 80.0),
                PitchRecord::new("C", 0, 0).with_metric(MetricField::BatSpeed, 75.0),
                PitchRecord::new("C", 0, 2).with_metric(MetricField::BatSpeed, 99.0),
            ])))
            .unwrap();

        let speed = |d: &Dashboard| {
            d.last_frame()
                .unwrap()
                .gauges
                .iter()
                .find(|g| g.field == MetricField::BatSpeed)
                .unwrap()
                .percentile
        };
        assert_eq!(speed(&dashboard), None);

        dashboard.on_player_commit("C");
        assert_eq!(speed(&dashboard), Some(50.0));
        dashboard.on_player_commit("B");
        assert_eq!(speed(&dashboard), Some(100.0));
        dashboard.on_player_commit("A");
        assert_eq!(speed(&dashboard), Some(0.0));
    }

    #[test]
    fn test_histogram_and_correlation_over_subset() {
        let mut dashboard = Dashboard::new(DashboardConfig::default());
        dashboard
            .complete_load(Ok(RecordStore::from_records(vec![
                PitchRecord::new("A", 0, 0)
                    .with_metric(MetricField::BatSpeed, 60.0)
                    .with_metric(MetricField::AttackAngle, 5.0),
                PitchRecord::new("A", 0, 0)
                    .with_metric(MetricField::BatSpeed, 70.0)
                    .with_metric(MetricField::AttackAngle, 10.0),
                PitchRecord::new("A", 0, 0).with_metric(MetricField::BatSpeed, 80.0),
                PitchRecord::new("A", 0, 2)
                    .with_metric(MetricField::BatSpeed, 90.0)
                    .with_metric(MetricField::AttackAngle, 1.0),
            ])))
            .unwrap();
        dashboard.on_player_commit("A");

        let bins = dashboard.histogram(MetricField::BatSpeed, 2);
        assert_eq!(bins.iter().map(|b| b.count).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!((bins[0].x0, bins[1].x1), (60.0, 80.0));

        let r = dashboard
            .correlation(MetricField::BatSpeed, MetricField::AttackAngle)
            .unwrap();
        assert!((r - 1.0).abs() < 1e-9);
        assert_eq!(dashboard.correlation(MetricField::BatSpeed, "launch_speed"), None);
    }

    #[test]
    fn test_subset_queries_use_active_rows() {
        let mut dashboard = ready();
        dashboard.on_player_commit("A");
        assert_eq!(dashboard.scale_max(MetricField::BatSpeed, 10.0), 70.0);
        assert_eq!(dashboard.scale_max(MetricField::AttackAngle, 10.0), 25.0);
        assert_eq!(
            dashboard.extent(MetricField::BatSpeed, 1.0),
            Extent {
                min: 70.0,
                max: 70.0
            }
        );
        assert_eq!(
            dashboard.symmetric_scale_max(MetricField::SwingPathTilt, 10.0, 60.0),
            60.0
        );
    }
}
