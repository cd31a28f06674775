use crate::error::DashboardError;
use crate::market::catalog::{Asset, AssetSeed, Catalog};
use crate::market::signals::Signal;
use crate::ui::core::alerts::{Alert, AlertBook, AlertId};
use log::{debug, info};
use rand::Rng;
use serde::Deserialize;

const DEFAULT_SEED: &str = include_str!("../../../data/catalog.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardView {
    Markets,
    Signals,
    Alerts,
}

impl DashboardView {
    pub const ALL: [DashboardView; 3] = [
        DashboardView::Markets,
        DashboardView::Signals,
        DashboardView::Alerts,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            DashboardView::Markets => "Markets",
            DashboardView::Signals => "Signals",
            DashboardView::Alerts => "Alerts",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            DashboardView::Markets => 0,
            DashboardView::Signals => 1,
            DashboardView::Alerts => 2,
        }
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Deserialize)]
struct SeedDocument {
    assets: Vec<AssetSeed>,
    #[serde(default)]
    signals: Vec<Signal>,
    #[serde(default)]
    alerts: Vec<Alert>,
}

/// Everything the dashboard shows, owned in one place and mutated only
/// through the methods below.
#[derive(Debug, Clone)]
pub struct AppState {
    catalog: Catalog,
    signals: Vec<Signal>,
    alerts: AlertBook,
    selected: usize,
    alert_cursor: usize,
    pub price_input: String,
    pub view: DashboardView,
    pub running: bool,
}

impl AppState {
    pub fn new(catalog: Catalog, signals: Vec<Signal>, alerts: AlertBook) -> Self {
        Self {
            catalog,
            signals,
            alerts,
            selected: 0,
            alert_cursor: 0,
            price_input: String::new(),
            view: DashboardView::Markets,
            running: true,
        }
    }

    /// Builds state from the bundled seed document.
    pub fn load_default<R: Rng + ?Sized>(rng: &mut R) -> Result<Self, DashboardError> {
        Self::from_seed_json(DEFAULT_SEED, rng)
    }

    pub fn from_seed_json<R: Rng + ?Sized>(json: &str, rng: &mut R) -> Result<Self, DashboardError> {
        let doc: SeedDocument = serde_json::from_str(json)?;
        let catalog = Catalog::from_seeds(doc.assets, rng)?;
        info!(
            "Loaded {} assets, {} signals, {} alerts",
            catalog.len(),
            doc.signals.len(),
            doc.alerts.len()
        );
        Ok(Self::new(catalog, doc.signals, AlertBook::new(doc.alerts)))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    pub fn alerts(&self) -> &AlertBook {
        &self.alerts
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_asset(&self) -> Option<&Asset> {
        self.catalog.get(self.selected)
    }

    pub fn select(&mut self, id: &str) -> Result<&Asset, DashboardError> {
        let index = self
            .catalog
            .position(id)
            .ok_or_else(|| DashboardError::UnknownAsset(id.to_string()))?;
        self.set_selected(index);
        self.catalog
            .get(index)
            .ok_or_else(|| DashboardError::UnknownAsset(id.to_string()))
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.catalog.len() {
            self.set_selected(self.selected + 1);
        }
    }

    pub fn select_previous(&mut self) {
        self.set_selected(self.selected.saturating_sub(1));
    }

    fn set_selected(&mut self, index: usize) {
        if index != self.selected {
            self.selected = index;
            if let Some(asset) = self.catalog.get(index) {
                debug!("Selected {} ({})", asset.symbol, asset.id);
            }
        }
    }

    pub fn alert_cursor(&self) -> usize {
        self.alert_cursor
    }

    pub fn alert_cursor_next(&mut self) {
        if self.alert_cursor + 1 < self.alerts.len() {
            self.alert_cursor += 1;
        }
    }

    pub fn alert_cursor_previous(&mut self) {
        self.alert_cursor = self.alert_cursor.saturating_sub(1);
    }

    pub fn toggle_alert(&mut self, id: AlertId) -> bool {
        self.alerts.toggle(id)
    }

    pub fn toggle_alert_at_cursor(&mut self) -> bool {
        match self.alerts.alerts().get(self.alert_cursor).map(|a| a.id) {
            Some(id) => self.toggle_alert(id),
            None => false,
        }
    }

    /// Creates an alert for the selected asset from the typed price. The
    /// input is cleared only when the alert was added.
    pub fn add_alert_for_selected(&mut self) -> Result<AlertId, DashboardError> {
        let symbol = match self.selected_asset() {
            Some(asset) => asset.symbol.clone(),
            None => return Err(DashboardError::UnknownAsset(self.selected.to_string())),
        };
        let id = self.alerts.add(&symbol, &self.price_input)?;
        self.price_input.clear();
        Ok(id)
    }

    pub fn push_input(&mut self, c: char) {
        if c.is_ascii_digit() || c == '.' || c == '-' {
            self.price_input.push(c);
        }
    }

    pub fn pop_input(&mut self) {
        self.price_input.pop();
    }

    pub fn regenerate_histories<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), DashboardError> {
        self.catalog.regenerate_histories(rng)?;
        info!("Regenerated price histories");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::history::HISTORY_LEN;
    use crate::market::signals::SignalKind;
    use crate::ui::core::alerts::AlertCondition;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn state() -> AppState {
        AppState::load_default(&mut StdRng::seed_from_u64(1)).unwrap()
    }

    #[test]
    fn bundled_seed_loads_five_assets() {
        let state = state();
        let symbols: Vec<&str> = state
            .catalog()
            .assets()
            .iter()
            .map(|a| a.symbol.as_str())
            .collect();

        assert_eq!(symbols, ["BTC", "ETH", "SOL", "ADA", "DOT"]);
        assert!(state
            .catalog()
            .assets()
            .iter()
            .all(|a| a.price_history.len() == HISTORY_LEN));
        assert_eq!(state.signals().len(), 4);
        assert_eq!(state.signals()[1].kind, SignalKind::Sell);
        assert_eq!(state.alerts().len(), 2);
        assert_eq!(state.alerts().alerts()[1].condition, AlertCondition::Below);
    }

    #[test]
    fn selection_defaults_to_first_asset() {
        let state = state();
        assert_eq!(state.selected_index(), 0);
        assert_eq!(state.selected_asset().unwrap().symbol, "BTC");
        assert_eq!(state.view, DashboardView::Markets);
    }

    #[test]
    fn select_by_id_points_at_that_record() {
        let mut state = state();
        let reference = AppState::load_default(&mut StdRng::seed_from_u64(2)).unwrap();

        for expected in reference.catalog().assets() {
            let picked = state.select(&expected.id).unwrap().clone();
            assert!(picked.same_listing(expected));
            assert!(state.selected_asset().unwrap().same_listing(expected));
        }
    }

    #[test]
    fn select_unknown_id_keeps_selection() {
        let mut state = state();
        state.select("3").unwrap();

        assert!(matches!(state.select("42"), Err(DashboardError::UnknownAsset(_))));
        assert_eq!(state.selected_asset().unwrap().symbol, "SOL");
    }

    #[test]
    fn selection_moves_within_bounds() {
        let mut state = state();
        state.select_previous();
        assert_eq!(state.selected_index(), 0);

        for _ in 0..10 {
            state.select_next();
        }
        assert_eq!(state.selected_index(), 4);
    }

    #[test]
    fn add_alert_uses_selected_symbol_and_clears_input() {
        let mut state = state();
        state.select("2").unwrap();
        for c in "2500x".chars() {
            state.push_input(c);
        }
        assert_eq!(state.price_input, "2500");

        let id = state.add_alert_for_selected().unwrap();
        let alert = state.alerts().get(id).unwrap();
        assert_eq!(alert.symbol, "ETH");
        assert_eq!(alert.price, 2500.0);
        assert!(state.price_input.is_empty());
    }

    #[test]
    fn empty_input_adds_nothing() {
        let mut state = state();
        assert!(state.add_alert_for_selected().is_err());
        assert_eq!(state.alerts().len(), 2);

        state.push_input('.');
        assert!(state.add_alert_for_selected().is_err());
        assert_eq!(state.price_input, ".");
    }

    #[test]
    fn cursor_toggle_hits_the_alert_under_cursor() {
        let mut state = state();
        state.alert_cursor_next();
        assert!(state.toggle_alert_at_cursor());
        assert!(state.alerts().get(2).unwrap().active);
        assert!(state.alerts().get(1).unwrap().active);

        state.alert_cursor_next();
        assert_eq!(state.alert_cursor(), 1);
        assert!(!state.toggle_alert(99));
    }

    #[test]
    fn views_cycle_both_ways() {
        assert_eq!(DashboardView::Markets.next(), DashboardView::Signals);
        assert_eq!(DashboardView::Alerts.next(), DashboardView::Markets);
        assert_eq!(DashboardView::Markets.previous(), DashboardView::Alerts);
    }

    #[test]
    fn malformed_seed_is_a_json_error() {
        let result = AppState::from_seed_json("{ not json", &mut StdRng::seed_from_u64(1));
        assert!(matches!(result, Err(DashboardError::JsonError(_))));
    }

    #[test]
    fn empty_catalog_has_no_selection() {
        let mut state =
            AppState::from_seed_json(r#"{"assets": []}"#, &mut StdRng::seed_from_u64(1)).unwrap();
        assert!(state.selected_asset().is_none());
        state.push_input('1');
        assert!(matches!(
            state.add_alert_for_selected(),
            Err(DashboardError::UnknownAsset(_))
        ));
    }
}
