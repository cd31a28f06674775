use crate::error::DashboardError;
use chrono::Utc;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type AlertId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertCondition {
    Above,
    Below,
}

impl AlertCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertCondition::Above => "above",
            AlertCondition::Below => "below",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AlertCondition::Above => "Above",
            AlertCondition::Below => "Below",
        }
    }
}

impl fmt::Display for AlertCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    pub symbol: String,
    pub condition: AlertCondition,
    pub price: f64,
    pub active: bool,
}

/// The user's alert list. Alerts are only ever appended or have their
/// `active` flag flipped.
#[derive(Debug, Clone, Default)]
pub struct AlertBook {
    alerts: Vec<Alert>,
    last_id: AlertId,
}

impl AlertBook {
    /// Seed alerts with duplicate ids are dropped after the first.
    pub fn new(seed: Vec<Alert>) -> Self {
        let mut book = Self::default();
        for alert in seed {
            if book.alerts.iter().any(|a| a.id == alert.id) {
                warn!("Dropping seed alert with duplicate id {}", alert.id);
                continue;
            }
            book.last_id = book.last_id.max(alert.id);
            book.alerts.push(alert);
        }
        book
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    pub fn get(&self, id: AlertId) -> Option<&Alert> {
        self.alerts.iter().find(|a| a.id == id)
    }

    /// Flips the active flag of the alert with `id`. Returns false and
    /// leaves the list untouched when no alert matches.
    pub fn toggle(&mut self, id: AlertId) -> bool {
        match self.alerts.iter_mut().find(|a| a.id == id) {
            Some(alert) => {
                alert.active = !alert.active;
                debug!(
                    "Alert {} ({} {} {}) active={}",
                    alert.id, alert.symbol, alert.condition, alert.price, alert.active
                );
                true
            }
            None => {
                debug!("Toggle ignored, no alert with id {}", id);
                false
            }
        }
    }

    /// Appends an active "above" alert for `symbol` at the price typed in
    /// `price_input`. Empty or unparseable input leaves the list unchanged.
    pub fn add(&mut self, symbol: &str, price_input: &str) -> Result<AlertId, DashboardError> {
        let price = parse_price(price_input)?;
        let id = self.next_id();

        self.alerts.push(Alert {
            id,
            symbol: symbol.to_string(),
            condition: AlertCondition::Above,
            price,
            active: true,
        });
        info!("Alert {} added: {} above {}", id, symbol, price);
        Ok(id)
    }

    /// Wall-clock milliseconds, bumped past the last id when the clock
    /// has not advanced.
    fn next_id(&mut self) -> AlertId {
        let now = Utc::now().timestamp_millis().max(0) as AlertId;
        self.last_id = now.max(self.last_id + 1);
        self.last_id
    }
}

fn parse_price(input: &str) -> Result<f64, DashboardError> {
    let trimmed = input.trim();
    match trimmed.parse::<f64>() {
        Ok(price) if price.is_finite() => Ok(price),
        _ => Err(DashboardError::InvalidPrice(input.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn seeded() -> AlertBook {
        AlertBook::new(vec![
            Alert {
                id: 1,
                symbol: "BTC".to_string(),
                condition: AlertCondition::Above,
                price: 45000.0,
                active: true,
            },
            Alert {
                id: 2,
                symbol: "ETH".to_string(),
                condition: AlertCondition::Below,
                price: 2200.0,
                active: false,
            },
        ])
    }

    #[test]
    fn toggle_twice_restores_state() {
        let mut book = seeded();
        let before = book.alerts().to_vec();

        assert!(book.toggle(2));
        assert!(book.get(2).unwrap().active);
        assert!(book.get(1).unwrap().active);

        assert!(book.toggle(2));
        assert_eq!(book.alerts(), before.as_slice());
    }

    #[test]
    fn toggle_unknown_id_is_noop() {
        let mut book = seeded();
        let before = book.alerts().to_vec();

        assert!(!book.toggle(404));
        assert_eq!(book.alerts(), before.as_slice());
    }

    #[test]
    fn add_appends_active_above_alert() {
        let mut book = seeded();
        let id = book.add("BTC", "45000").unwrap();

        assert_eq!(book.len(), 3);
        let alert = book.alerts().last().unwrap();
        assert_eq!(alert.id, id);
        assert_eq!(alert.symbol, "BTC");
        assert_eq!(alert.condition, AlertCondition::Above);
        assert_eq!(alert.condition.as_str(), "above");
        assert_eq!(alert.price, 45000.0);
        assert!(alert.active);
    }

    #[test]
    fn add_rejects_empty_and_garbage_input() {
        let mut book = seeded();

        for input in ["", "   ", "abc", "12,5", "NaN", "inf"] {
            assert!(
                matches!(book.add("BTC", input), Err(DashboardError::InvalidPrice(_))),
                "input {:?} should be rejected",
                input
            );
        }
        assert_eq!(book.len(), 2);
    }

    #[test]
    fn add_accepts_padded_and_negative_input() {
        let mut book = AlertBook::default();
        book.add("SOL", " 98.5 ").unwrap();
        book.add("SOL", "-1").unwrap();

        assert_eq!(book.alerts()[0].price, 98.5);
        assert_eq!(book.alerts()[1].price, -1.0);
    }

    #[test]
    fn ids_stay_unique_under_rapid_adds() {
        let mut book = seeded();
        for _ in 0..200 {
            book.add("ADA", "0.5").unwrap();
        }

        let ids: HashSet<AlertId> = book.alerts().iter().map(|a| a.id).collect();
        assert_eq!(ids.len(), book.len());
    }

    #[test]
    fn duplicate_seed_ids_are_dropped() {
        let alert = Alert {
            id: 7,
            symbol: "DOT".to_string(),
            condition: AlertCondition::Below,
            price: 7.0,
            active: true,
        };
        let book = AlertBook::new(vec![alert.clone(), alert]);
        assert_eq!(book.len(), 1);
    }
}
