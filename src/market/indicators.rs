use crate::error::DashboardError;
use crate::market::history::PricePoint;
use crate::market::signals::SignalKind;
use ta::{
    indicators::{BollingerBands, ExponentialMovingAverage, RelativeStrengthIndex, SimpleMovingAverage},
    Next,
};

const MA_PERIOD: usize = 12;
const RSI_PERIOD: usize = 14;
const BB_PERIOD: usize = 20;
const BB_MULTIPLIER: f64 = 2.0;

/// Indicator readings over a generated price history. These are shown
/// beside the static signal list and never feed into it.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySummary {
    pub last: f64,
    pub min: f64,
    pub max: f64,
    pub sma: f64,
    pub ema: f64,
    pub rsi: f64,
    pub bollinger_upper: f64,
    pub bollinger_lower: f64,
}

fn indicator_err<E: std::fmt::Debug>(e: E) -> DashboardError {
    DashboardError::Indicator(format!("{:?}", e))
}

impl HistorySummary {
    /// Returns `Ok(None)` for an empty history.
    pub fn from_history(history: &[PricePoint]) -> Result<Option<Self>, DashboardError> {
        let last = match history.last() {
            Some(p) => p.price,
            None => return Ok(None),
        };

        let mut sma = SimpleMovingAverage::new(MA_PERIOD).map_err(indicator_err)?;
        let mut ema = ExponentialMovingAverage::new(MA_PERIOD).map_err(indicator_err)?;
        let mut rsi = RelativeStrengthIndex::new(RSI_PERIOD).map_err(indicator_err)?;
        let mut bb = BollingerBands::new(BB_PERIOD, BB_MULTIPLIER).map_err(indicator_err)?;

        let mut summary = HistorySummary {
            last,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            sma: 0.0,
            ema: 0.0,
            rsi: 0.0,
            bollinger_upper: 0.0,
            bollinger_lower: 0.0,
        };

        for point in history {
            let p = point.price;
            summary.min = summary.min.min(p);
            summary.max = summary.max.max(p);
            summary.sma = sma.next(p);
            summary.ema = ema.next(p);
            summary.rsi = rsi.next(p);
            let band = bb.next(p);
            summary.bollinger_upper = band.upper;
            summary.bollinger_lower = band.lower;
        }

        Ok(Some(summary))
    }

    /// Rows of (indicator, reading, classification) for display.
    pub fn readings(&self) -> Vec<(&'static str, String, SignalKind)> {
        let vs_average = |avg: f64| {
            if self.last > avg {
                SignalKind::Buy
            } else if self.last < avg {
                SignalKind::Sell
            } else {
                SignalKind::Neutral
            }
        };

        let rsi_kind = if self.rsi < 30.0 {
            SignalKind::Buy
        } else if self.rsi > 70.0 {
            SignalKind::Sell
        } else {
            SignalKind::Neutral
        };

        let band_kind = if self.last < self.bollinger_lower {
            SignalKind::Buy
        } else if self.last > self.bollinger_upper {
            SignalKind::Sell
        } else {
            SignalKind::Neutral
        };

        vec![
            ("SMA (12)", format!("{:.2}", self.sma), vs_average(self.sma)),
            ("EMA (12)", format!("{:.2}", self.ema), vs_average(self.ema)),
            ("RSI (14)", format!("{:.2}", self.rsi), rsi_kind),
            (
                "Bollinger (20, 2)",
                format!("{:.2} / {:.2}", self.bollinger_lower, self.bollinger_upper),
                band_kind,
            ),
        ]
    }
}
