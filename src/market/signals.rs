use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Buy,
    Sell,
    Neutral,
}

impl SignalKind {
    pub fn description(&self) -> &'static str {
        match self {
            SignalKind::Buy => "Buy signal",
            SignalKind::Sell => "Sell signal",
            SignalKind::Neutral => "Neutral",
        }
    }
}

/// A static technical-indicator reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub kind: SignalKind,
    pub indicator: String,
    pub value: f64,
    /// Percentage in 0..=100.
    pub strength: u8,
}

/// Overall recommendation shown under the signal list.
pub fn recommendation(signals: &[Signal]) -> &'static str {
    let buys = signals.iter().filter(|s| s.kind == SignalKind::Buy).count();
    let sells = signals.iter().filter(|s| s.kind == SignalKind::Sell).count();

    if buys > sells {
        "Most indicators point to a buying opportunity. RSI is in the oversold zone, MA50 shows an uptrend."
    } else if sells > buys {
        "Most indicators point to selling pressure. Consider tightening stops."
    } else {
        "Indicators are mixed. Wait for confirmation before entering a position."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(kind: SignalKind) -> Signal {
        Signal {
            kind,
            indicator: "X".to_string(),
            value: 0.0,
            strength: 50,
        }
    }

    #[test]
    fn kind_deserializes_from_lowercase() {
        let s: Signal = serde_json::from_str(
            r#"{"kind":"sell","indicator":"MACD","value":-0.45,"strength":60}"#,
        )
        .unwrap();
        assert_eq!(s.kind, SignalKind::Sell);
        assert_eq!(s.strength, 60);
    }

    #[test]
    fn recommendation_follows_majority() {
        let bullish = [signal(SignalKind::Buy), signal(SignalKind::Buy), signal(SignalKind::Sell)];
        assert!(recommendation(&bullish).starts_with("Most indicators point to a buying"));

        let bearish = [signal(SignalKind::Sell), signal(SignalKind::Neutral)];
        assert!(recommendation(&bearish).contains("selling pressure"));

        assert!(recommendation(&[]).starts_with("Indicators are mixed"));
    }
}
