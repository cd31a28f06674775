use crate::error::DashboardError;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of hourly samples in a generated history.
pub const HISTORY_LEN: usize = 24;

/// Noise amplitude as a fraction of the current price.
const NOISE_FACTOR: f64 = 0.02;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub time: String,
    pub price: f64,
}

/// Backs out the price 24 hours ago, assuming `change_24h` is the total
/// percentage move over the window.
pub fn start_price(price: f64, change_24h: f64) -> Result<f64, DashboardError> {
    if !price.is_finite() {
        return Err(DashboardError::InvalidPrice(price.to_string()));
    }
    if !change_24h.is_finite() || change_24h <= -100.0 {
        return Err(DashboardError::InvalidChange(change_24h));
    }
    Ok(price / (1.0 + change_24h / 100.0))
}

/// Noise-free linear path from the derived start price to `price`.
pub fn history_trend(price: f64, change_24h: f64) -> Result<[f64; HISTORY_LEN], DashboardError> {
    let start = start_price(price, change_24h)?;
    let mut trend = [0.0; HISTORY_LEN];
    for (i, slot) in trend.iter_mut().enumerate() {
        let progress = i as f64 / (HISTORY_LEN - 1) as f64;
        *slot = start + (price - start) * progress;
    }
    Ok(trend)
}

/// Builds a plausible 24 hour path ending near `price`.
///
/// Each sample is the linear trend plus uniform noise in
/// `[-0.5, 0.5) * price * 0.02`, rounded to cents. The noise source is
/// supplied by the caller so runs can be seeded.
pub fn generate_history<R: Rng + ?Sized>(
    price: f64,
    change_24h: f64,
    rng: &mut R,
) -> Result<Vec<PricePoint>, DashboardError> {
    let trend = history_trend(price, change_24h)?;
    let amplitude = price * NOISE_FACTOR;

    Ok(trend
        .iter()
        .enumerate()
        .map(|(hour, value)| {
            let noise = rng.gen_range(-0.5_f64..0.5) * amplitude;
            PricePoint {
                time: format!("{}:00", hour),
                price: round_cents(value + noise),
            }
        })
        .collect())
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn history_has_24_hourly_labels() {
        let mut rng = StdRng::seed_from_u64(7);
        let history = generate_history(43250.50, 2.45, &mut rng).unwrap();

        assert_eq!(history.len(), HISTORY_LEN);
        for (i, point) in history.iter().enumerate() {
            assert_eq!(point.time, format!("{}:00", i));
        }
        assert_eq!(history[0].time, "0:00");
        assert_eq!(history[23].time, "23:00");
    }

    #[test]
    fn trend_runs_from_start_price_to_current_price() {
        let trend = history_trend(2285.30, -1.23).unwrap();
        let expected_start = 2285.30 / (1.0 - 0.0123);

        assert!((trend[0] - expected_start).abs() < 1e-9);
        assert!((trend[HISTORY_LEN - 1] - 2285.30).abs() < 1e-9);
        assert!(trend.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn noise_stays_within_one_percent_of_price() {
        let price = 98.75;
        let trend = history_trend(price, 5.67).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let history = generate_history(price, 5.67, &mut rng).unwrap();

        let bound = price * NOISE_FACTOR / 2.0 + 0.005 + 1e-9;
        for (point, t) in history.iter().zip(trend.iter()) {
            assert!((point.price - t).abs() <= bound, "{} vs {}", point.price, t);
        }
    }

    #[test]
    fn prices_are_rounded_to_cents() {
        let mut rng = StdRng::seed_from_u64(3);
        let history = generate_history(7.34, 3.21, &mut rng).unwrap();

        for point in &history {
            let cents = point.price * 100.0;
            assert!((cents - cents.round()).abs() < 1e-6);
        }
    }

    #[test]
    fn same_seed_gives_same_history() {
        let a = generate_history(0.52, -0.85, &mut StdRng::seed_from_u64(99)).unwrap();
        let b = generate_history(0.52, -0.85, &mut StdRng::seed_from_u64(99)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn total_loss_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            generate_history(100.0, -100.0, &mut rng),
            Err(DashboardError::InvalidChange(c)) if c == -100.0
        ));
        assert!(matches!(
            history_trend(100.0, -150.0),
            Err(DashboardError::InvalidChange(_))
        ));
        assert!(matches!(
            history_trend(f64::NAN, 1.0),
            Err(DashboardError::InvalidPrice(_))
        ));
    }

    #[test]
    fn zero_change_gives_flat_trend() {
        let trend = history_trend(50.0, 0.0).unwrap();
        assert!(trend.iter().all(|&p| (p - 50.0).abs() < 1e-12));
    }
}
