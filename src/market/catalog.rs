use crate::error::DashboardError;
use crate::market::history::{generate_history, PricePoint};
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Asset fields as they appear in the seed document, before a price
/// history has been generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSeed {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub price: f64,
    pub change_24h: f64,
    pub volume: f64,
    pub market_cap: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub price: f64,
    pub change_24h: f64,
    pub volume: f64,
    pub market_cap: f64,
    pub price_history: Vec<PricePoint>,
}

impl Asset {
    pub fn from_seed<R: Rng + ?Sized>(seed: AssetSeed, rng: &mut R) -> Result<Self, DashboardError> {
        let price_history = generate_history(seed.price, seed.change_24h, rng)?;
        Ok(Self {
            id: seed.id,
            name: seed.name,
            symbol: seed.symbol,
            price: seed.price,
            change_24h: seed.change_24h,
            volume: seed.volume,
            market_cap: seed.market_cap,
            price_history,
        })
    }

    /// True when every field except the generated history matches.
    pub fn same_listing(&self, other: &Asset) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.symbol == other.symbol
            && self.price == other.price
            && self.change_24h == other.change_24h
            && self.volume == other.volume
            && self.market_cap == other.market_cap
    }
}

/// The fixed list of tracked assets.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    assets: Vec<Asset>,
}

impl Catalog {
    pub fn from_seeds<R: Rng + ?Sized>(
        seeds: Vec<AssetSeed>,
        rng: &mut R,
    ) -> Result<Self, DashboardError> {
        let assets = seeds
            .into_iter()
            .map(|seed| Asset::from_seed(seed, rng))
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Catalog built with {} assets", assets.len());
        Ok(Self { assets })
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Asset> {
        self.assets.get(index)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.assets.iter().position(|a| a.id == id)
    }

    /// Replaces every asset's history with a freshly generated one.
    pub fn regenerate_histories<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), DashboardError> {
        for asset in &mut self.assets {
            asset.price_history = generate_history(asset.price, asset.change_24h, rng)?;
        }
        Ok(())
    }
}
