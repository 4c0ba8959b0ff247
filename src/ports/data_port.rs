//! Candle source port trait.

use crate::domain::candle::Candle;
use crate::domain::error::StochtraderError;

pub trait DataPort {
    /// Complete candle history for `symbol` at `interval`, oldest first.
    fn fetch_candles(&self, symbol: &str, interval: &str) -> Result<Vec<Candle>, StochtraderError>;
}
