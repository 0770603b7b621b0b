//! Data access port trait.

use crate::domain::error::TickerlensError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Daily bars for `symbol`, ascending by date. `None` bounds are open.
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<OhlcvBar>, TickerlensError>;

    fn list_symbols(&self) -> Result<Vec<String>, TickerlensError>;
}
