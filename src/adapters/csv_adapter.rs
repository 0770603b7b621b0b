//! CSV file data adapter.
//!
//! One file per symbol at `<dir>/<SYMBOL>.csv`. Headers are matched by name,
//! case-insensitively, either plain (`Close`) or suffixed with the symbol
//! (`Close_AAPL`) as produced by flattened multi-ticker exports. Only `Date`
//! is required; a missing column or empty cell leaves the field `None`.

use crate::domain::error::TickerlensError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use csv::StringRecord;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

pub struct CsvAdapter {
    base_path: PathBuf,
}

/// Header positions resolved for one file.
#[derive(Debug, Default)]
struct Columns {
    date: usize,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    close: Option<usize>,
    volume: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord, symbol: &str) -> Result<Self, TickerlensError> {
        let find = |name: &str| {
            let suffixed = format!("{name}_{symbol}");
            headers.iter().position(|h| {
                let h = h.trim();
                h.eq_ignore_ascii_case(name) || h.eq_ignore_ascii_case(&suffixed)
            })
        };

        let date = find("date").ok_or_else(|| TickerlensError::Data {
            reason: format!("{symbol}: missing Date column"),
        })?;

        Ok(Self {
            date,
            open: find("open"),
            high: find("high"),
            low: find("low"),
            close: find("close"),
            volume: find("volume"),
        })
    }
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{symbol}.csv"))
    }
}

fn parse_date(raw: &str, line: u64) -> Result<NaiveDate, TickerlensError> {
    let raw = raw.trim();
    // timestamps such as "2024-01-02 00:00:00" keep only the day
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| TickerlensError::Data {
        reason: format!("line {line}: invalid date '{raw}': {e}"),
    })
}

fn parse_price(
    record: &StringRecord,
    idx: Option<usize>,
    name: &str,
    line: u64,
) -> Result<Option<f64>, TickerlensError> {
    let Some(raw) = idx.and_then(|i| record.get(i)).map(str::trim) else {
        return Ok(None);
    };
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse().map(Some).map_err(|e| TickerlensError::Data {
        reason: format!("line {line}: invalid {name} value '{raw}': {e}"),
    })
}

/// 2^63: the smallest magnitude an `f64` volume cannot carry into `i64`.
const VOLUME_LIMIT: f64 = 9_223_372_036_854_775_808.0;

fn parse_volume(
    record: &StringRecord,
    idx: Option<usize>,
    line: u64,
) -> Result<Option<i64>, TickerlensError> {
    match parse_price(record, idx, "volume", line)? {
        Some(v) if v.fract() == 0.0 && v.abs() < VOLUME_LIMIT => Ok(Some(v as i64)),
        Some(v) => Err(TickerlensError::Data {
            reason: format!("line {line}: volume must be a whole number in range, got {v}"),
        }),
        None => Ok(None),
    }
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<OhlcvBar>, TickerlensError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TickerlensError::NoData {
                symbol: symbol.to_string(),
            },
            _ => TickerlensError::Io {
                path: path.display().to_string(),
                source: e,
            },
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| TickerlensError::Data {
            reason: format!("CSV header error: {}", e),
        })?;
        let columns = Columns::resolve(headers, symbol)?;

        let mut bars = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| TickerlensError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;
            // header is line 1
            let line = i as u64 + 2;

            let raw_date = record.get(columns.date).unwrap_or("");
            if raw_date.trim().is_empty() {
                continue;
            }
            let date = parse_date(raw_date, line)?;

            if start_date.is_some_and(|s| date < s) || end_date.is_some_and(|e| date > e) {
                continue;
            }

            bars.push(OhlcvBar {
                date,
                open: parse_price(&record, columns.open, "open", line)?,
                high: parse_price(&record, columns.high, "high", line)?,
                low: parse_price(&record, columns.low, "low", line)?,
                close: parse_price(&record, columns.close, "close", line)?,
                volume: parse_volume(&record, columns.volume, line)?,
            });
        }

        bars.sort_by_key(|b| b.date);
        debug!(symbol, rows = bars.len(), path = %path.display(), "loaded CSV");
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, TickerlensError> {
        let io_error = |source| TickerlensError::Io {
            path: self.base_path.display().to_string(),
            source,
        };
        let entries = fs::read_dir(&self.base_path).map_err(io_error)?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(io_error)?;

            let path = entry.path();
            let is_csv = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            if let (true, Some(stem)) = (is_csv, path.file_stem()) {
                symbols.push(stem.to_string_lossy().into_owned());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
