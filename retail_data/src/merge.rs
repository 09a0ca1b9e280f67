//! Joining the raw sources into one frame keyed by store and date

use crate::{DataError, MarketRecord, MergedRecord, Result, SalesRecord, StoreRecord};
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::debug;

/// Left-join sales rows to market covariates on `(store, date)` and to
/// store metadata on `store`. Rows missing from either side degrade to
/// `None` fields. When both a sales row and its market row carry a holiday
/// flag, the sales row's flag wins.
///
/// The result is sorted by `(store, dept, date)`.
pub fn merge(
    sales: &[SalesRecord],
    market: &[MarketRecord],
    stores: &[StoreRecord],
) -> Result<Vec<MergedRecord>> {
    if sales.is_empty() {
        return Err(DataError::EmptyInput("no sales rows to merge".to_string()));
    }

    let market_by_key: HashMap<(u32, NaiveDate), &MarketRecord> = market
        .iter()
        .map(|row| ((row.store, row.date), row))
        .collect();
    let stores_by_id: HashMap<u32, &StoreRecord> =
        stores.iter().map(|row| (row.store, row)).collect();

    let mut merged: Vec<MergedRecord> = sales
        .iter()
        .map(|row| {
            let market_row = market_by_key.get(&(row.store, row.date)).copied();
            let store_row = stores_by_id.get(&row.store).copied();
            MergedRecord {
                store: row.store,
                dept: row.dept,
                date: row.date,
                weekly_sales: row.weekly_sales,
                is_holiday: row.is_holiday,
                store_type: store_row.map(|s| s.store_type),
                store_size: store_row.map(|s| s.size),
                temperature: market_row.and_then(|m| m.temperature),
                fuel_price: market_row.and_then(|m| m.fuel_price),
                markdowns: market_row.map(|m| m.markdowns()).unwrap_or([None; 5]),
                cpi: market_row.and_then(|m| m.cpi),
                unemployment: market_row.and_then(|m| m.unemployment),
            }
        })
        .collect();

    merged.sort_by(|a, b| {
        (a.store, a.dept, a.date).cmp(&(b.store, b.dept, b.date))
    });
    debug!(rows = merged.len(), "merged sales, market and store records");
    Ok(merged)
}
