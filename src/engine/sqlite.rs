//! SQLite-backed pricelist-history engine.
//!
//! Auction snapshots are written by the upstream pipeline stage via
//! [`SqliteEngine::store_auctions`]. A run aggregates one snapshot into
//! per-item prices and appends them to each item's history.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{Code, Engine, Message};
use crate::tuple::RegionRealmTimestampTuple;

/// How to build a [`SqliteEngine`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub project_id: String,
    /// Database path. Use `":memory:"` for an ephemeral store.
    pub database: String,
}

/// One auction listing within a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auction {
    pub item_id: i64,
    /// Buyout for the whole stack, in copper. Zero means bid-only.
    pub buyout: i64,
    pub quantity: i64,
}

/// Aggregated prices for one item in one snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prices {
    pub min_buyout_per: i64,
    pub max_buyout_per: i64,
    pub average_buyout_per: i64,
    pub median_buyout_per: i64,
    pub volume: i64,
}

/// One point of an item's pricelist history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub timestamp: i64,
    pub prices: Prices,
}

/// Payload of a successful run.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunSummary {
    pub region: String,
    pub realm: String,
    pub timestamp: i64,
    pub item_ids: Vec<i64>,
}

pub struct SqliteEngine {
    project_id: String,
    conn: Arc<Mutex<Connection>>,
}

impl SqliteEngine {
    pub fn open(config: &EngineConfig) -> Result<Self> {
        let conn = Connection::open(&config.database)
            .with_context(|| format!("failed to open pricelist database {}", config.database))?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS auctions (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                region    TEXT NOT NULL,
                realm     TEXT NOT NULL,
                timestamp INTEGER NOT NULL,
                item_id   INTEGER NOT NULL,
                buyout    INTEGER NOT NULL,
                quantity  INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS auctions_snapshot
                ON auctions (region, realm, timestamp);
            CREATE TABLE IF NOT EXISTS pricelist_histories (
                region             TEXT NOT NULL,
                realm              TEXT NOT NULL,
                item_id            INTEGER NOT NULL,
                timestamp          INTEGER NOT NULL,
                min_buyout_per     INTEGER NOT NULL,
                max_buyout_per     INTEGER NOT NULL,
                average_buyout_per INTEGER NOT NULL,
                median_buyout_per  INTEGER NOT NULL,
                volume             INTEGER NOT NULL,
                PRIMARY KEY (region, realm, item_id, timestamp)
            );",
        )
        .context("failed to create pricelist schema")?;

        tracing::info!(
            project = %config.project_id,
            database = %config.database,
            "Opened pricelist-histories database"
        );

        Ok(Self {
            project_id: config.project_id.clone(),
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory(project_id: &str) -> Result<Self> {
        Self::open(&EngineConfig {
            project_id: project_id.to_string(),
            database: ":memory:".to_string(),
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Replace the stored snapshot for `tuple` with `auctions`.
    pub fn store_auctions(
        &self,
        tuple: &RegionRealmTimestampTuple,
        auctions: &[Auction],
    ) -> Result<()> {
        let mut conn = lock(&self.conn);
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM auctions WHERE region = ?1 AND realm = ?2 AND timestamp = ?3",
            params![tuple.region, tuple.realm, tuple.timestamp],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO auctions (region, realm, timestamp, item_id, buyout, quantity)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for auction in auctions {
                stmt.execute(params![
                    tuple.region,
                    tuple.realm,
                    tuple.timestamp,
                    auction.item_id,
                    auction.buyout,
                    auction.quantity
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Stored history for one item, oldest first.
    pub fn pricelist_history(
        &self,
        region: &str,
        realm: &str,
        item_id: i64,
    ) -> Result<Vec<HistoryPoint>> {
        let conn = lock(&self.conn);
        let mut stmt = conn.prepare(
            "SELECT timestamp, min_buyout_per, max_buyout_per, average_buyout_per,
                    median_buyout_per, volume
             FROM pricelist_histories
             WHERE region = ?1 AND realm = ?2 AND item_id = ?3
             ORDER BY timestamp ASC",
        )?;
        let points = stmt
            .query_map(params![region, realm, item_id], |row| {
                Ok(HistoryPoint {
                    timestamp: row.get(0)?,
                    prices: Prices {
                        min_buyout_per: row.get(1)?,
                        max_buyout_per: row.get(2)?,
                        average_buyout_per: row.get(3)?,
                        median_buyout_per: row.get(4)?,
                        volume: row.get(5)?,
                    },
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(points)
    }
}

/// Take the connection even if a previous holder panicked. Writes are
/// transactional, so an abandoned run leaves nothing half-written.
fn lock(conn: &Mutex<Connection>) -> MutexGuard<'_, Connection> {
    conn.lock().unwrap_or_else(|poisoned| {
        tracing::warn!("Recovering pricelist database lock from a panicked run");
        poisoned.into_inner()
    })
}

/// Aggregate and persist one snapshot. `None` when the snapshot has no auctions.
fn compute(conn: &Mutex<Connection>, tuple: &RegionRealmTimestampTuple) -> Result<Option<Vec<i64>>> {
    let auctions = load_auctions(&lock(conn), tuple)?;
    if auctions.is_empty() {
        return Ok(None);
    }

    let pricelist = aggregate(&auctions)?;

    let mut conn = lock(conn);
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO pricelist_histories (
                region, realm, item_id, timestamp, min_buyout_per, max_buyout_per,
                average_buyout_per, median_buyout_per, volume
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT (region, realm, item_id, timestamp) DO UPDATE SET
                min_buyout_per = excluded.min_buyout_per,
                max_buyout_per = excluded.max_buyout_per,
                average_buyout_per = excluded.average_buyout_per,
                median_buyout_per = excluded.median_buyout_per,
                volume = excluded.volume",
        )?;
        for (item_id, prices) in &pricelist {
            stmt.execute(params![
                tuple.region,
                tuple.realm,
                item_id,
                tuple.timestamp,
                prices.min_buyout_per,
                prices.max_buyout_per,
                prices.average_buyout_per,
                prices.median_buyout_per,
                prices.volume
            ])?;
        }
    }
    tx.commit().context("failed to persist pricelist histories")?;

    Ok(Some(pricelist.into_keys().collect()))
}

#[async_trait]
impl Engine for SqliteEngine {
    async fn run(&self, tuple: RegionRealmTimestampTuple) -> Message {
        // rusqlite blocks; keep it off the runtime workers.
        let conn = Arc::clone(&self.conn);
        let snapshot = tuple.clone();
        let computed = tokio::task::spawn_blocking(move || compute(&conn, &snapshot)).await;

        let item_ids = match computed {
            Ok(Ok(Some(item_ids))) => item_ids,
            Ok(Ok(None)) => {
                return Message::error(Code::NotFound, format!("no auctions found for {tuple}"));
            }
            Ok(Err(e)) => return Message::error(Code::GenericError, format!("{e:#}")),
            Err(e) => {
                tracing::error!(%tuple, error = %e, "Pricelist computation did not complete");
                return Message::error(
                    Code::GenericError,
                    format!("pricelist computation failed: {e}"),
                );
            }
        };

        tracing::debug!(%tuple, items = item_ids.len(), "Computed pricelist histories");

        let summary = RunSummary {
            region: tuple.region,
            realm: tuple.realm,
            timestamp: tuple.timestamp,
            item_ids,
        };
        match serde_json::to_string(&summary) {
            Ok(data) => Message::ok(data),
            Err(e) => Message::error(Code::MsgJsonParseError, e.to_string()),
        }
    }
}

fn load_auctions(conn: &Connection, tuple: &RegionRealmTimestampTuple) -> Result<Vec<Auction>> {
    let mut stmt = conn.prepare(
        "SELECT item_id, buyout, quantity FROM auctions
         WHERE region = ?1 AND realm = ?2 AND timestamp = ?3",
    )?;
    let auctions = stmt
        .query_map(params![tuple.region, tuple.realm, tuple.timestamp], |row| {
            Ok(Auction {
                item_id: row.get(0)?,
                buyout: row.get(1)?,
                quantity: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to load auctions")?;
    Ok(auctions)
}

/// Per-item prices for one snapshot, keyed by item id.
///
/// Per-unit buyouts are weighted by quantity. Bid-only listings (zero buyout)
/// add to volume but not to prices. Fails if an item's volume does not fit
/// in an `i64`.
pub fn aggregate(auctions: &[Auction]) -> Result<BTreeMap<i64, Prices>> {
    let mut by_item: BTreeMap<i64, Vec<Auction>> = BTreeMap::new();
    for auction in auctions {
        by_item.entry(auction.item_id).or_default().push(*auction);
    }

    by_item
        .into_iter()
        .map(|(item_id, listings)| {
            let prices = item_prices(&listings)
                .with_context(|| format!("failed to aggregate item {item_id}"))?;
            Ok((item_id, prices))
        })
        .collect()
}

fn item_prices(listings: &[Auction]) -> Result<Prices> {
    // Accumulate in i128: a snapshot of i64-sized listings cannot overflow it.
    let volume: i128 = listings
        .iter()
        .filter(|a| a.quantity > 0)
        .map(|a| i128::from(a.quantity))
        .sum();
    let volume = i64::try_from(volume).map_err(|_| anyhow!("volume {volume} overflows"))?;

    // (buyout per unit, quantity)
    let mut priced: Vec<(i64, i64)> = listings
        .iter()
        .filter(|a| a.buyout > 0 && a.quantity > 0)
        .map(|a| (a.buyout / a.quantity, a.quantity))
        .collect();
    if priced.is_empty() {
        return Ok(Prices {
            volume,
            ..Prices::default()
        });
    }
    priced.sort_unstable();

    let priced_quantity: i128 = priced.iter().map(|&(_, q)| i128::from(q)).sum();
    let total_buyout: i128 = priced
        .iter()
        .map(|&(per, q)| i128::from(per) * i128::from(q))
        .sum();

    let median_index = (priced_quantity - 1) / 2;
    let mut seen: i128 = 0;
    let mut median = 0;
    for &(per, quantity) in &priced {
        seen += i128::from(quantity);
        if seen > median_index {
            median = per;
            break;
        }
    }

    let average = i64::try_from(total_buyout / priced_quantity)
        .map_err(|_| anyhow!("average buyout overflows"))?;

    Ok(Prices {
        min_buyout_per: priced[0].0,
        max_buyout_per: priced[priced.len() - 1].0,
        average_buyout_per: average,
        median_buyout_per: median,
        volume,
    })
}
