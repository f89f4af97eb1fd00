//! Price-alert persistence.
//!
//! Alerts are created by users, read by the evaluator each sweep, and
//! mutated only by the evaluator's batched deactivation or by explicit
//! owner deletion.

use chrono::{DateTime, Utc};
use rusqlite::Row;
use tracing::info;

use crate::error::{Result, StoreError};
use crate::types::{AlertDirection, PriceAlert};
use crate::Store;

fn alert_from_row(row: &Row<'_>) -> rusqlite::Result<PriceAlert> {
    let direction: String = row.get(4)?;
    let created_at: String = row.get(7)?;
    let triggered_at: Option<String> = row.get(8)?;
    Ok(PriceAlert {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        asset: row.get(2)?,
        target_price: row.get(3)?,
        direction: direction
            .parse()
            .unwrap_or(AlertDirection::Above),
        is_active: row.get(5)?,
        is_one_time: row.get(6)?,
        created_at: parse_ts(&created_at),
        triggered_at: triggered_at.as_deref().map(parse_ts),
    })
}

fn parse_ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

const ALERT_COLUMNS: &str = "id, owner_id, asset, target_price, direction,
                             is_active, is_one_time, created_at, triggered_at";

impl Store {
    /// Register a new alert. Rejects non-positive targets and empty assets.
    pub fn add_alert(
        &self,
        owner_id: i64,
        asset: &str,
        target_price: f64,
        direction: AlertDirection,
        is_one_time: bool,
    ) -> Result<PriceAlert> {
        let asset = asset.trim().to_uppercase();
        if asset.is_empty() {
            return Err(StoreError::InvalidAlert("asset must not be empty".into()));
        }
        if !target_price.is_finite() || target_price <= 0.0 {
            return Err(StoreError::InvalidAlert(format!(
                "target price must be positive, got {target_price}"
            )));
        }

        let now = Utc::now();
        let conn = self.conn();
        conn.execute(
            "INSERT INTO price_alerts
             (owner_id, asset, target_price, direction, is_active, is_one_time, created_at)
             VALUES (?1, ?2, ?3, ?4, 1, ?5, ?6)",
            rusqlite::params![
                owner_id,
                asset,
                target_price,
                direction.to_string(),
                is_one_time,
                now.to_rfc3339(),
            ],
        )?;
        let id = conn.last_insert_rowid();
        info!(alert_id = id, owner_id, asset = %asset, %direction, "alert registered");

        Ok(PriceAlert {
            id,
            owner_id,
            asset,
            target_price,
            direction,
            is_active: true,
            is_one_time,
            created_at: now,
            triggered_at: None,
        })
    }

    /// Every alert still in the active set.
    pub fn active_alerts(&self) -> Result<Vec<PriceAlert>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ALERT_COLUMNS} FROM price_alerts WHERE is_active = 1 ORDER BY id"
        ))?;
        let alerts = stmt
            .query_map([], alert_from_row)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(alerts)
    }

    /// Distinct assets referenced by active alerts — the price-fetch set for
    /// one evaluator sweep.
    pub fn distinct_active_assets(&self) -> Result<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT DISTINCT asset FROM price_alerts WHERE is_active = 1 ORDER BY asset",
        )?;
        let assets = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(assets)
    }

    pub fn alerts_for_owner(&self, owner_id: i64, active_only: bool) -> Result<Vec<PriceAlert>> {
        let conn = self.conn();
        let sql = if active_only {
            format!(
                "SELECT {ALERT_COLUMNS} FROM price_alerts
                 WHERE owner_id = ?1 AND is_active = 1 ORDER BY created_at DESC"
            )
        } else {
            format!(
                "SELECT {ALERT_COLUMNS} FROM price_alerts
                 WHERE owner_id = ?1 ORDER BY created_at DESC"
            )
        };
        let mut stmt = conn.prepare(&sql)?;
        let alerts = stmt
            .query_map([owner_id], alert_from_row)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(alerts)
    }

    pub fn alert_by_id(&self, id: i64) -> Result<Option<PriceAlert>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ALERT_COLUMNS} FROM price_alerts WHERE id = ?1"
        ))?;
        let mut rows = stmt.query_map([id], alert_from_row)?;
        Ok(rows.next().transpose()?)
    }

    pub fn delete_alert(&self, id: i64) -> Result<()> {
        let conn = self.conn();
        let n = conn.execute("DELETE FROM price_alerts WHERE id = ?1", [id])?;
        if n == 0 {
            return Err(StoreError::AlertNotFound { id });
        }
        info!(alert_id = id, "alert deleted");
        Ok(())
    }

    /// Deactivate the given alerts in one statement, stamping `triggered_at`.
    ///
    /// The evaluator calls this once per sweep with every one-time alert that
    /// fired, after all notifications have been attempted.
    pub fn deactivate_alerts(&self, ids: &[i64]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let sql = format!(
            "UPDATE price_alerts SET is_active = 0, triggered_at = ?
             WHERE id IN ({placeholders}) AND is_active = 1"
        );

        let now = Utc::now().to_rfc3339();
        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let mut params: Vec<&dyn rusqlite::types::ToSql> = vec![&now];
        for id in ids {
            params.push(id);
        }
        let n = stmt.execute(params.as_slice())?;
        info!(count = n, "one-time alerts deactivated");
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Store {
        Store::new(rusqlite::Connection::open_in_memory().unwrap()).unwrap()
    }

    #[test]
    fn add_alert_validates_target_price() {
        let s = store();
        assert!(matches!(
            s.add_alert(1, "XAUUSD", 0.0, AlertDirection::Above, true),
            Err(StoreError::InvalidAlert(_))
        ));
        assert!(matches!(
            s.add_alert(1, "XAUUSD", -5.0, AlertDirection::Above, true),
            Err(StoreError::InvalidAlert(_))
        ));
        assert!(matches!(
            s.add_alert(1, "XAUUSD", f64::NAN, AlertDirection::Above, true),
            Err(StoreError::InvalidAlert(_))
        ));
    }

    #[test]
    fn add_alert_normalizes_asset_and_starts_active() {
        let s = store();
        let alert = s
            .add_alert(42, " xauusd ", 2300.0, AlertDirection::Above, true)
            .unwrap();
        assert_eq!(alert.asset, "XAUUSD");
        assert!(alert.is_active);
        assert!(alert.triggered_at.is_none());

        let stored = s.alert_by_id(alert.id).unwrap().unwrap();
        assert_eq!(stored.asset, "XAUUSD");
        assert_eq!(stored.owner_id, 42);
    }

    #[test]
    fn distinct_assets_ignores_inactive() {
        let s = store();
        s.add_alert(1, "XAUUSD", 2300.0, AlertDirection::Above, true)
            .unwrap();
        s.add_alert(2, "XAUUSD", 2200.0, AlertDirection::Below, false)
            .unwrap();
        let dead = s
            .add_alert(3, "EURUSD", 1.10, AlertDirection::Above, true)
            .unwrap();
        s.deactivate_alerts(&[dead.id]).unwrap();

        assert_eq!(s.distinct_active_assets().unwrap(), vec!["XAUUSD"]);
    }

    #[test]
    fn batched_deactivation_is_single_shot() {
        let s = store();
        let a = s
            .add_alert(1, "XAUUSD", 2300.0, AlertDirection::Above, true)
            .unwrap();
        let b = s
            .add_alert(2, "EURUSD", 1.10, AlertDirection::Below, true)
            .unwrap();

        assert_eq!(s.deactivate_alerts(&[a.id, b.id]).unwrap(), 2);
        // Already inactive rows are not touched again.
        assert_eq!(s.deactivate_alerts(&[a.id, b.id]).unwrap(), 0);

        let stored = s.alert_by_id(a.id).unwrap().unwrap();
        assert!(!stored.is_active);
        assert!(stored.triggered_at.is_some());
        assert!(s.active_alerts().unwrap().is_empty());
    }

    #[test]
    fn deactivate_empty_set_is_a_no_op() {
        let s = store();
        assert_eq!(s.deactivate_alerts(&[]).unwrap(), 0);
    }

    #[test]
    fn owner_listing_filters_active() {
        let s = store();
        let kept = s
            .add_alert(9, "XAUUSD", 2300.0, AlertDirection::Above, true)
            .unwrap();
        let fired = s
            .add_alert(9, "EURUSD", 1.10, AlertDirection::Below, true)
            .unwrap();
        s.deactivate_alerts(&[fired.id]).unwrap();

        let active = s.alerts_for_owner(9, true).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, kept.id);

        let all = s.alerts_for_owner(9, false).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn delete_missing_alert_is_not_found() {
        let s = store();
        assert!(matches!(
            s.delete_alert(999),
            Err(StoreError::AlertNotFound { id: 999 })
        ));
    }
}
