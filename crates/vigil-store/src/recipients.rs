//! Recipient registry — the fan-out target sets.
//!
//! Registration and subscription-tier bookkeeping live in the conversational
//! layer; this table only records who can be notified and who counts as VIP.

use chrono::Utc;

use crate::error::Result;
use crate::Store;

impl Store {
    /// Record a recipient if unseen. Existing rows keep their VIP flag.
    pub fn upsert_recipient(&self, id: i64) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO recipients (id, is_vip, joined_at) VALUES (?1, 0, ?2)
             ON CONFLICT(id) DO NOTHING",
            rusqlite::params![id, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Flip the VIP flag. Returns false when the recipient is unknown.
    pub fn set_vip(&self, id: i64, is_vip: bool) -> Result<bool> {
        let conn = self.conn();
        let n = conn.execute(
            "UPDATE recipients SET is_vip = ?2 WHERE id = ?1",
            rusqlite::params![id, is_vip],
        )?;
        Ok(n > 0)
    }

    /// Every registered chat id — the daily digest audience.
    pub fn all_recipients(&self) -> Result<Vec<i64>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT id FROM recipients ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(ids)
    }

    /// VIP chat ids — the scheduled-analysis audience.
    pub fn vip_recipients(&self) -> Result<Vec<i64>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT id FROM recipients WHERE is_vip = 1 ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use crate::Store;

    fn store() -> Store {
        Store::new(rusqlite::Connection::open_in_memory().unwrap()).unwrap()
    }

    #[test]
    fn upsert_is_idempotent_and_preserves_vip() {
        let s = store();
        s.upsert_recipient(100).unwrap();
        assert!(s.set_vip(100, true).unwrap());
        s.upsert_recipient(100).unwrap();

        assert_eq!(s.all_recipients().unwrap(), vec![100]);
        assert_eq!(s.vip_recipients().unwrap(), vec![100]);
    }

    #[test]
    fn vip_set_is_a_subset() {
        let s = store();
        for id in [1, 2, 3] {
            s.upsert_recipient(id).unwrap();
        }
        s.set_vip(2, true).unwrap();

        assert_eq!(s.all_recipients().unwrap(), vec![1, 2, 3]);
        assert_eq!(s.vip_recipients().unwrap(), vec![2]);
    }

    #[test]
    fn set_vip_on_unknown_recipient_reports_false() {
        let s = store();
        assert!(!s.set_vip(404, true).unwrap());
    }
}
