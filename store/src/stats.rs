//! Aggregate statistics over the whole store
//!
//! Counts are recomputed on every call; nothing is cached.

use std::collections::BTreeMap;
use tracing::debug;

use crate::db::MemoryDb;
use crate::error::Result;
use crate::types::{Area, MemoryStats, UNASSIGNED_PROJECT};

impl MemoryDb {
    /// Totals by area and by project, plus on-disk size
    ///
    /// Records without a project (absent or empty) are counted under
    /// `unassigned`. Only areas that actually occur appear in `by_area`.
    pub fn stats(&self) -> Result<MemoryStats> {
        let total: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM memories", [], |row| row.get(0))?;

        let mut by_area: BTreeMap<String, u64> = BTreeMap::new();
        let mut stmt = self
            .conn()
            .prepare("SELECT area, COUNT(*) FROM memories GROUP BY area")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, Option<String>>(0)?, row.get::<_, i64>(1)?))
        })?;
        for row in rows {
            let (area, count) = row?;
            let key = Area::from_stored(area.as_deref()).as_str().to_string();
            *by_area.entry(key).or_default() += count as u64;
        }

        let mut by_project: BTreeMap<String, u64> = BTreeMap::new();
        let mut stmt = self
            .conn()
            .prepare("SELECT project, COUNT(*) FROM memories GROUP BY project")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, Option<String>>(0)?, row.get::<_, i64>(1)?))
        })?;
        for row in rows {
            let (project, count) = row?;
            let key = match project {
                Some(p) if !p.is_empty() => p,
                _ => UNASSIGNED_PROJECT.to_string(),
            };
            *by_project.entry(key).or_default() += count as u64;
        }

        let stats = MemoryStats {
            total_memories: total as u64,
            by_area,
            by_project,
            total_size_bytes: self.size_on_disk(),
        };
        debug!(
            total = stats.total_memories,
            areas = stats.by_area.len(),
            projects = stats.by_project.len(),
            "Computed stats"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewMemory;

    #[test]
    fn test_stats_empty_store() {
        let db = MemoryDb::open_in_memory().unwrap();
        let stats = db.stats().unwrap();
        assert_eq!(stats.total_memories, 0);
        assert!(stats.by_area.is_empty());
        assert!(stats.by_project.is_empty());
        assert_eq!(stats.total_size_bytes, None);
    }

    #[test]
    fn test_stats_counts_by_area_and_project() {
        let db = MemoryDb::open_in_memory().unwrap();
        db.add(NewMemory::new("one").area(Area::Snippets).project("alpha"))
            .unwrap();
        db.add(NewMemory::new("two").area(Area::Snippets).project("alpha"))
            .unwrap();
        db.add(NewMemory::new("three").area(Area::Solutions).project("beta"))
            .unwrap();
        db.add(NewMemory::new("four")).unwrap();

        let stats = db.stats().unwrap();
        assert_eq!(stats.total_memories, 4);
        assert_eq!(stats.by_area.get("snippets"), Some(&2));
        assert_eq!(stats.by_area.get("solutions"), Some(&1));
        assert_eq!(stats.by_area.get("general"), Some(&1));
        assert_eq!(stats.by_area.get("preferences"), None);
        assert_eq!(stats.by_project.get("alpha"), Some(&2));
        assert_eq!(stats.by_project.get("beta"), Some(&1));
        assert_eq!(stats.by_project.get(UNASSIGNED_PROJECT), Some(&1));
    }

    #[test]
    fn test_stats_merges_literal_unassigned_with_missing() {
        let db = MemoryDb::open_in_memory().unwrap();
        db.add(NewMemory::new("named").project(UNASSIGNED_PROJECT))
            .unwrap();
        db.add(NewMemory::new("empty").project("")).unwrap();
        db.add(NewMemory::new("absent")).unwrap();

        let stats = db.stats().unwrap();
        assert_eq!(stats.by_project.len(), 1);
        assert_eq!(stats.by_project.get(UNASSIGNED_PROJECT), Some(&3));
    }

    #[test]
    fn test_stats_tracks_deletes() {
        let db = MemoryDb::open_in_memory().unwrap();
        let id = db.add(NewMemory::new("short lived")).unwrap();
        assert_eq!(db.stats().unwrap().total_memories, 1);

        db.delete(&id).unwrap();
        let stats = db.stats().unwrap();
        assert_eq!(stats.total_memories, 0);
        assert!(stats.by_area.is_empty());
    }
}
