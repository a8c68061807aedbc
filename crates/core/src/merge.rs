//! Metadata refresh between snapshots of the same collection.

use crate::Snapshot;

impl Snapshot {
    /// Carry `newer`'s metadata onto entries whose content is unchanged.
    ///
    /// Fingerprints always come from `self`. Paths only in `newer` are
    /// ignored, paths only in `self` are kept, and paths whose content differs
    /// keep `self`'s entry as is. When nothing changes the result shares the
    /// receiver's entries.
    #[must_use]
    pub fn update_from(&self, newer: &Self) -> Self {
        if self.shares_entries_with(newer) {
            return self.clone();
        }

        let mut merged = None;
        let mut refreshed = 0_usize;
        for (path, current) in self.map() {
            let Some(candidate) = newer.map().get(path) else {
                continue;
            };
            if !current.has_same_content(candidate) || current.metadata() == candidate.metadata() {
                continue;
            }
            let entries = merged.get_or_insert_with(|| self.map().clone());
            entries.insert(
                path.clone(),
                current.clone().with_metadata(*candidate.metadata()),
            );
            refreshed += 1;
        }

        match merged {
            Some(entries) => {
                tracing::debug!(entries = entries.len(), refreshed, "refreshed snapshot metadata");
                Self::from_map(entries)
            },
            None => self.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Snapshot;
    use snapdiff_domain::{EntryMetadata, EntrySnapshot, Fingerprint, PathKey};
    use std::error::Error;

    fn file(path: &str, byte: u8, mtime: u64) -> Result<EntrySnapshot, Box<dyn Error>> {
        Ok(EntrySnapshot::regular_file(
            PathKey::new(path)?,
            Fingerprint::from_digest(vec![byte])?,
        )?
        .with_metadata(EntryMetadata::file(1, mtime)))
    }

    #[test]
    fn same_content_adopts_newer_metadata() -> Result<(), Box<dyn Error>> {
        let stored = Snapshot::from_entries([file("a", 1, 10)?, file("b", 2, 10)?])?;
        let fresh = Snapshot::from_entries([file("a", 1, 20)?, file("b", 9, 20)?, file("c", 3, 20)?])?;
        let merged = stored.update_from(&fresh);

        assert_eq!(merged.get("a").map(|entry| entry.metadata().last_modified_ms), Some(Some(20)));
        assert_eq!(merged.get("b"), stored.get("b"));
        assert!(!merged.contains("c"));
        assert_eq!(merged.len(), 2);
        assert!(!merged.has_changes_since(&stored));
        Ok(())
    }

    #[test]
    fn receiver_only_paths_are_kept() -> Result<(), Box<dyn Error>> {
        let stored = Snapshot::from_entries([file("a", 1, 10)?, file("z", 2, 10)?])?;
        let fresh = Snapshot::from_entries([file("a", 1, 11)?])?;
        assert_eq!(stored.update_from(&fresh).get("z"), stored.get("z"));
        Ok(())
    }

    #[test]
    fn unchanged_merge_shares_receiver() -> Result<(), Box<dyn Error>> {
        let stored = Snapshot::from_entries([file("a", 1, 10)?])?;
        let fresh = Snapshot::from_entries([file("a", 1, 10)?, file("b", 2, 10)?])?;
        assert!(stored.update_from(&fresh).shares_entries_with(&stored));
        Ok(())
    }

    #[test]
    fn merge_does_not_touch_inputs() -> Result<(), Box<dyn Error>> {
        let stored = Snapshot::from_entries([file("a", 1, 10)?])?;
        let fresh = Snapshot::from_entries([file("a", 1, 30)?])?;
        let _merged = stored.update_from(&fresh);
        assert_eq!(stored.get("a"), Some(&file("a", 1, 10)?));
        assert_eq!(fresh.get("a"), Some(&file("a", 1, 30)?));
        Ok(())
    }
}
