use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use super::clean::{CleaningRules, clean_with_report};
use super::loader::{SourceFormat, load_bytes};
use super::model::Dataset;

/// Identity of a loaded source: where it lives and what it contained.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceKey {
    pub path: PathBuf,
    pub digest: String,
}

/// Hex SHA-256 of the source bytes.
pub fn content_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Memoised, cleaned datasets, at most one per path. Entries live until
/// [`DatasetCache::reload`] or [`DatasetCache::invalidate`] drops them, or the
/// path's content changes; there is no expiry.
#[derive(Debug, Default)]
pub struct DatasetCache {
    rules: CleaningRules,
    entries: HashMap<SourceKey, Arc<Dataset>>,
}

impl DatasetCache {
    pub fn new(rules: CleaningRules) -> Self {
        Self {
            rules,
            entries: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the cached dataset for `path`, loading and cleaning it on a miss.
    /// The dataset is parsed from the same bytes its digest was taken from.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<Dataset>> {
        let format = SourceFormat::from_path(path)?;
        let (key, bytes) = read_source(path)?;
        if let Some(ds) = self.entries.get(&key) {
            log::info!("dataset cache hit for {}", key.path.display());
            return Ok(Arc::clone(ds));
        }

        let raw = load_bytes(format, bytes)
            .with_context(|| format!("loading {}", key.path.display()))?;
        let (cleaned, report) = clean_with_report(&raw, &self.rules);
        log::info!(
            "loaded {} records from {} ({} cells cleaned)",
            cleaned.len(),
            key.path.display(),
            report.total()
        );

        // Older content of the same path can never be hit again.
        self.entries.retain(|k, _| k.path != key.path);
        let ds = Arc::new(cleaned);
        self.entries.insert(key, Arc::clone(&ds));
        Ok(ds)
    }

    /// Drop every entry for `path`, then load it again.
    pub fn reload(&mut self, path: &Path) -> Result<Arc<Dataset>> {
        self.invalidate(path);
        self.get_or_load(path)
    }

    /// Drop every entry for `path`. Unknown paths are ignored.
    pub fn invalidate(&mut self, path: &Path) {
        let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        self.entries.retain(|key, _| key.path != canonical);
    }
}

fn read_source(path: &Path) -> Result<(SourceKey, Vec<u8>)> {
    let canonical = std::fs::canonicalize(path)
        .with_context(|| format!("resolving {}", path.display()))?;
    let bytes = std::fs::read(&canonical)
        .with_context(|| format!("reading {}", canonical.display()))?;
    let key = SourceKey {
        digest: content_digest(&bytes),
        path: canonical,
    };
    Ok((key, bytes))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::data::model::{Schema, Value, columns};

    fn csv_with_rate(rate: &str) -> String {
        let header = Schema::bank_marketing()
            .iter()
            .map(|(n, _)| n)
            .collect::<Vec<_>>()
            .join(",");
        let row = format!(
            "CUS_1,January,30,25-34,Lawyer,50000,Medium,3,2,Auto Loan,{rate},0,4,1200,31,200,49,80,300,Good,Standard,Regular,High,Low"
        );
        format!("{header}\n{row}\n")
    }

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "{content}").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn digest_is_stable_and_content_sensitive() {
        assert_eq!(content_digest(b"abc"), content_digest(b"abc"));
        assert_ne!(content_digest(b"abc"), content_digest(b"abd"));
        assert_eq!(content_digest(b"").len(), 64);
    }

    #[test]
    fn second_load_is_served_from_cache() {
        let file = write_csv(&csv_with_rate("12"));
        let mut cache = DatasetCache::new(CleaningRules::default());

        let first = cache.get_or_load(file.path()).unwrap();
        let second = cache.get_or_load(file.path()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cached_dataset_is_cleaned() {
        let file = write_csv(&csv_with_rate("99"));
        let mut cache = DatasetCache::new(CleaningRules::default());
        let ds = cache.get_or_load(file.path()).unwrap();
        let rate = ds.column(columns::INTEREST_RATE).unwrap();
        assert_eq!(ds.records[0].get(rate), &Value::Number(14.0));
    }

    #[test]
    fn changed_content_replaces_the_entry() {
        let mut file = write_csv(&csv_with_rate("12"));
        let mut cache = DatasetCache::new(CleaningRules::default());
        let first = cache.get_or_load(file.path()).unwrap();

        for month in ["February", "March", "April"] {
            writeln!(file, "CUS_2,{month},40,35-44,Doctor,1,Low,1,1,Home Loan,5,0,0,0,0,0,0,0,0,Bad,Poor,New,Low,High").unwrap();
            file.flush().unwrap();
            cache.get_or_load(file.path()).unwrap();
            assert_eq!(cache.len(), 1);
        }

        let latest = cache.get_or_load(file.path()).unwrap();
        assert!(!Arc::ptr_eq(&first, &latest));
        assert_eq!(latest.len(), 4);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn entries_for_other_paths_survive_a_change() {
        let mut a = write_csv(&csv_with_rate("12"));
        let b = write_csv(&csv_with_rate("20"));
        let mut cache = DatasetCache::new(CleaningRules::default());
        let kept = cache.get_or_load(b.path()).unwrap();
        cache.get_or_load(a.path()).unwrap();

        writeln!(a, "CUS_2,March,40,35-44,Doctor,1,Low,1,1,Home Loan,5,0,0,0,0,0,0,0,0,Bad,Poor,New,Low,High").unwrap();
        a.flush().unwrap();
        cache.get_or_load(a.path()).unwrap();

        assert_eq!(cache.len(), 2);
        assert!(Arc::ptr_eq(&kept, &cache.get_or_load(b.path()).unwrap()));
    }

    #[test]
    fn unsupported_extension_is_rejected_before_caching() {
        let file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        let mut cache = DatasetCache::default();
        assert!(cache.get_or_load(file.path()).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn reload_replaces_entries_for_the_path() {
        let file = write_csv(&csv_with_rate("12"));
        let mut cache = DatasetCache::new(CleaningRules::default());
        let first = cache.get_or_load(file.path()).unwrap();
        let reloaded = cache.reload(file.path()).unwrap();
        assert!(!Arc::ptr_eq(&first, &reloaded));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn missing_source_is_an_error() {
        let mut cache = DatasetCache::default();
        assert!(cache.get_or_load(Path::new("/no/such/file.csv")).is_err());
        assert!(cache.is_empty());
    }
}
