use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::analytics::pages::Page;
use crate::config::DashboardConfig;
use crate::data::cache::DatasetCache;
use crate::data::filter::{ALL_LABEL, Selection};
use crate::data::model::Dataset;
use crate::error::ConfigurationError;
use crate::pipeline::{self, PipelineOutput, Session};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded datasets, keyed by source.
    pub cache: DatasetCache,

    /// Where the current dataset came from.
    pub source: Option<PathBuf>,

    /// Current cleaned dataset (None until a file is loaded).
    pub dataset: Option<Arc<Dataset>>,

    /// Page and filter selections.
    pub session: Session,

    /// Report for the current page and filters (cached).
    pub output: Option<PipelineOutput>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            cache: DatasetCache::new(config.cleaning.clone()),
            session: Session::new(&config),
            config,
            source: None,
            dataset: None,
            output: None,
            status_message: None,
        }
    }

    /// Load `path` through the cache and make it the current dataset.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let dataset = self.cache.get_or_load(path)?;
        self.set_dataset(path.to_path_buf(), dataset)
    }

    /// Re-read the current source from disk, bypassing the cache.
    pub fn reload(&mut self) -> Result<()> {
        let path = self.source.clone().context("no dataset loaded")?;
        let dataset = self.cache.reload(&path)?;
        self.set_dataset(path, dataset)
    }

    /// Ingest a dataset, reset filters to the wildcard and recompute. Nothing
    /// changes unless the report for the new dataset can be built.
    pub fn set_dataset(&mut self, source: PathBuf, dataset: Arc<Dataset>) -> Result<()> {
        let session = Session {
            page: self.session.page,
            ..Session::new(&self.config)
        };
        let output = pipeline::run(&dataset, &session, &self.config)
            .context("computing reports for the loaded dataset")?;

        self.session = session;
        self.source = Some(source);
        self.dataset = Some(dataset);
        self.output = Some(output);
        self.status_message = None;
        Ok(())
    }

    /// Recompute the current page's report.
    pub fn refresh(&mut self) -> Result<(), ConfigurationError> {
        let Some(ds) = &self.dataset else {
            self.output = None;
            return Ok(());
        };
        self.output = Some(pipeline::run(ds, &self.session, &self.config)?);
        Ok(())
    }

    pub fn set_page(&mut self, page: Page) {
        if self.session.page == page {
            return;
        }
        let previous = self.session.page;
        self.session.page = page;
        if let Err(e) = self.refresh() {
            log::error!("failed to build {page}: {e}");
            self.status_message = Some(format!("Error: {e}"));
            self.session.page = previous;
        }
    }

    /// Change one filter. A rejected selection leaves the previous one (and
    /// its report) in place and reports the error.
    pub fn set_filter(&mut self, column: &str, selection: Selection) {
        let previous = self
            .session
            .filters
            .insert(column.to_string(), selection);
        match self.refresh() {
            Ok(()) => self.status_message = None,
            Err(e) => {
                log::warn!("rejected filter on {column}: {e}");
                self.status_message = Some(format!("Error: {e}"));
                match previous {
                    Some(sel) => self.session.filters.insert(column.to_string(), sel),
                    None => self.session.filters.remove(column),
                };
            }
        }
    }

    /// Choices for a filter drop-down: the wildcard, then the column's values.
    pub fn filter_choices(&self, column: &str) -> Vec<String> {
        let mut choices = vec![ALL_LABEL.to_string()];
        if let Some(values) = self
            .dataset
            .as_ref()
            .and_then(|ds| ds.unique_values.get(column))
        {
            choices.extend(values.iter().map(|v| v.to_string()));
        }
        choices
    }

    pub fn visible_records(&self) -> usize {
        self.output.as_ref().map_or(0, |o| o.visible_records)
    }
}
