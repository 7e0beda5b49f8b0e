//! Compiled pipeline library

use crate::error::{Result, SdkError};
use promptbook_core::PipelineJson;
use std::collections::HashMap;
use tracing::warn;

/// A set of books compiled once and served by pipeline URL or title
///
/// Built with [`BookLibraryBuilder`](crate::BookLibraryBuilder). The library
/// owns its pipelines, there is no process-wide cache.
#[derive(Debug, Clone, Default)]
pub struct BookLibrary {
    pipelines: Vec<PipelineJson>,
    by_url: HashMap<String, usize>,
    by_title: HashMap<String, usize>,
}

impl BookLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a compiled pipeline
    ///
    /// Two pipelines may not share a URL. When titles collide, title lookup
    /// keeps returning the first pipeline.
    pub fn insert(&mut self, pipeline: PipelineJson) -> Result<()> {
        let index = self.pipelines.len();

        if let Some(url) = &pipeline.pipeline_url {
            if let Some(&first) = self.by_url.get(url) {
                return Err(SdkError::DuplicatePipelineUrl {
                    url: url.clone(),
                    first: self.pipelines[first].title.clone(),
                    second: pipeline.title.clone(),
                });
            }
            self.by_url.insert(url.clone(), index);
        }

        if self.by_title.contains_key(&pipeline.title) {
            warn!(
                "Pipeline title \"{}\" is used by multiple books, lookup by title returns the first one",
                pipeline.title
            );
        } else {
            self.by_title.insert(pipeline.title.clone(), index);
        }

        self.pipelines.push(pipeline);
        Ok(())
    }

    /// Look up a pipeline by URL, then by title
    pub fn get(&self, url_or_title: &str) -> Option<&PipelineJson> {
        self.get_by_url(url_or_title)
            .or_else(|| self.get_by_title(url_or_title))
    }

    pub fn get_by_url(&self, url: &str) -> Option<&PipelineJson> {
        self.by_url.get(url).map(|&index| &self.pipelines[index])
    }

    pub fn get_by_title(&self, title: &str) -> Option<&PipelineJson> {
        self.by_title.get(title).map(|&index| &self.pipelines[index])
    }

    /// Pipelines in the order they were added
    pub fn pipelines(&self) -> &[PipelineJson] {
        &self.pipelines
    }

    /// URLs of every pipeline that declares one, sorted
    pub fn urls(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = self.by_url.keys().map(String::as_str).collect();
        urls.sort_unstable();
        urls
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }

    /// Serialize a pipeline to its JSON wire format
    pub fn to_json(&self, url_or_title: &str) -> Option<serde_json::Result<String>> {
        self.get(url_or_title)
            .map(serde_json::to_string_pretty)
    }
}
