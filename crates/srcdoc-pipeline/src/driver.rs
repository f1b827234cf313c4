//! Pipeline driver.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use srcdoc_cache::{CacheStore, EvictionReport, Fingerprint, FingerprintInputs};
use srcdoc_extract::{Segmenter, assemble};
use srcdoc_render::{Attribute, RenderRequest, Renderer};
use tempfile::NamedTempFile;

use crate::{PipelineConfig, PipelineError};

/// Prefix of the renderer's temporary output file.
const OUTPUT_PREFIX: &str = ".srcdoc-";

/// How a run obtained its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Output was replayed from the cache.
    Hit,
    /// Output was rendered and stored in the cache.
    Miss,
    /// Caching was off or the cache root was unusable; output was rendered
    /// into a temporary file and removed after delivery.
    Disabled,
}

/// Summary of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// Where the output came from.
    pub cache: CacheStatus,
    /// Bytes copied to the output stream.
    pub bytes_written: u64,
    /// Result of cache pruning, when the cache was active.
    pub eviction: Option<EvictionReport>,
}

/// Renders source files with embedded documentation, caching the results.
pub struct Pipeline<R> {
    config: PipelineConfig,
    segmenter: Segmenter,
    attributes: Vec<Attribute>,
    renderer: R,
}

impl<R: Renderer> Pipeline<R> {
    /// Create a pipeline rendering through `renderer`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Extract`] if the delimiters cannot be compiled
    /// into a pattern.
    pub fn new(config: PipelineConfig, renderer: R) -> Result<Self, PipelineError> {
        let segmenter = Segmenter::new(&config.start, &config.end)?;
        let attributes = config
            .attributes
            .iter()
            .map(|assignment| Attribute::parse(assignment))
            .collect();
        Ok(Self {
            config,
            segmenter,
            attributes,
            renderer,
        })
    }

    /// Settings this pipeline runs with.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Produce the renderer input for `source` without rendering it.
    #[must_use]
    pub fn assemble(&self, source: &str) -> String {
        let segments = self.segmenter.segment(source);
        assemble(&segments, self.config.numbered)
    }

    /// Read all of `input`, render it and copy the result to `output`.
    ///
    /// # Errors
    ///
    /// Fails if the input cannot be read or decoded, the renderer fails, or
    /// the output cannot be written. An unusable cache is not an error: the
    /// run continues uncached.
    pub fn run(
        &self,
        input: &mut impl Read,
        output: &mut impl Write,
    ) -> Result<RunReport, PipelineError> {
        let mut source = Vec::new();
        input.read_to_end(&mut source)?;
        self.run_source(&source, output)
    }

    /// Render `source` and copy the result to `output`.
    ///
    /// # Errors
    ///
    /// See [`Pipeline::run`].
    pub fn run_source(
        &self,
        source: &[u8],
        output: &mut impl Write,
    ) -> Result<RunReport, PipelineError> {
        let Some(store) = self.open_store() else {
            let bytes_written = self.render_uncached(source, output)?;
            return Ok(RunReport {
                cache: CacheStatus::Disabled,
                bytes_written,
                eviction: None,
            });
        };

        let key = self.fingerprint(source);
        let (cache, mut rendered) = if let Some(entry) = store.open_entry(&key) {
            tracing::debug!(key = %key, "cache hit");
            (CacheStatus::Hit, entry)
        } else {
            tracing::debug!(key = %key, "cache miss");
            let fresh = self.render_to_temp(source, store.root())?;
            let handle = fresh.reopen()?;
            if let Err(e) = store.persist(&key, fresh) {
                tracing::warn!(key = %key, "failed to store rendered output: {e}");
            }
            (CacheStatus::Miss, handle)
        };

        let bytes_written = deliver(&mut rendered, output)?;
        let eviction = store.prune();

        Ok(RunReport {
            cache,
            bytes_written,
            eviction: Some(eviction),
        })
    }

    /// Open the cache store, or `None` when caching is off or unavailable.
    fn open_store(&self) -> Option<CacheStore> {
        let settings = self.config.cache.as_ref()?;
        match CacheStore::open(settings.dir.clone(), settings.max_size) {
            Ok(store) => Some(store),
            Err(e) => {
                tracing::info!("caching disabled for this run: {e}");
                None
            }
        }
    }

    fn fingerprint(&self, source: &[u8]) -> Fingerprint {
        Fingerprint::compute(&FingerprintInputs {
            source,
            attributes: &self.config.attributes,
            options: &self.config.options,
            backend: &self.config.backend,
            numbered: self.config.numbered,
            start: &self.config.start,
            end: &self.config.end,
        })
    }

    /// Render into a temporary file, deliver it and remove it.
    fn render_uncached(
        &self,
        source: &[u8],
        output: &mut impl Write,
    ) -> Result<u64, PipelineError> {
        let transient = self.render_to_temp(source, &std::env::temp_dir())?;
        let bytes_written = deliver(&mut transient.reopen()?, output)?;

        // Output is already delivered
        if let Err(e) = transient.close() {
            tracing::warn!("failed to remove temporary output: {e}");
        }
        Ok(bytes_written)
    }

    /// Render `source` into a new temporary file.
    ///
    /// The file is created in the working directory, or in `fallback` when
    /// that is not writable. It is removed when dropped, including on render
    /// failure.
    fn render_to_temp(
        &self,
        source: &[u8],
        fallback: &Path,
    ) -> Result<NamedTempFile, PipelineError> {
        let text = std::str::from_utf8(source)?;
        let mut builder = tempfile::Builder::new();
        builder.prefix(OUTPUT_PREFIX);
        let work_dir = &self.config.work_dir;
        let rendered = builder.tempfile_in(work_dir).or_else(|e| {
            tracing::debug!(
                work_dir = %work_dir.display(),
                "cannot create output in working directory: {e}"
            );
            builder.tempfile_in(fallback)
        })?;
        self.render(text, rendered.path())?;
        Ok(rendered)
    }

    fn render(&self, text: &str, destination: &Path) -> Result<(), PipelineError> {
        let assembled = self.assemble(text);
        let request = RenderRequest {
            backend: &self.config.backend,
            attributes: &self.attributes,
            options: &self.config.options,
        };
        tracing::debug!(
            start = %self.config.start,
            end = %self.config.end,
            bytes = assembled.len(),
            "rendering assembled document"
        );
        self.renderer.render(&assembled, destination, &request)?;
        Ok(())
    }
}

/// Copy rendered output to `output` verbatim.
///
/// Reads through an already open handle, so an entry evicted by another
/// process in the meantime is still delivered in full.
fn deliver(rendered: &mut File, output: &mut impl Write) -> Result<u64, PipelineError> {
    let bytes = io::copy(rendered, output)?;
    output.flush()?;
    Ok(bytes)
}
