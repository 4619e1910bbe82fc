//! offgc store: in-RAM resource index keyed by canonical identity, filled
//! sequentially from one or more list snapshots.

#![forbid(unsafe_code)]

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use metrics::{counter, histogram};
use offgc_core::{Resource, ResourceKey, ResourceList};
use rustc_hash::FxHashMap;
use tracing::debug;

/// Failure to bring one snapshot source into the index. The index is left
/// exactly as it was before the failing source.
///
/// The message names the source only; the cause is the error `source()`.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("opening {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        cause: std::io::Error,
    },
    #[error("reading {source_label}")]
    Read {
        source_label: String,
        #[source]
        cause: serde_json::Error,
    },
    #[error("parsing {source_label}")]
    Parse {
        source_label: String,
        #[source]
        cause: serde_json::Error,
    },
}

impl IngestError {
    /// Which input the error came from (file path or caller-provided label).
    pub fn source_label(&self) -> Cow<'_, str> {
        match self {
            IngestError::Open { path, .. } => path.to_string_lossy(),
            IngestError::Read { source_label, .. } | IngestError::Parse { source_label, .. } => Cow::Borrowed(source_label),
        }
    }
}

/// Resources keyed by canonical identity. At most one resource per key;
/// the last one ingested wins.
#[derive(Debug, Default)]
pub struct ResourceIndex {
    map: FxHashMap<ResourceKey, Resource>,
}

impl ResourceIndex {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.map.len() }
    pub fn is_empty(&self) -> bool { self.map.is_empty() }

    pub fn contains(&self, key: &ResourceKey) -> bool { self.map.contains_key(key) }
    pub fn get(&self, key: &ResourceKey) -> Option<&Resource> { self.map.get(key) }

    /// All indexed resources in unspecified order.
    pub fn all(&self) -> impl Iterator<Item = &Resource> + '_ { self.map.values() }

    /// Merge an already-decoded list, overwriting on key collision.
    pub fn extend(&mut self, list: ResourceList) -> usize {
        let n = list.items.len();
        for r in list.items {
            self.map.insert(r.key(), r);
        }
        n
    }

    /// Open `path` and ingest it. The handle is dropped before returning on
    /// every path.
    pub fn ingest_file(&mut self, path: &Path) -> Result<usize, IngestError> {
        let file = File::open(path).map_err(|cause| IngestError::Open { path: path.to_path_buf(), cause })?;
        self.ingest_reader(&path.display().to_string(), BufReader::new(file))
    }

    /// Decode a whole list document from `reader` and merge it. Nothing is
    /// inserted unless the complete document decodes.
    pub fn ingest_reader<R: Read>(&mut self, source_label: &str, reader: R) -> Result<usize, IngestError> {
        let started = std::time::Instant::now();
        let list: ResourceList = serde_json::from_reader(reader).map_err(|cause| {
            let source_label = source_label.to_string();
            if cause.is_io() {
                IngestError::Read { source_label, cause }
            } else {
                IngestError::Parse { source_label, cause }
            }
        })?;
        let n = self.extend(list);
        histogram!("offgc_ingest_ms", started.elapsed().as_secs_f64() * 1000.0);
        counter!("offgc_ingest_items_total", n as u64);
        debug!(source = %source_label, items = n, indexed = self.len(), "snapshot ingested");
        Ok(n)
    }
}
