#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Catalog of placeable tile types discovered from JSON files.
//!
//! Each file holds a single [`TileMeta`] object and is keyed by the object's
//! `id` field. The catalog is populated once at startup and then only read.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use gaius_core::{LookupError, MetaProvider, TileMeta};
use thiserror::Error;
use tracing::{debug, info, warn};

const CATALOG_EXTENSION: &str = "json";

/// Errors raised while populating or querying the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A directory or file could not be read.
    #[error("failed to read {path}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// A file did not contain a valid tile meta object.
    #[error("failed to parse {path}")]
    Parse {
        /// Offending file, or `<inline>` for in-memory input.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// The object parsed but violates catalog invariants.
    #[error("invalid tile meta `{id}`: {reason}")]
    Invalid {
        /// Identifier of the offending entry.
        id: String,
        /// Violated invariant.
        reason: &'static str,
    },
    /// A lookup failed.
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// Registry of tile metas keyed by identifier.
#[derive(Debug, Default)]
pub struct Catalog {
    entries: BTreeMap<String, Arc<TileMeta>>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a single JSON object into a validated entry.
    pub fn parse(raw_json: &str) -> Result<Arc<TileMeta>, CatalogError> {
        parse_at(raw_json, Path::new("<inline>"))
    }

    /// Loads every `*.json` file in `dir`, returning how many entries were discovered.
    ///
    /// Files are visited in path order; a later file reusing an identifier
    /// replaces the earlier entry.
    pub fn discover(&mut self, dir: impl AsRef<Path>) -> Result<usize, CatalogError> {
        let dir = dir.as_ref();
        let read_dir = fs::read_dir(dir).map_err(|source| CatalogError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut files = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|source| CatalogError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            let is_json = path
                .extension()
                .is_some_and(|extension| extension == CATALOG_EXTENSION);
            if is_json && path.is_file() {
                files.push(path);
            }
        }
        files.sort();

        let mut discovered = 0;
        for path in files {
            let text = fs::read_to_string(&path).map_err(|source| CatalogError::Io {
                path: path.clone(),
                source,
            })?;
            let meta = parse_at(&text, &path)?;
            debug!(id = %meta.id, path = %path.display(), "tile meta parsed");
            self.insert(meta);
            discovered += 1;
        }

        info!(dir = %dir.display(), discovered, "tile metas discovered");
        Ok(discovered)
    }

    /// Registers an entry, replacing any previous entry with the same identifier.
    pub fn insert(&mut self, meta: Arc<TileMeta>) {
        if let Some(previous) = self.entries.insert(meta.id.clone(), meta) {
            warn!(id = %previous.id, "tile meta replaced by a later definition");
        }
    }

    /// Number of registered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether no entry is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identifiers of every entry in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Every entry in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<TileMeta>> {
        self.entries.values()
    }
}

impl MetaProvider for Catalog {
    fn lookup(&self, id: &str) -> Result<Arc<TileMeta>, LookupError> {
        self.entries
            .get(id)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(id.to_owned()))
    }
}

fn parse_at(raw_json: &str, path: &Path) -> Result<Arc<TileMeta>, CatalogError> {
    let meta: TileMeta = serde_json::from_str(raw_json).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    validate(&meta)?;
    Ok(Arc::new(meta))
}

fn validate(meta: &TileMeta) -> Result<(), CatalogError> {
    let reason = if meta.id.trim().is_empty() {
        Some("identifier must not be empty")
    } else if meta.size.x() == 0 || meta.size.z() == 0 {
        Some("footprint must cover at least one cell on each axis")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(CatalogError::Invalid {
            id: meta.id.clone(),
            reason,
        }),
        None => Ok(()),
    }
}
