//! Raw file access: JSON metadata, CBOR blobs, and optional side caches.

pub mod annotation;
pub mod ordered;

use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::{zlog_debug, zlog_trace, Error, Result};

pub use annotation::{AnnotationBlob, FrameIdCache};
pub use ordered::OrderedMap;

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|source| Error::File {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    zlog_trace!("load_json path={}", path.display());
    serde_json::from_reader(open(path)?).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Like [`load_json`], but a missing file yields `None`.
pub fn try_load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        zlog_debug!("Optional file absent: {}", path.display());
        return Ok(None);
    }
    load_json(path).map(Some)
}

pub fn load_cbor<T: DeserializeOwned>(path: &Path) -> Result<T> {
    zlog_trace!("load_cbor path={}", path.display());
    ciborium::from_reader(open(path)?).map_err(|e| Error::Cbor {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Like [`load_cbor`], but a missing file yields `None`.
pub fn try_load_cbor<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        zlog_debug!("Optional file absent: {}", path.display());
        return Ok(None);
    }
    load_cbor(path).map(Some)
}
