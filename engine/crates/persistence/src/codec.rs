//! Encoding of snapshots through bincode, postcard or serde_json.
//!
//! Every stream starts with a [`SnapshotHeader`] carrying the format version
//! and the registry fingerprint. Binary formats write the header and the
//! snapshot body as two consecutive values; JSON writes a single
//! `{ "header": .., "snapshot": .. }` document.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::registry::{ComponentList, ContextList};
use crate::snapshot::{Snapshot, SNAPSHOT_VERSION};

/// Backend used to turn a snapshot into bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// bincode, fixed-width little-endian.
    #[default]
    Binary,
    /// postcard, varint-packed.
    Compact,
    /// serde_json, pretty-printed.
    Json,
}

impl Format {
    pub fn extension(self) -> &'static str {
        match self {
            Format::Binary => "bin",
            Format::Compact => "pc",
            Format::Json => "json",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Binary => "binary",
            Format::Compact => "compact",
            Format::Json => "json",
        };
        f.write_str(name)
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "binary" | "bin" | "bincode" => Ok(Format::Binary),
            "compact" | "postcard" => Ok(Format::Compact),
            "json" => Ok(Format::Json),
            other => Err(format!(
                "unknown snapshot format '{other}' (expected binary, compact or json)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub version: u32,
    pub fingerprint: u64,
}

impl SnapshotHeader {
    pub fn for_snapshot<C: ComponentList, X: ContextList>() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            fingerprint: Snapshot::<C, X>::fingerprint(),
        }
    }

    /// Reject headers written by another format version or another registry.
    pub fn check<C: ComponentList, X: ContextList>(&self) -> Result<(), PersistenceError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(PersistenceError::VersionMismatch {
                expected: SNAPSHOT_VERSION,
                got: self.version,
            });
        }
        let expected = Snapshot::<C, X>::fingerprint();
        if self.fingerprint != expected {
            return Err(PersistenceError::RegistryMismatch {
                expected,
                found: self.fingerprint,
            });
        }
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(bound = "")]
struct JsonDocumentRef<'a, C: ComponentList, X: ContextList> {
    header: SnapshotHeader,
    snapshot: &'a Snapshot<C, X>,
}

#[derive(Deserialize)]
struct JsonHeaderProbe {
    header: SnapshotHeader,
}

#[derive(Deserialize)]
#[serde(bound = "")]
struct JsonDocument<C: ComponentList, X: ContextList> {
    snapshot: Snapshot<C, X>,
}

fn serialization_error(e: impl fmt::Display) -> PersistenceError {
    PersistenceError::Serialization(e.to_string())
}

/// Encode `snapshot` with its header.
pub fn encode<C: ComponentList, X: ContextList>(
    snapshot: &Snapshot<C, X>,
    format: Format,
) -> Result<Vec<u8>, PersistenceError> {
    let header = SnapshotHeader::for_snapshot::<C, X>();
    let bytes = match format {
        Format::Binary => {
            let mut buf = Vec::new();
            bincode::serialize_into(&mut buf, &header).map_err(serialization_error)?;
            bincode::serialize_into(&mut buf, snapshot).map_err(serialization_error)?;
            buf
        }
        Format::Compact => {
            let mut buf = postcard::to_allocvec(&header).map_err(serialization_error)?;
            buf.extend(postcard::to_allocvec(snapshot).map_err(serialization_error)?);
            buf
        }
        Format::Json => {
            let buf = serde_json::to_vec_pretty(&JsonDocumentRef { header, snapshot })
                .map_err(serialization_error)?;
            // serde_json writes NaN and infinities as null, which cannot be read back.
            serde_json::from_slice::<JsonDocument<C, X>>(&buf).map_err(|e| {
                PersistenceError::Serialization(format!("value not representable in JSON: {e}"))
            })?;
            buf
        }
    };
    tracing::debug!(%format, bytes = bytes.len(), "Snapshot encoded");
    Ok(bytes)
}

/// Decode a snapshot written by [`encode`] with the same type lists.
///
/// The header is checked before the body is read.
pub fn decode<C: ComponentList, X: ContextList>(
    bytes: &[u8],
    format: Format,
) -> Result<Snapshot<C, X>, PersistenceError> {
    let snapshot = match format {
        Format::Binary => {
            let mut reader = bytes;
            let header: SnapshotHeader = bincode::deserialize_from(&mut reader)?;
            header.check::<C, X>()?;
            bincode::deserialize(reader)?
        }
        Format::Compact => {
            let (header, rest) = postcard::take_from_bytes::<SnapshotHeader>(bytes)?;
            header.check::<C, X>()?;
            postcard::from_bytes(rest)?
        }
        Format::Json => {
            let probe: JsonHeaderProbe = serde_json::from_slice(bytes)?;
            probe.header.check::<C, X>()?;
            let document: JsonDocument<C, X> = serde_json::from_slice(bytes)?;
            document.snapshot
        }
    };
    tracing::debug!(%format, bytes = bytes.len(), "Snapshot decoded");
    Ok(snapshot)
}
