use std::io;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("truncated snapshot stream: {0}")]
    TruncatedStream(String),

    #[error("malformed snapshot value: {0}")]
    MalformedValue(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("snapshot version mismatch: expected {expected}, got {got}")]
    VersionMismatch { expected: u32, got: u32 },

    #[error("snapshot registry mismatch: expected fingerprint {expected:#018x}, found {found:#018x}")]
    RegistryMismatch { expected: u64, found: u64 },

    #[error("corrupt snapshot: {0}")]
    Corrupt(String),
}

impl From<bincode::Error> for PersistenceError {
    fn from(e: bincode::Error) -> Self {
        match *e {
            bincode::ErrorKind::Io(ref io_err) if io_err.kind() == io::ErrorKind::UnexpectedEof => {
                PersistenceError::TruncatedStream(e.to_string())
            }
            _ => PersistenceError::MalformedValue(e.to_string()),
        }
    }
}

impl From<postcard::Error> for PersistenceError {
    fn from(e: postcard::Error) -> Self {
        match e {
            postcard::Error::DeserializeUnexpectedEnd => {
                PersistenceError::TruncatedStream(e.to_string())
            }
            _ => PersistenceError::MalformedValue(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(e: serde_json::Error) -> Self {
        match e.classify() {
            serde_json::error::Category::Eof => PersistenceError::TruncatedStream(e.to_string()),
            serde_json::error::Category::Io => PersistenceError::Io(e.into()),
            _ => PersistenceError::MalformedValue(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bincode_eof_is_truncation() {
        let err = bincode::deserialize::<u64>(&[1, 2, 3]).unwrap_err();
        assert!(matches!(
            PersistenceError::from(err),
            PersistenceError::TruncatedStream(_)
        ));
    }

    #[test]
    fn bincode_bad_bool_is_malformed() {
        let err = bincode::deserialize::<bool>(&[7]).unwrap_err();
        assert!(matches!(
            PersistenceError::from(err),
            PersistenceError::MalformedValue(_)
        ));
    }

    #[test]
    fn postcard_end_is_truncation() {
        let err = postcard::from_bytes::<u32>(&[]).unwrap_err();
        assert!(matches!(
            PersistenceError::from(err),
            PersistenceError::TruncatedStream(_)
        ));
    }

    #[test]
    fn json_eof_is_truncation_and_syntax_is_malformed() {
        let eof = serde_json::from_str::<Vec<u32>>("[1, 2").unwrap_err();
        assert!(matches!(
            PersistenceError::from(eof),
            PersistenceError::TruncatedStream(_)
        ));

        let data = serde_json::from_str::<Vec<u32>>("[\"x\"]").unwrap_err();
        assert!(matches!(
            PersistenceError::from(data),
            PersistenceError::MalformedValue(_)
        ));
    }
}
