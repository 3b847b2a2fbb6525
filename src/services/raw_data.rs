//! Bulk enforcement raw-data download.

use std::path::Path;

use crate::error::SyncError;
use crate::scrapers::RawDataSource;
use crate::storage::publish_stream;

/// Default file name for the raw-data download.
pub const RAW_DATA_FILENAME: &str = "PHMSA Pipeline Enforcement Raw Data.txt";

/// Download the raw-data file to `dest`, replacing any previous copy only
/// once the new one is complete. Returns the number of bytes written.
pub async fn fetch_raw_data<R>(source: &R, dest: &Path) -> Result<u64, SyncError>
where
    R: RawDataSource + ?Sized,
{
    let body = source.open_raw_data().await?;
    let bytes = publish_stream(dest, body).await?;
    tracing::info!("Saved raw data ({} bytes) to {}", bytes, dest.display());
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use futures::stream::{self, StreamExt};

    use crate::scrapers::DocumentStream;

    struct FakeRawData(Vec<Result<Vec<u8>, String>>);

    #[async_trait]
    impl RawDataSource for FakeRawData {
        async fn open_raw_data(&self) -> Result<DocumentStream, SyncError> {
            let chunks: Vec<_> = self
                .0
                .iter()
                .cloned()
                .map(|c| c.map_err(SyncError::RemoteUnavailable))
                .collect();
            Ok(stream::iter(chunks).boxed())
        }
    }

    #[tokio::test]
    async fn test_fetch_replaces_previous_copy() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join(RAW_DATA_FILENAME);
        std::fs::write(&dest, "old").unwrap();

        let source = FakeRawData(vec![Ok(b"CPF_NUM\t".to_vec()), Ok(b"OPID\n".to_vec())]);
        let bytes = fetch_raw_data(&source, &dest).await.unwrap();

        assert_eq!(bytes, 13);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "CPF_NUM\tOPID\n");
    }

    #[tokio::test]
    async fn test_interrupted_fetch_keeps_previous_copy() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join(RAW_DATA_FILENAME);
        std::fs::write(&dest, "old").unwrap();

        let source = FakeRawData(vec![Ok(b"CPF".to_vec()), Err("timed out".to_string())]);
        assert!(fetch_raw_data(&source, &dest).await.is_err());
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "old");
    }
}
