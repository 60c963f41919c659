use std::time::Duration;

use rusoto_core::{request::TlsError, RusotoError};
use rusoto_kinesis::{
    CreateStreamError, DescribeStreamError, GetRecordsError,
    GetShardIteratorError, ListStreamsError, PutRecordError,
};

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("invalid endpoint: {0:?}")]
    InvalidEndpoint(String),

    #[error("invalid region: {0:?}")]
    InvalidRegion(String),

    #[error("stream name must not be empty")]
    EmptyStreamName,

    #[error("cannot build runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("cannot build http transport: {0}")]
    Transport(#[from] TlsError),

    #[error("stream not found: {0}")]
    StreamNotFound(String),

    #[error("stream name mismatch, requested {requested}, backend reported {actual}")]
    StreamNameMismatch { requested: String, actual: String },

    #[error("stream {0} has no shards")]
    EmptyShards(String),

    #[error("no shard iterator returned for {stream}/{shard}")]
    MissingShardIterator { stream: String, shard: String },

    #[error("stream {0} returned no records")]
    EmptyRecords(String),

    #[error("{operation} timed out after {timeout:?}")]
    Timeout { operation: &'static str, timeout: Duration },

    #[error("create stream failed: {0}")]
    CreateStream(#[from] RusotoError<CreateStreamError>),

    #[error("list streams failed: {0}")]
    ListStreams(#[from] RusotoError<ListStreamsError>),

    #[error("describe stream failed: {0}")]
    DescribeStream(RusotoError<DescribeStreamError>),

    #[error("get shard iterator failed: {0}")]
    GetShardIterator(#[from] RusotoError<GetShardIteratorError>),

    #[error("get records failed: {0}")]
    GetRecords(#[from] RusotoError<GetRecordsError>),

    #[error("put record failed: {0}")]
    PutRecord(#[from] RusotoError<PutRecordError>),
}

impl From<RusotoError<DescribeStreamError>> for FixtureError {
    fn from(e: RusotoError<DescribeStreamError>) -> Self {
        match e {
            RusotoError::Service(DescribeStreamError::ResourceNotFound(msg)) => {
                FixtureError::StreamNotFound(msg)
            }
            other => FixtureError::DescribeStream(other),
        }
    }
}

impl FixtureError {
    /// Configuration failures are fatal and never worth retrying.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            FixtureError::InvalidEndpoint(_)
                | FixtureError::InvalidRegion(_)
                | FixtureError::EmptyStreamName
                | FixtureError::Runtime(_)
                | FixtureError::Transport(_)
        )
    }

    /// Conditions a caller polling an eventually consistent backend may retry on.
    pub fn is_not_ready(&self) -> bool {
        matches!(
            self,
            FixtureError::StreamNotFound(_)
                | FixtureError::EmptyShards(_)
                | FixtureError::EmptyRecords(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_not_found_maps_to_stream_not_found() {
        let e: FixtureError =
            RusotoError::Service(DescribeStreamError::ResourceNotFound("orders".to_owned())).into();
        assert!(matches!(e, FixtureError::StreamNotFound(ref m) if m == "orders"));
        assert!(e.is_not_ready());
    }

    #[test]
    fn other_describe_errors_are_kept_verbatim() {
        let e: FixtureError =
            RusotoError::Service(DescribeStreamError::LimitExceeded("slow down".to_owned())).into();
        assert!(matches!(e, FixtureError::DescribeStream(_)));
        assert!(!e.is_not_ready());
        assert!(!e.is_config());
    }

    #[test]
    fn config_errors_are_classified() {
        assert!(FixtureError::InvalidEndpoint("x".to_owned()).is_config());
        assert!(FixtureError::EmptyStreamName.is_config());
        assert!(!FixtureError::EmptyRecords("orders".to_owned()).is_config());
    }

    #[test]
    fn mismatch_message_names_both_streams() {
        let e = FixtureError::StreamNameMismatch {
            requested: "orders".to_owned(),
            actual: "payments".to_owned(),
        };
        assert_eq!(
            e.to_string(),
            "stream name mismatch, requested orders, backend reported payments"
        );
    }
}
