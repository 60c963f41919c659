use rusoto_kinesis::{GetShardIteratorInput, Shard, StreamDescription};

use crate::error::FixtureError;

/// Where a shard iterator starts reading.
#[derive(Clone, Debug, PartialEq)]
pub enum ShardIterator {
    TrimHorizon,
    Latest,
    AtSequenceNumber(String),
    AfterSequenceNumber(String),
    /// Seconds since the epoch.
    AtTimestamp(f64),
}

impl ShardIterator {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShardIterator::TrimHorizon => "TRIM_HORIZON",
            ShardIterator::Latest => "LATEST",
            ShardIterator::AtSequenceNumber(_) => "AT_SEQUENCE_NUMBER",
            ShardIterator::AfterSequenceNumber(_) => "AFTER_SEQUENCE_NUMBER",
            ShardIterator::AtTimestamp(_) => "AT_TIMESTAMP",
        }
    }

    pub(crate) fn input(&self, stream: &str, shard_id: &str) -> GetShardIteratorInput {
        let (starting_sequence_number, timestamp) = match self {
            ShardIterator::AtSequenceNumber(seq) | ShardIterator::AfterSequenceNumber(seq) => {
                (Some(seq.clone()), None)
            }
            ShardIterator::AtTimestamp(ts) => (None, Some(*ts)),
            _ => (None, None),
        };

        GetShardIteratorInput {
            shard_id: shard_id.to_owned(),
            shard_iterator_type: self.as_str().to_owned(),
            starting_sequence_number,
            stream_name: stream.to_owned(),
            timestamp,
        }
    }
}

/// The fixture only ever reads the first shard; shard splits and merges are
/// not followed.
pub fn first_shard(description: &StreamDescription) -> Result<&Shard, FixtureError> {
    description
        .shards
        .first()
        .ok_or_else(|| FixtureError::EmptyShards(description.stream_name.clone()))
}
