use std::{collections::HashSet, future::Future, time::Duration};

use bytes::Bytes;
use rusoto_core::{credential::StaticProvider, HttpClient, Region, RusotoError};
use rusoto_kinesis::{
    CreateStreamError, CreateStreamInput, DescribeStreamInput, GetRecordsInput,
    Kinesis, KinesisClient, ListStreamsInput, PutRecordInput, PutRecordOutput,
    Record, StreamDescription,
};
use tokio::runtime::{Builder, Runtime};

use crate::config::{validate_stream_name, FixtureConfig};
use crate::error::FixtureError;
use crate::shard::{first_shard, ShardIterator};

const SHARD_COUNT: i64 = 1;
const LIST_PAGE_SIZE: i64 = 100;

/// A blocking handle over a single kinesis client, used by tests to provision
/// streams and read back what was written to them.
pub struct StreamTestFixture {
    runtime: Runtime,
    client: KinesisClient,
    timeout: Duration,
    provisioned: HashSet<String>,
}

impl StreamTestFixture {
    /// Connects to `config.endpoint` with static credentials and ensures every
    /// stream in `config.streams` exists.
    pub fn new(config: &FixtureConfig) -> Result<Self, FixtureError> {
        config.validate()?;
        let runtime = runtime()?;

        let client = {
            let _guard = runtime.enter();
            let dispatcher = HttpClient::new()?;
            let credentials = StaticProvider::new(
                config.credentials.access_key.clone(),
                config.credentials.secret_key.clone(),
                config.credentials.token(),
                None,
            );
            let region = Region::Custom {
                name: config.region.clone(),
                endpoint: config.endpoint.clone(),
            };

            KinesisClient::new_with(dispatcher, credentials, region)
        };

        tracing::debug!(
            endpoint = %config.endpoint,
            region = %config.region,
            "kinesis client configured"
        );
        Self::provision(runtime, client, config)
    }

    /// Same as [`new`](Self::new) but with a client built by the caller.
    /// Only the timeout and stream names of `config` are used.
    pub fn with_client(
        client: KinesisClient,
        config: &FixtureConfig,
    ) -> Result<Self, FixtureError> {
        for name in &config.streams {
            validate_stream_name(name)?;
        }
        Self::provision(runtime()?, client, config)
    }

    fn provision(
        runtime: Runtime,
        client: KinesisClient,
        config: &FixtureConfig,
    ) -> Result<Self, FixtureError> {
        let mut fixture = StreamTestFixture {
            runtime,
            client,
            timeout: config.timeout,
            provisioned: HashSet::new(),
        };

        for name in &config.streams {
            fixture.ensure_stream(name)?;
        }

        tracing::info!(streams = fixture.provisioned.len(), "stream fixture ready");
        Ok(fixture)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Names this fixture has created or found already existing.
    pub fn provisioned(&self) -> impl Iterator<Item = &str> {
        self.provisioned.iter().map(String::as_str)
    }

    /// Creates a single shard stream, treating "already in use" as success.
    /// A name is only ever sent to the backend once per fixture.
    pub fn ensure_stream(&mut self, name: &str) -> Result<(), FixtureError> {
        validate_stream_name(name)?;
        if self.provisioned.contains(name) {
            return Ok(());
        }

        let input = CreateStreamInput {
            shard_count: SHARD_COUNT,
            stream_name: name.to_owned(),
            ..CreateStreamInput::default()
        };

        match self.call("CreateStream", self.client.create_stream(input))? {
            Ok(()) => tracing::info!(stream = name, "stream created"),
            Err(RusotoError::Service(CreateStreamError::ResourceInUse(_))) => {
                tracing::info!(stream = name, "stream already exists")
            }
            Err(e) => return Err(e.into()),
        }

        self.provisioned.insert(name.to_owned());
        Ok(())
    }

    /// Every stream name the backend knows about, following pagination.
    pub fn stream_names(&self) -> Result<Vec<String>, FixtureError> {
        let mut names: Vec<String> = Vec::new();

        loop {
            let input = ListStreamsInput {
                exclusive_start_stream_name: names.last().cloned(),
                limit: Some(LIST_PAGE_SIZE),
                ..ListStreamsInput::default()
            };
            let page = self.call("ListStreams", self.client.list_streams(input))??;
            let more = page.has_more_streams && !page.stream_names.is_empty();

            names.extend(page.stream_names);
            if !more {
                break;
            }
        }

        tracing::debug!(count = names.len(), "listed streams");
        Ok(names)
    }

    /// Exact, case sensitive lookup: `orders` does not match `orders-archive`.
    pub fn stream_exists(&self, name: &str) -> Result<bool, FixtureError> {
        Ok(self.stream_names()?.iter().any(|n| n == name))
    }

    /// Describes `name` and checks the backend answered for the same stream.
    pub fn describe_stream(&self, name: &str) -> Result<StreamDescription, FixtureError> {
        let input = DescribeStreamInput {
            stream_name: name.to_owned(),
            ..DescribeStreamInput::default()
        };
        let description = self
            .call("DescribeStream", self.client.describe_stream(input))??
            .stream_description;

        if !description.stream_name.eq_ignore_ascii_case(name) {
            return Err(FixtureError::StreamNameMismatch {
                requested: name.to_owned(),
                actual: description.stream_name,
            });
        }

        tracing::debug!(
            stream = name,
            shards = description.shards.len(),
            status = %description.stream_status,
            "described stream"
        );
        Ok(description)
    }

    pub fn shard_iterator(
        &self,
        name: &str,
        shard_id: &str,
        position: ShardIterator,
    ) -> Result<String, FixtureError> {
        let input = position.input(name, shard_id);
        let output = self.call("GetShardIterator", self.client.get_shard_iterator(input))??;

        output.shard_iterator.ok_or_else(|| FixtureError::MissingShardIterator {
            stream: name.to_owned(),
            shard: shard_id.to_owned(),
        })
    }

    /// Reads the oldest record still retained on the first shard of `name`.
    ///
    /// A single GetRecords call is made. An empty batch is reported as
    /// [`FixtureError::EmptyRecords`]; retrying is up to the caller.
    pub fn fetch_first_record(&self, name: &str) -> Result<Record, FixtureError> {
        let description = self.describe_stream(name)?;
        let shard = first_shard(&description)?;
        let iterator = self.shard_iterator(name, &shard.shard_id, ShardIterator::TrimHorizon)?;

        let input = GetRecordsInput {
            limit: None,
            shard_iterator: iterator,
        };
        let output = self.call("GetRecords", self.client.get_records(input))??;

        tracing::debug!(
            stream = name,
            shard = %shard.shard_id,
            records = output.records.len(),
            "fetched records"
        );
        output
            .records
            .into_iter()
            .next()
            .ok_or_else(|| FixtureError::EmptyRecords(name.to_owned()))
    }

    pub fn put_record<D: Into<Bytes>>(
        &self,
        name: &str,
        partition_key: &str,
        data: D,
    ) -> Result<PutRecordOutput, FixtureError> {
        let input = PutRecordInput {
            data: data.into(),
            partition_key: partition_key.to_owned(),
            stream_name: name.to_owned(),
            ..PutRecordInput::default()
        };
        let output = self.call("PutRecord", self.client.put_record(input))??;

        tracing::debug!(
            stream = name,
            shard = %output.shard_id,
            seq = %output.sequence_number,
            "put record"
        );
        Ok(output)
    }

    /// Blocks on a backend call. The outer result only carries the timeout so
    /// callers can still inspect the service error.
    fn call<T, E, F>(
        &self,
        operation: &'static str,
        request: F,
    ) -> Result<Result<T, E>, FixtureError>
    where
        F: Future<Output = Result<T, E>>,
    {
        let timeout = self.timeout;
        tracing::debug!(operation, "kinesis request");

        self.runtime.block_on(async move {
            tokio::time::timeout(timeout, request)
                .await
                .map_err(|_| FixtureError::Timeout { operation, timeout })
        })
    }
}

fn runtime() -> Result<Runtime, FixtureError> {
    Ok(Builder::new_current_thread().enable_all().build()?)
}
