//! # Kineasy fixture
//!
//! A small blocking helper for tests that talk to a kinesis compatible
//! backend, usually a local emulator such as localstack or kinesis-mock.
//!
//! It makes sure the streams a test needs exist, and reads back the oldest
//! record on the first shard of a stream so assertions can be made on it.
//! There is no retry logic: when the backend is eventually consistent the
//! test decides how long to wait.
//!
//! ## Example
//!
//! ```rust,no_run
//! use kineasy_fixture::{FixtureConfig, StreamTestFixture};
//!
//! let config = FixtureConfig::new("http://localhost:4566").stream("orders");
//! let fixture = StreamTestFixture::new(&config).expect("Cannot reach kinesis");
//!
//! fixture.put_record("orders", "order-1", &b"{\"id\":1}"[..]).expect("Cannot put record");
//!
//! let record = fixture.fetch_first_record("orders").expect("No record");
//! assert_eq!(&record.data[..], &b"{\"id\":1}"[..]);
//! ```

pub mod config;
pub mod error;
pub mod shard;
pub mod stream;

pub use config::{FixtureConfig, StaticCredentials};
pub use error::FixtureError;
pub use shard::ShardIterator;
pub use stream::StreamTestFixture;
pub use rusoto_core::Region;
pub use rusoto_kinesis::{Record, StreamDescription};
