use std::{env, thread, time::{Duration, Instant}};

use bytes::Bytes;
use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use serde_derive::*;

use kineasy_fixture::{FixtureConfig, FixtureError, Record, StreamTestFixture};

pub const ENDPOINT_VAR: &str = "KINESIS_ENDPOINT";

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TestOrder {
    pub id: u64,
}

/// Config for the emulator named by `KINESIS_ENDPOINT`, or localhost:4566.
pub fn local_config() -> FixtureConfig {
    match env::var(ENDPOINT_VAR) {
        Ok(endpoint) => FixtureConfig::new(&endpoint),
        Err(_) => FixtureConfig::default(),
    }
}

/// Streams outlive the fixture, so every test gets a fresh name.
pub fn unique_stream_name(prefix: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("{}-{}", prefix, suffix.to_lowercase())
}

pub fn send_test_order(
    fixture: &StreamTestFixture,
    stream: &str,
    order: &TestOrder,
) -> Result<String, FixtureError> {
    let data = Bytes::from(serde_json::to_vec(order).expect("Cannot serialize test order"));
    let out = fixture.put_record(stream, &Utc::now().to_rfc3339(), data)?;
    Ok(out.sequence_number)
}

pub fn parse_order(record: &Record) -> TestOrder {
    serde_json::from_slice(&record.data).expect("Cannot parse order json")
}

/// Polls until the emulator reports the stream ACTIVE. Creation is
/// asynchronous on most backends.
pub fn wait_until_active(
    fixture: &StreamTestFixture,
    stream: &str,
    within: Duration,
) -> Result<(), FixtureError> {
    let deadline = Instant::now() + within;

    loop {
        match fixture.describe_stream(stream) {
            Ok(d) if d.stream_status == "ACTIVE" => return Ok(()),
            Ok(_) => {}
            Err(e) if e.is_not_ready() && Instant::now() < deadline => {}
            Err(e) => return Err(e),
        }

        if Instant::now() >= deadline {
            return Err(FixtureError::Timeout { operation: "wait_until_active", timeout: within });
        }
        thread::sleep(Duration::from_millis(200));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_names_keep_prefix() {
        let a = unique_stream_name("orders");
        let b = unique_stream_name("orders");

        assert!(a.starts_with("orders-"));
        assert_eq!(a.len(), "orders-".len() + 8);
        assert_ne!(a, b);
    }

    #[test]
    fn order_payload_is_plain_json() {
        let record = Record {
            data: Bytes::from_static(b"{\"id\":1}"),
            ..Record::default()
        };
        assert_eq!(parse_order(&record), TestOrder { id: 1 });
    }
}
