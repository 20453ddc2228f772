//! Replicate a parameterized command across shards and aggregate partial
//! failures.
//!
//! Executing one logical query against many physical shards takes three
//! things from the client side: an independent copy of the command per
//! shard connection (so concurrent executions cannot interfere through
//! shared parameter state), a place to collect whatever failures the
//! fan-out produces, and a single error that surfaces those failures
//! together without pretending one caused another. [CommandTemplate] and
//! [CommandInstance] cover the first; [ShardFailure] and
//! [MultiShardAggregateError] the rest.
//!
//! Scheduling the fan-out, opening connections, and retrying are the
//! orchestrator's business. The intended shape is collect-then-construct:
//! each worker executes its own instance, returns its own [ShardFailure] on
//! error, and the collecting point builds one [MultiShardAggregateError]
//! from the ordered results. Nothing here blocks on I/O or needs locking.
//!
//! # Example
//!
//! ```rust
//! use multishard_query::{
//!     CommandTemplate, Connection, FailureKind, MultiShardAggregateError, ParameterValue,
//!     ShardFailure,
//! };
//! use multishard_shardmap::ShardLocation;
//! use std::time::Duration;
//!
//! struct Conn(ShardLocation);
//! impl Connection for Conn {
//!     fn location(&self) -> &ShardLocation {
//!         &self.0
//!     }
//!     fn is_open(&self) -> bool {
//!         true
//!     }
//! }
//!
//! let template = CommandTemplate::new("SELECT COUNT(*) FROM orders WHERE region = @region")
//!     .with_timeout(Duration::from_secs(60))
//!     .with_parameter("@region", ParameterValue::Text("emea".to_string()));
//!
//! // One independent copy per shard target.
//! let instance = template
//!     .instantiate(Conn(ShardLocation::new("server1", "db_a")))
//!     .unwrap();
//! assert_eq!(instance.parameters(), template.parameters());
//!
//! // Failures collected during the fan-out aggregate into one error.
//! let failure = ShardFailure::new(FailureKind::Timeout, "statement timed out")
//!     .with_location(ShardLocation::new("server2", "db_b"));
//! let aggregate = MultiShardAggregateError::from_failures([failure]);
//! assert_eq!(aggregate.failures().len(), 1);
//! ```

mod aggregate;
mod command;

pub use aggregate::{FailureKind, MultiShardAggregateError, ShardFailure};
pub use command::{
    CommandInstance, CommandKind, CommandParameter, CommandTemplate, Connection, ParameterValue,
    DEFAULT_TIMEOUT,
};

use thiserror::Error;

/// Errors that can occur when preparing a multi-shard execution.
#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("construction failed: {0}")]
    Construction(String),
    #[error("failure collection not provided")]
    NullInput,
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::{executor::block_on, future::join_all};
    use multishard_shardmap::ShardLocation;

    struct TestConnection {
        location: ShardLocation,
    }

    impl Connection for TestConnection {
        fn location(&self) -> &ShardLocation {
            &self.location
        }

        fn is_open(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_fan_out_collects_partial_failures() {
        let template = CommandTemplate::new("SELECT id FROM orders WHERE region = @p1")
            .with_parameter("@p1", ParameterValue::Int32(10))
            .with_parameter("@p2", ParameterValue::Text("x".to_string()));
        let targets = [
            ShardLocation::new("server1", "db_a"),
            ShardLocation::new("server2", "db_b"),
            ShardLocation::new("server3", "db_c"),
        ];

        // One clone per target.
        let instances: Vec<_> = targets
            .iter()
            .map(|location| {
                template
                    .instantiate(TestConnection {
                        location: location.clone(),
                    })
                    .unwrap()
            })
            .collect();
        assert_eq!(instances.len(), 3);

        // Concurrent execution where the second and third shard fail.
        let results = block_on(join_all(instances.into_iter().map(|instance| async move {
            if instance.location().database == "db_a" {
                Ok(())
            } else {
                Err(
                    ShardFailure::new(FailureKind::Execution, "query aborted")
                        .with_location(instance.location().clone()),
                )
            }
        })));

        // Collect-then-construct: workers returned their own failures.
        let failures: Vec<_> = results.into_iter().filter_map(Result::err).collect();
        let aggregate = MultiShardAggregateError::from_failures(failures);
        assert_eq!(aggregate.failures().len(), 2);

        let rendered = aggregate.to_string();
        assert!(rendered.contains("server2/db_b"));
        assert!(rendered.contains("server3/db_c"));
        assert!(rendered.find("server2/db_b").unwrap() < rendered.find("server3/db_c").unwrap());
    }
}
