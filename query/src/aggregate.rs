//! Aggregation of per-shard failures into one propagated error.
//!
//! A fan-out yields 0..N failures that are siblings, not causes of one
//! another: shard A failing does not make shard B fail. Nesting them in a
//! causal chain would lose that relationship, so [MultiShardAggregateError]
//! keeps an ordered, read-only collection of [ShardFailure] records and
//! renders them as one composite trace. The first record doubles as the
//! aggregate's own cause for chained-error introspection.

use crate::Error;
use multishard_shardmap::ShardLocation;
use std::{
    error::Error as StdError,
    fmt::{Display, Formatter},
};

const DEFAULT_MESSAGE: &str = "one or more errors occurred across shards";

/// Coarse classification of one per-shard failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// The shard's connection failed or was unusable.
    Connection,
    /// The shard rejected or aborted the execution.
    Execution,
    /// The shard did not answer within the command timeout.
    Timeout,
    /// The execution was canceled by the orchestrator.
    Canceled,
    /// Anything else.
    Other,
}

impl Display for FailureKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Self::Connection => "connection",
            Self::Execution => "execution",
            Self::Timeout => "timeout",
            Self::Canceled => "canceled",
            Self::Other => "other",
        };
        f.write_str(kind)
    }
}

/// One captured per-shard failure.
///
/// Records are append-only from the collector's perspective: a worker
/// captures exactly one per failed execution and returns it to the
/// collecting point, which then builds the aggregate.
#[derive(Debug)]
pub struct ShardFailure {
    kind: FailureKind,
    message: String,
    location: Option<ShardLocation>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl ShardFailure {
    /// Creates a failure record.
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            location: None,
            source: None,
        }
    }

    /// Attaches the originating shard, when known.
    pub fn with_location(mut self, location: ShardLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Attaches the nested cause.
    pub fn with_source(mut self, source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Classification of the failure.
    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    /// Failure message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Originating shard, when known.
    pub fn location(&self) -> Option<&ShardLocation> {
        self.location.as_ref()
    }
}

impl Display for ShardFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(location) => write!(f, "shard {location}: {}: {}", self.kind, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl StdError for ShardFailure {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn StdError + 'static))
    }
}

/// One or more failures encountered while executing a query across a shard
/// set, surfaced as a single error.
///
/// Records keep construction order; rendering enumerates every record in
/// that order with a 0-based index marker.
#[derive(Debug)]
pub struct MultiShardAggregateError {
    message: String,
    failures: Vec<ShardFailure>,
}

impl Default for MultiShardAggregateError {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiShardAggregateError {
    /// Empty aggregate with the default message.
    pub fn new() -> Self {
        Self::with_message(DEFAULT_MESSAGE)
    }

    /// Empty aggregate with a custom top-level message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            failures: Vec::new(),
        }
    }

    /// Aggregate over `failures`, default message, input order preserved.
    pub fn from_failures(failures: impl IntoIterator<Item = ShardFailure>) -> Self {
        Self::from_parts(DEFAULT_MESSAGE, failures)
    }

    /// Aggregate over `failures` with a custom top-level message.
    pub fn from_parts(
        message: impl Into<String>,
        failures: impl IntoIterator<Item = ShardFailure>,
    ) -> Self {
        Self {
            message: message.into(),
            failures: failures.into_iter().collect(),
        }
    }

    /// Bridge for callers holding an optional upstream collection: `None`
    /// fails with [Error::NullInput], an empty collection is a valid
    /// aggregate with zero records.
    pub fn from_optional(
        message: impl Into<String>,
        failures: Option<Vec<ShardFailure>>,
    ) -> Result<Self, Error> {
        match failures {
            Some(failures) => Ok(Self::from_parts(message, failures)),
            None => Err(Error::NullInput),
        }
    }

    /// Top-level message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Records in construction order.
    pub fn failures(&self) -> &[ShardFailure] {
        &self.failures
    }

    /// The first record, also exposed through [StdError::source].
    pub fn primary(&self) -> Option<&ShardFailure> {
        self.failures.first()
    }
}

// Renders a record with its full nested chain on one line.
fn render_chain(failure: &ShardFailure) -> String {
    let mut rendered = failure.to_string();
    let mut source = StdError::source(failure);
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

impl Display for MultiShardAggregateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)?;
        for (index, failure) in self.failures.iter().enumerate() {
            write!(f, "\n---> (failure #{index}) {} <---\n", render_chain(failure))?;
        }
        Ok(())
    }
}

impl StdError for MultiShardAggregateError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.primary().map(|failure| failure as &(dyn StdError + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_aggregate() {
        let aggregate = MultiShardAggregateError::new();
        assert!(aggregate.failures().is_empty());
        assert!(aggregate.primary().is_none());
        assert!(StdError::source(&aggregate).is_none());
        assert_eq!(aggregate.to_string(), DEFAULT_MESSAGE);
    }

    #[test]
    fn test_custom_message() {
        let aggregate = MultiShardAggregateError::with_message("fan-out failed");
        assert_eq!(aggregate.message(), "fan-out failed");
        assert_eq!(aggregate.to_string(), "fan-out failed");
    }

    #[test]
    fn test_from_optional() {
        let aggregate =
            MultiShardAggregateError::from_optional("fan-out failed", Some(Vec::new())).unwrap();
        assert!(aggregate.failures().is_empty());

        let result = MultiShardAggregateError::from_optional("fan-out failed", None);
        assert_eq!(result.unwrap_err(), Error::NullInput);
    }

    #[test]
    fn test_order_preserved() {
        let aggregate = MultiShardAggregateError::from_failures([
            ShardFailure::new(FailureKind::Connection, "first"),
            ShardFailure::new(FailureKind::Execution, "second"),
            ShardFailure::new(FailureKind::Timeout, "third"),
        ]);
        let messages: Vec<_> = aggregate
            .failures()
            .iter()
            .map(ShardFailure::message)
            .collect();
        assert_eq!(messages, ["first", "second", "third"]);
        assert_eq!(aggregate.primary().unwrap().message(), "first");
    }

    #[test]
    fn test_display_enumerates_in_order() {
        let aggregate = MultiShardAggregateError::from_failures([
            ShardFailure::new(FailureKind::Execution, "left half missing")
                .with_location(ShardLocation::new("server1", "db_a")),
            ShardFailure::new(FailureKind::Timeout, "right half timed out")
                .with_location(ShardLocation::new("server2", "db_b")),
        ]);
        let rendered = aggregate.to_string();
        assert!(rendered.starts_with(DEFAULT_MESSAGE));
        assert!(rendered.contains("---> (failure #0) shard server1/db_a: execution: left half missing <---"));
        assert!(rendered.contains("---> (failure #1) shard server2/db_b: timeout: right half timed out <---"));
        assert!(rendered.find("left half missing").unwrap() < rendered.find("right half timed out").unwrap());
    }

    #[test]
    fn test_nested_chain_renders() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset");
        let aggregate = MultiShardAggregateError::from_failures([ShardFailure::new(
            FailureKind::Connection,
            "could not reach shard",
        )
        .with_source(io)]);
        let rendered = aggregate.to_string();
        assert!(rendered.contains("could not reach shard: connection reset"));
    }

    #[test]
    fn test_source_is_first_failure() {
        let aggregate = MultiShardAggregateError::from_failures([
            ShardFailure::new(FailureKind::Execution, "first"),
            ShardFailure::new(FailureKind::Execution, "second"),
        ]);
        let source = StdError::source(&aggregate).unwrap();
        assert_eq!(source.to_string(), "execution: first");
    }
}
