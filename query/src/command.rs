//! Command templates and their per-shard clones.
//!
//! A [CommandTemplate] is the immutable description of one parameterized
//! operation. Fanning a logical query out across N shards means producing N
//! independent [CommandInstance]s from the same template, one per
//! connection, so that whatever parameter rewriting a shard's execution
//! performs cannot leak into a sibling's. [CommandTemplate::instantiate] is
//! that copy: same text, kind, timeout and visibility, a deep-copied
//! parameter list in identical ordinal order, and exactly one bound
//! connection.

use crate::Error;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use multishard_shardmap::ShardLocation;
use std::time::Duration;
use tracing::trace;
use uuid::Uuid;

/// Default command timeout, matching the usual client-library default.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Scalar value bound to a command parameter.
///
/// `Binary` shares its immutable buffer across copies; everything else
/// copies by value.
#[derive(Clone, Debug, PartialEq)]
pub enum ParameterValue {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Double(f64),
    Text(String),
    Binary(Bytes),
    Guid(Uuid),
    DateTime(DateTime<Utc>),
}

/// One named, ordered command parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct CommandParameter {
    /// Parameter name as referenced by the command text.
    pub name: String,
    /// Bound value.
    pub value: ParameterValue,
}

/// How the command text is interpreted by the executing layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandKind {
    /// Plain command text.
    Text,
    /// Name of a stored procedure.
    StoredProcedure,
}

/// Immutable description of a parameterized operation.
///
/// Built once, then cloned per shard target via [Self::instantiate]; never
/// mutated by this crate afterwards. The timeout is carried as metadata for
/// the executing layer, not enforced here.
#[derive(Clone, Debug, PartialEq)]
pub struct CommandTemplate {
    text: String,
    kind: CommandKind,
    timeout: Duration,
    visible: bool,
    parameters: Vec<CommandParameter>,
}

impl CommandTemplate {
    /// Creates a template for `text` with default kind, timeout and
    /// visibility and no parameters.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: CommandKind::Text,
            timeout: DEFAULT_TIMEOUT,
            visible: true,
            parameters: Vec::new(),
        }
    }

    /// Sets how the command text is interpreted.
    pub fn with_kind(mut self, kind: CommandKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the timeout carried to the executing layer.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the design-time visibility flag.
    pub fn with_visibility(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Appends a parameter. Ordinal position is append order.
    pub fn with_parameter(mut self, name: impl Into<String>, value: ParameterValue) -> Self {
        self.parameters.push(CommandParameter {
            name: name.into(),
            value,
        });
        self
    }

    /// Command text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Command kind.
    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    /// Timeout metadata.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Design-time visibility flag.
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Parameters in ordinal order.
    pub fn parameters(&self) -> &[CommandParameter] {
        &self.parameters
    }

    /// Produces an independent copy of this template bound to `connection`.
    ///
    /// The copy carries the same text, kind, timeout and visibility, and a
    /// parameter list copied by value in identical ordinal order; nothing is
    /// shared mutably with the template or with any sibling copy. A template
    /// with zero parameters clones to zero parameters. Fails with
    /// [Error::Construction] if the connection reports closed.
    pub fn instantiate<C: Connection>(&self, connection: C) -> Result<CommandInstance<C>, Error> {
        if !connection.is_open() {
            return Err(Error::Construction(format!(
                "connection to {} is closed",
                connection.location()
            )));
        }
        trace!(shard = %connection.location(), "cloned command");
        Ok(CommandInstance {
            text: self.text.clone(),
            kind: self.kind,
            timeout: self.timeout,
            visible: self.visible,
            parameters: self.parameters.clone(),
            connection,
        })
    }
}

/// One connection/transaction pair supplied by the external connection
/// layer for one shard target.
pub trait Connection: Send {
    /// Location of the shard this connection reaches.
    fn location(&self) -> &ShardLocation;

    /// Whether the connection is usable for execution.
    fn is_open(&self) -> bool;
}

/// A mutable, independently-owned copy of a [CommandTemplate] bound to one
/// connection.
///
/// Exactly one instance is used per concurrent execution; instances must
/// not be shared across concurrent executions because execution may rewrite
/// parameters in place.
#[derive(Debug)]
pub struct CommandInstance<C: Connection> {
    text: String,
    kind: CommandKind,
    timeout: Duration,
    visible: bool,
    parameters: Vec<CommandParameter>,
    connection: C,
}

impl<C: Connection> CommandInstance<C> {
    /// Command text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Command kind.
    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    /// Timeout metadata.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Design-time visibility flag.
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Parameters in ordinal order.
    pub fn parameters(&self) -> &[CommandParameter] {
        &self.parameters
    }

    /// Rebinds the parameter at `ordinal`. Returns `false` if no parameter
    /// exists at that position.
    pub fn set_parameter(&mut self, ordinal: usize, value: ParameterValue) -> bool {
        match self.parameters.get_mut(ordinal) {
            Some(parameter) => {
                parameter.value = value;
                true
            }
            None => false,
        }
    }

    /// The bound connection.
    pub fn connection(&self) -> &C {
        &self.connection
    }

    /// Location of the shard this instance executes against.
    pub fn location(&self) -> &ShardLocation {
        self.connection.location()
    }
}
