use std::fmt;

use crate::output::Edge;

pub type Result<T, E = ShellError> = std::result::Result<T, E>;

/// Wire error codes of the shell interface.
pub const ERROR_INVALID_ARGUMENT: u32 = 0;
pub const ERROR_BACKGROUND_EXISTS: u32 = 1;

#[derive(Debug)]
pub enum ShellError {
    /// The surface already carries a role; roles are assigned once.
    RoleAlreadyAssigned { app_id: Option<String> },
    BackgroundExists { output: String },
    PanelExists { output: String, edge: Edge },
    InvalidEdge(u32),
    InvalidRole(u32),
    /// The request named a surface the shell does not know about.
    InvalidSurface,
    UnknownOutput(String),
    ShellAlreadyBound,
    /// A client answered a resize handshake with the wrong geometry.
    GeometryViolation {
        app_id: Option<String>,
        expected: (i32, i32),
        got: (i32, i32),
    },
    Config(String),
    EventLoop(String),
    Io(std::io::Error),
}

impl ShellError {
    /// The error code posted to the requesting client, if this error is a
    /// protocol-level rejection.
    pub fn protocol_code(&self) -> Option<u32> {
        match self {
            ShellError::RoleAlreadyAssigned { .. }
            | ShellError::InvalidEdge(_)
            | ShellError::InvalidRole(_)
            | ShellError::InvalidSurface
            | ShellError::UnknownOutput(_)
            | ShellError::ShellAlreadyBound => Some(ERROR_INVALID_ARGUMENT),
            ShellError::BackgroundExists { .. } | ShellError::PanelExists { .. } => {
                Some(ERROR_BACKGROUND_EXISTS)
            }
            ShellError::GeometryViolation { .. }
            | ShellError::Config(_)
            | ShellError::EventLoop(_)
            | ShellError::Io(_) => None,
        }
    }

    /// Whether the offending client connection has to be terminated.
    pub fn is_client_fatal(&self) -> bool {
        matches!(self, ShellError::GeometryViolation { .. })
    }
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellError::RoleAlreadyAssigned { app_id } => write!(
                f,
                "surface {} already has another role",
                app_id.as_deref().unwrap_or("<no app id>")
            ),
            ShellError::BackgroundExists { output } => {
                write!(f, "output {output} already has a background")
            }
            ShellError::PanelExists { output, edge } => {
                write!(f, "output {output} already has a panel on the {edge} edge")
            }
            ShellError::InvalidEdge(edge) => write!(f, "invalid edge for panel: {edge}"),
            ShellError::InvalidRole(role) => write!(f, "invalid application role: {role}"),
            ShellError::InvalidSurface => write!(f, "surface must be a desktop surface"),
            ShellError::UnknownOutput(name) => write!(f, "unknown output {name}"),
            ShellError::ShellAlreadyBound => write!(f, "shell interface has already been bound"),
            ShellError::GeometryViolation {
                app_id,
                expected,
                got,
            } => write!(
                f,
                "client {} committed {}x{} while {}x{} was requested",
                app_id.as_deref().unwrap_or("<no app id>"),
                got.0,
                got.1,
                expected.0,
                expected.1
            ),
            ShellError::Config(msg) => write!(f, "config error: {msg}"),
            ShellError::EventLoop(msg) => write!(f, "event loop error: {msg}"),
            ShellError::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for ShellError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShellError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ShellError {
    fn from(err: std::io::Error) -> Self {
        ShellError::Io(err)
    }
}
