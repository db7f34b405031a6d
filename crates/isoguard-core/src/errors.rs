use isoguard_core_types::RequestId;
use thiserror::Error;

/// Result type alias using the canonical structured error
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// handling, test assertions and the machine-readable verification report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input / validation
    InvalidInput,
    InvalidDataset,
    InvalidSnapshot,
    ConfigInvalid,

    // Capture
    /// A file could not be opened or read mid-stream (recoverable during capture)
    FileUnreadable,

    // Verification run
    /// The system under test reported failure for an invocation
    SetupFailed,
    /// The first invocation produced no files under the monitored root
    NoArtifactsProduced,
    Timeout,
    /// Transport failure talking to the system under test
    InvocationError,

    // Integration/IO
    Io,
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidDataset => "ERR_INVALID_DATASET",
            ExErrorKind::InvalidSnapshot => "ERR_INVALID_SNAPSHOT",
            ExErrorKind::ConfigInvalid => "ERR_CONFIG_INVALID",
            ExErrorKind::FileUnreadable => "ERR_FILE_UNREADABLE",
            ExErrorKind::SetupFailed => "ERR_SETUP_FAILED",
            ExErrorKind::NoArtifactsProduced => "ERR_NO_ARTIFACTS_PRODUCED",
            ExErrorKind::Timeout => "ERR_TIMEOUT",
            ExErrorKind::InvocationError => "ERR_INVOCATION",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus the context
/// (operation, path, dataset key, request id) needed to diagnose a run.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    path: Option<String>,
    key: Option<String>,
    request_id: Option<RequestId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            path: None,
            key: None,
            request_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add filesystem path context
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add dataset key context
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        if let Some(key) = &self.key {
            write!(f, " (key: {})", key)?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " (request_id: {})", request_id)?;
        }
        if let Some(source) = &self.source {
            write!(f, " caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain error taxonomy for capture, dataset and configuration failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IsoGuardError {
    /// A file could not be opened or read
    #[error("File unreadable: {path}: {reason}")]
    FileUnreadable { path: String, reason: String },

    /// Capture root does not exist
    #[error("Capture root not found: {root}")]
    RootNotFound { root: String },

    /// Capture root exists but is not a directory
    #[error("Capture root is not a directory: {root}")]
    RootNotDirectory { root: String },

    /// Capture ran past its deadline
    #[error("Capture of {root} exceeded {timeout_ms} ms")]
    CaptureTimedOut { root: String, timeout_ms: u64 },

    /// Two snapshots were fingerprinted with different digests
    #[error("Snapshot algorithms differ: before={before}, after={after}")]
    AlgorithmMismatch { before: String, after: String },

    /// A dataset line or row could not be parsed
    #[error("{source_name}:{line}: {reason}")]
    DatasetParse {
        source_name: String,
        line: usize,
        reason: String,
    },

    /// A weight cell did not hold a number
    #[error("{source_name}:{line}: invalid weight '{value}'")]
    InvalidWeight {
        source_name: String,
        line: usize,
        value: String,
    },

    /// Configuration failed validation
    #[error("Invalid configuration: {reason}")]
    ConfigInvalid { reason: String },

    /// JSON (de)serialization failed
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<IsoGuardError> for ExError {
    fn from(err: IsoGuardError) -> Self {
        let message = err.to_string();
        match err {
            IsoGuardError::FileUnreadable { path, .. } => {
                ExError::new(ExErrorKind::FileUnreadable)
                    .with_op("fingerprint")
                    .with_path(path)
                    .with_message(message)
            }
            IsoGuardError::RootNotFound { root } | IsoGuardError::RootNotDirectory { root } => {
                ExError::new(ExErrorKind::Io)
                    .with_op("capture")
                    .with_path(root)
                    .with_message(message)
            }
            IsoGuardError::CaptureTimedOut { root, .. } => ExError::new(ExErrorKind::Timeout)
                .with_op("capture")
                .with_path(root)
                .with_message(message),
            IsoGuardError::AlgorithmMismatch { .. } => ExError::new(ExErrorKind::InvalidSnapshot)
                .with_op("diff")
                .with_message(message),
            IsoGuardError::DatasetParse { source_name, .. }
            | IsoGuardError::InvalidWeight { source_name, .. } => {
                ExError::new(ExErrorKind::InvalidDataset)
                    .with_op("load_dataset")
                    .with_path(source_name)
                    .with_message(message)
            }
            IsoGuardError::ConfigInvalid { .. } => {
                ExError::new(ExErrorKind::ConfigInvalid).with_message(message)
            }
            IsoGuardError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to IsoGuardError
impl From<serde_json::Error> for IsoGuardError {
    fn from(err: serde_json::Error) -> Self {
        IsoGuardError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ExError {
    fn from(err: serde_json::Error) -> Self {
        IsoGuardError::from(err).into()
    }
}

/// Create an IO error for the given operation
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}
