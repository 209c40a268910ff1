use thiserror::Error;

/// Convenience result type for pipeline execution.
pub type TransformResult<T> = Result<T, TransformError>;

/// Convenience result type for session store operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Convenience result type for record ingestion.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Error returned by [`crate::execution::TransformationEngine::execute`].
///
/// Every variant names the label of the step that caused the run to abort.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The step kind is not one of the supported operators. This is a configuration error.
    #[error("unknown transformation '{kind}' in step '{label}'")]
    UnknownStep { label: String, kind: String },

    /// The step parameters could not be decoded for its kind.
    #[error("invalid parameters for {kind} step '{label}': {message}")]
    InvalidParameters {
        label: String,
        kind: String,
        message: String,
    },

    /// An operator failed while running the step.
    #[error("failed to apply {label}: {source}")]
    Step {
        label: String,
        #[source]
        source: OperatorError,
    },
}

impl TransformError {
    /// Label of the step the run failed on.
    pub fn label(&self) -> &str {
        match self {
            Self::UnknownStep { label, .. }
            | Self::InvalidParameters { label, .. }
            | Self::Step { label, .. } => label,
        }
    }
}

/// Step-level failure raised by an operator in [`crate::processing`].
#[derive(Debug, Error)]
pub enum OperatorError {
    /// `regex_replace` was given a pattern that does not compile.
    #[error("invalid regex pattern '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A filter condition or derive formula was rejected before evaluation.
    #[error("invalid expression: {0}")]
    InvalidExpression(#[from] ExpressionError),

    /// A parameter value is unusable for this operator.
    #[error("invalid parameter: {message}")]
    InvalidParameter { message: String },
}

/// Tokenizer, parser or evaluation error from [`crate::expression`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedCharacter { ch: char, position: usize },

    #[error("unterminated quote starting at position {position}")]
    UnterminatedQuote { position: usize },

    #[error("unexpected token '{token}' at position {position}")]
    UnexpectedToken { token: String, position: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    /// The token is valid in conditions but not allowed in arithmetic formulas.
    #[error("'{token}' is not allowed in a formula (position {position})")]
    NotAllowed { token: String, position: usize },

    #[error("expression nests too deeply (position {position})")]
    TooDeep { position: usize },

    #[error("unknown column '{name}'")]
    UnknownColumn { name: String },

    #[error("type mismatch: {message}")]
    TypeMismatch { message: String },
}

/// Error returned by [`crate::session::SessionStore`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// No session is registered under this id.
    #[error("session not found: {id}")]
    NotFound { id: String },

    /// The name does not match any [`crate::session::Preset`].
    #[error("unknown preset '{name}'")]
    UnknownPreset { name: String },

    /// The pipeline run against the session failed; the session was left unchanged.
    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// Error type returned by the record adapters in [`crate::ingestion`].
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV decoding error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The input is not a JSON object, an array of objects or NDJSON.
    #[error("invalid shape: {message}")]
    InvalidShape { message: String },
}

/// Returned when parsing a [`crate::step::StepKind`] from an unsupported name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown step kind '{kind}'")]
pub struct ParseStepKindError {
    pub kind: String,
}
