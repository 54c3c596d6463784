//! Domain error types.

/// Top-level error type for etfbalance.
#[derive(Debug, thiserror::Error)]
pub enum EtfBalanceError {
    #[error("storage error: {reason}")]
    Storage { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("transport error: {reason}")]
    Transport { reason: String },

    #[error("malformed response: {reason}")]
    MalformedResponse { reason: String },

    #[error("no price data available")]
    NoPriceData,

    #[error("no ledger rows available")]
    NoLedgerData,

    #[error("total value is zero as of {date}; allocation ratio is undefined")]
    ZeroTotalValue { date: String },

    #[error("missing credential: {name}")]
    MissingCredential { name: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EtfBalanceError {
    /// Process exit status reported for this error.
    pub fn exit_status(&self) -> u8 {
        match self {
            EtfBalanceError::Io(_) | EtfBalanceError::Storage { .. } => 1,
            EtfBalanceError::ConfigParse { .. }
            | EtfBalanceError::ConfigMissing { .. }
            | EtfBalanceError::ConfigInvalid { .. }
            | EtfBalanceError::MissingCredential { .. } => 2,
            EtfBalanceError::Transport { .. } | EtfBalanceError::MalformedResponse { .. } => 3,
            EtfBalanceError::NoPriceData | EtfBalanceError::NoLedgerData => 4,
            EtfBalanceError::ZeroTotalValue { .. } => 5,
        }
    }
}

impl From<&EtfBalanceError> for std::process::ExitCode {
    fn from(err: &EtfBalanceError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
