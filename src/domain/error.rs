//! Domain error types.
//!
//! Only caller misuse is an error: missing input columns, misaligned
//! sequence lengths, bad configuration. Numerical edge cases inside the
//! pipeline (short warm-up windows, zero variance in a ratio) degrade to
//! undefined values instead, so a long batch run never aborts over one
//! bad window.

/// Top-level error type for rsrslab.
#[derive(Debug, thiserror::Error)]
pub enum RsrsError {
    #[error("missing column '{column}' in {file}")]
    MissingColumn { column: String, file: String },

    #[error("positions length {positions} does not match bars length {bars}")]
    MisalignedLength { positions: usize, bars: usize },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("bad bar data at row {row}: {reason}")]
    Data { row: usize, reason: String },

    #[error("insufficient data: have {bars} bars, need {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&RsrsError> for std::process::ExitCode {
    fn from(err: &RsrsError) -> Self {
        let code: u8 = match err {
            RsrsError::Io(_) => 1,
            RsrsError::ConfigParse { .. } | RsrsError::ConfigInvalid { .. } => 2,
            RsrsError::MissingColumn { .. } | RsrsError::Csv(_) | RsrsError::Data { .. } => 3,
            RsrsError::InsufficientData { .. } => 4,
            RsrsError::MisalignedLength { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_message_names_column_and_file() {
        let err = RsrsError::MissingColumn {
            column: "volume".into(),
            file: "hs300.csv".into(),
        };
        assert_eq!(err.to_string(), "missing column 'volume' in hs300.csv");
    }

    #[test]
    fn misaligned_length_message() {
        let err = RsrsError::MisalignedLength {
            positions: 10,
            bars: 12,
        };
        assert_eq!(
            err.to_string(),
            "positions length 10 does not match bars length 12"
        );
    }

    #[test]
    fn exit_codes_distinguish_categories() {
        use std::process::ExitCode;

        let io = RsrsError::Io(std::io::Error::other("x"));
        let cfg = RsrsError::ConfigInvalid {
            section: "strategy".into(),
            key: "score_buy_threshold".into(),
            reason: "bad".into(),
        };
        // Different categories must map to different exit codes.
        assert_ne!(
            format!("{:?}", ExitCode::from(&io)),
            format!("{:?}", ExitCode::from(&cfg))
        );
    }
}
