/// Errors raised by mutating calls on the judge.
///
/// Routine move rejection goes through [`crate::types::GameState`] instead;
/// these only surface when a caller commits or undoes without validating.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JudgeError {
    #[error("move {0:?} is not an integer column")]
    Unparsable(String),

    #[error("column {0} is out of range (0-6)")]
    ColumnOutOfRange(i64),

    #[error("column {0} is full")]
    ColumnFull(usize),

    #[error("no moves to undo")]
    EmptyHistory,

    #[error("game is already over")]
    GameOver,

    #[error("invalid cell value {value} at column {column}, row {row}")]
    InvalidCell { column: usize, row: usize, value: u8 },

    #[error("piece at column {column}, row {row} is floating above an empty cell")]
    FloatingPiece { column: usize, row: usize },

    #[error("player code {0} is not 1 or 2")]
    InvalidPlayer(u8),
}

/// Errors raised by move selection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("no legal moves remain")]
    NoLegalMoves,

    #[error("selector picked illegal column {column} (legal: {legal:?})")]
    IllegalSelection { column: usize, legal: Vec<usize> },

    #[error(transparent)]
    Judge(#[from] JudgeError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised when engine settings are out of range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("max_depth must be between 1 and {max}, got {value}")]
    Depth { value: u8, max: u8 },

    #[error("heuristic_base must be between 2 and {max}, got {value}")]
    HeuristicBase { value: i32, max: i32 },

    #[error("unknown level {0} (expected 1-6)")]
    Level(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn judge_error_display() {
        assert_eq!(JudgeError::ColumnFull(3).to_string(), "column 3 is full");
        assert_eq!(
            JudgeError::Unparsable("1.0".to_string()).to_string(),
            "move \"1.0\" is not an integer column"
        );
    }

    #[test]
    fn engine_error_wraps_judge_error_transparently() {
        let err: EngineError = JudgeError::EmptyHistory.into();
        assert_eq!(err.to_string(), "no moves to undo");
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::Depth { value: 0, max: 42 };
        assert_eq!(err.to_string(), "max_depth must be between 1 and 42, got 0");
    }
}
