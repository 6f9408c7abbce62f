use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Lane index outside 1..=4 handed to input or judging code.
    #[error("invalid lane {0}: lanes are numbered 1 to 4")]
    InvalidLane(u8),

    #[error("invalid lane mask '{0}': expected four '0'/'1' characters")]
    InvalidLaneMask(String),

    #[error("invalid chart timestamp '{0}': expected a non-negative integer")]
    InvalidTimestamp(String),

    #[error("invalid numeric field '{field}': '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_lane_message_names_the_lane() {
        let msg = Error::InvalidLane(5).to_string();
        assert!(msg.contains('5'), "got {msg}");
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
