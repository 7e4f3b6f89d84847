use thiserror::Error;

#[derive(Error, Debug)]
pub enum DevstartError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to spawn '{program}': {source}")]
    SpawnError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Step '{step}' failed with {}", describe_exit(.exit_code))]
    StepFailed { step: String, exit_code: Option<i32> },

    #[error("Unexpected process id '{line}' in output for port {port}")]
    InvalidPidError { port: u16, line: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

fn describe_exit(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl DevstartError {
    /// 對應到行程結束碼
    pub fn exit_code(&self) -> i32 {
        match self {
            DevstartError::StepFailed {
                exit_code: Some(code),
                ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, DevstartError>;
