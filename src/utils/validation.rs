use crate::utils::error::{DevstartError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_port(field_name: &str, port: u16) -> Result<()> {
    if port == 0 {
        return Err(DevstartError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: port.to_string(),
            reason: "Port must be between 1 and 65535".to_string(),
        });
    }
    Ok(())
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(DevstartError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(DevstartError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DevstartError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// 訊號名稱，例如 `KILL`、`TERM` 或 `9`
pub fn validate_signal(field_name: &str, signal: &str) -> Result<()> {
    validate_non_empty_string(field_name, signal)?;

    if !signal.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(DevstartError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: signal.to_string(),
            reason: "Signal must be a name like KILL or a number".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_port() {
        assert!(validate_port("project.port", 8081).is_ok());
        assert!(validate_port("project.port", 65535).is_ok());
        assert!(validate_port("project.port", 0).is_err());
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("project.root", "./playground").is_ok());
        assert!(validate_path("project.root", "").is_err());
        assert!(validate_path("project.root", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_signal() {
        assert!(validate_signal("kill_port.signal", "KILL").is_ok());
        assert!(validate_signal("kill_port.signal", "9").is_ok());
        assert!(validate_signal("kill_port.signal", "").is_err());
        assert!(validate_signal("kill_port.signal", "-9").is_err());
    }
}
