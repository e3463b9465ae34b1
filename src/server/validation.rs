use crate::server::response::ApiError;

const MAX_USERNAME_LEN: usize = 64;
const MAX_NAME_LEN: usize = 100;

fn is_valid_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ' '
}

fn validate_name(name: &str, entity: &str, max_len: usize) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err(format!("{entity} name cannot be empty"));
    }
    if name.len() > max_len {
        return Err(format!("{entity} name cannot exceed {max_len} characters"));
    }
    if !name.chars().all(is_valid_name_char) {
        return Err(format!(
            "{entity} name can only contain alphanumeric characters, spaces, hyphens, and underscores"
        ));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), ApiError> {
    if username.is_empty() {
        return Err(ApiError::bad_request("Username cannot be empty"));
    }
    if username.len() > MAX_USERNAME_LEN {
        return Err(ApiError::bad_request(format!(
            "Username cannot exceed {MAX_USERNAME_LEN} characters"
        )));
    }
    if username.contains(char::is_whitespace) {
        return Err(ApiError::bad_request("Username cannot contain whitespace"));
    }
    Ok(())
}

pub fn validate_section_name(name: &str) -> Result<(), ApiError> {
    validate_name(name, "Section", MAX_NAME_LEN).map_err(ApiError::bad_request)
}

pub fn validate_shift_name(name: &str) -> Result<(), ApiError> {
    validate_name(name, "Shift", MAX_NAME_LEN).map_err(ApiError::bad_request)
}

/// Shift times must be HH:MM:SS, 24-hour clock.
pub fn validate_shift_time(field: &str, value: &str) -> Result<(), ApiError> {
    let valid = value.len() == 8
        && chrono::NaiveTime::parse_from_str(value, "%H:%M:%S").is_ok();
    if valid {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!(
            "{field} must be in format HH:MM:SS"
        )))
    }
}
