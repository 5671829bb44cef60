use crate::error::ServiceError;

/// Accept only a plain file name that stays inside its base directory
pub fn ensure_bare_filename(name: &str) -> Result<(), ServiceError> {
    if name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || name.contains(':')
    {
        return Err(ServiceError::Validation(format!("Invalid filename: {}", name)));
    }
    Ok(())
}
