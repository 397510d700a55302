//! Custom attribute and inline attribute name validation.
//!
//! A custom attribute name is the part after the `custom-` prefix of an inline
//! attribute. Valid names:
//! - Start with an ASCII letter
//! - Continue with ASCII letters, digits, or hyphens

/// Validates a custom attribute name (`^[A-Za-z][A-Za-z0-9-]*$`).
///
/// # Examples
/// ```
/// use globalattr::attributes::naming::validate_custom_attr_name;
///
/// assert!(validate_custom_attr_name("priority").is_ok());
/// assert!(validate_custom_attr_name("abc-1").is_ok());
///
/// assert!(validate_custom_attr_name("").is_err());
/// assert!(validate_custom_attr_name("1abc").is_err());
/// assert!(validate_custom_attr_name("-abc").is_err());
/// ```
pub fn validate_custom_attr_name(name: &str) -> Result<(), NameValidationError> {
    let mut chars = name.chars();
    let first = match chars.next() {
        Some(ch) => ch,
        None => return Err(NameValidationError::Empty),
    };
    if !first.is_ascii_alphabetic() {
        return Err(NameValidationError::InvalidStart(first));
    }

    for ch in chars {
        if !is_name_char(ch) {
            return Err(NameValidationError::InvalidCharacter(ch));
        }
    }
    Ok(())
}

pub fn is_valid_custom_attr_name(name: &str) -> bool {
    validate_custom_attr_name(name).is_ok()
}

/// Inline attribute names may only use ASCII letters, digits and hyphens.
pub fn is_valid_inline_attr_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(is_name_char)
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-'
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameValidationError {
    Empty,
    /// Must start with a letter
    InvalidStart(char),
    InvalidCharacter(char),
}

impl std::fmt::Display for NameValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NameValidationError::Empty => write!(f, "custom attribute name cannot be empty"),
            NameValidationError::InvalidStart(ch) => {
                write!(
                    f,
                    "custom attribute name must start with a letter, found '{}'",
                    ch
                )
            }
            NameValidationError::InvalidCharacter(ch) => {
                write!(
                    f,
                    "custom attribute name contains invalid character '{}' (only letters, digits and hyphen allowed)",
                    ch
                )
            }
        }
    }
}

impl std::error::Error for NameValidationError {}
