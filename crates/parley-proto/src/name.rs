//! Name validation shared by nicknames and channel names.

use thiserror::Error;

/// Why a proposed nickname or channel name was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// The name has no characters.
    #[error("name is empty")]
    Empty,

    /// The name contains a character that is not alphanumeric.
    #[error("invalid character {ch:?} at index {index}")]
    InvalidChar {
        /// The offending character.
        ch: char,
        /// Character (not byte) position of `ch`.
        index: usize,
    },
}

/// Check that `name` is non-empty and entirely alphanumeric.
///
/// Alphanumeric follows Unicode: letters and digits from any script pass.
pub fn validate_name(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }

    match name.chars().enumerate().find(|(_, ch)| !ch.is_alphanumeric()) {
        Some((index, ch)) => Err(NameError::InvalidChar { ch, index }),
        None => Ok(()),
    }
}

/// Boolean form of [`validate_name`].
pub fn is_valid_name(name: &str) -> bool {
    validate_name(name).is_ok()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn empty_name_is_rejected() {
        assert_eq!(validate_name(""), Err(NameError::Empty));
    }

    #[test]
    fn alphanumeric_names_pass() {
        assert!(is_valid_name("User0"));
        assert!(is_valid_name("cis120"));
        assert!(is_valid_name("42"));
        assert!(is_valid_name("Ünïcödé"));
    }

    #[test]
    fn reports_first_offending_character() {
        assert_eq!(validate_name("!nv@l!d!"), Err(NameError::InvalidChar { ch: '!', index: 0 }));
        assert_eq!(validate_name("ab cd"), Err(NameError::InvalidChar { ch: ' ', index: 2 }));
        assert_eq!(validate_name("né_e"), Err(NameError::InvalidChar { ch: '_', index: 2 }));
    }

    #[test]
    fn error_display() {
        let err = NameError::InvalidChar { ch: '#', index: 3 };
        assert_eq!(err.to_string(), "invalid character '#' at index 3");
    }

    proptest! {
        #[test]
        fn ascii_alphanumeric_always_valid(name in "[a-zA-Z0-9]{1,32}") {
            prop_assert!(is_valid_name(&name));
        }

        #[test]
        fn any_punctuation_invalidates(
            prefix in "[a-z]{0,8}",
            bad in "[ !#@.,:;_-]",
            suffix in "[a-z]{0,8}",
        ) {
            let name = format!("{prefix}{bad}{suffix}");
            prop_assert!(!is_valid_name(&name));
        }
    }
}
