//! Go identifier conventions shared by the extractor, selector and generator.

/// The blank identifier. Never a real constant.
pub const BLANK: &str = "_";

/// Reports whether `name` is exported under Go's convention: the first
/// character is an upper-case letter.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Reports whether `name` is the blank identifier.
#[inline]
pub fn is_blank(name: &str) -> bool {
    name == BLANK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exported_ascii() {
        assert!(is_exported("Color"));
        assert!(!is_exported("color"));
        assert!(!is_exported("_Color"));
    }

    #[test]
    fn test_exported_unicode() {
        assert!(is_exported("Ärger"));
        assert!(!is_exported("ärger"));
        // No case at all: not exported.
        assert!(!is_exported("日本"));
    }

    #[test]
    fn test_empty_name() {
        assert!(!is_exported(""));
        assert!(!is_blank(""));
    }

    #[test]
    fn test_blank() {
        assert!(is_blank("_"));
        assert!(!is_blank("__"));
    }
}
