use unicode_segmentation::UnicodeSegmentation;

/// A person's name as supplied through the contact or subscribe forms.
#[derive(Clone, Debug)]
pub struct PersonName(String);

impl PersonName {
    /// Returns a `PersonName` if the input satisfies all validation
    /// constraints, an error message otherwise.
    pub fn parse(s: String) -> Result<PersonName, String> {
        let trimmed = s.trim();
        let is_empty = trimmed.is_empty();

        // A grapheme is a "user-perceived character", which may be composed
        // of multiple unicode code points.
        let is_too_long = trimmed.graphemes(true).count() > 256;

        let forbidden_characters = ['/', '(', ')', '"', '<', '>', '\\', '{', '}'];
        let contains_forbidden_characters = trimmed
            .chars()
            .any(|c| forbidden_characters.contains(&c));

        if is_empty || is_too_long || contains_forbidden_characters {
            Err(format!("{} is not a valid name.", s))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
