//! Draft validation: the composition layer's side of the core's contract.
//! All checks run synchronously, before any network call.

use uuid::Uuid;

use crate::error::ChatError;

/// What the user typed, before validation.
#[derive(Debug, Clone, Default)]
pub struct Draft {
    pub text: Option<String>,
    pub image_url: Option<String>,
    pub reply_to_id: Option<Uuid>,
}

impl Draft {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), ..Default::default() }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self { image_url: Some(url.into()), ..Default::default() }
    }

    pub fn replying_to(mut self, id: Uuid) -> Self {
        self.reply_to_id = Some(id);
        self
    }
}

/// A draft that passed validation: trimmed, length-checked, and guaranteed
/// to carry text or an image (or both).
#[derive(Debug, Clone, PartialEq)]
pub struct ValidDraft {
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub reply_to_id: Option<Uuid>,
}

/// Trim and validate. Text must be 1..=`max_content_len` characters after
/// trimming, unless a non-empty image URL stands in for it.
pub fn validate(draft: Draft, max_content_len: usize) -> Result<ValidDraft, ChatError> {
    let content = draft
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    let image_url = draft
        .image_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string);

    if content.is_none() && image_url.is_none() {
        return Err(ChatError::EmptyDraft);
    }

    if let Some(text) = &content {
        let len = text.chars().count();
        if len > max_content_len {
            return Err(ChatError::ContentTooLong { len, max: max_content_len });
        }
    }

    Ok(ValidDraft { content, image_url, reply_to_id: draft.reply_to_id })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: usize = 2000;

    #[test]
    fn trims_and_accepts_plain_text() {
        let valid = validate(Draft::text("  g'day  "), MAX).unwrap();
        assert_eq!(valid.content.as_deref(), Some("g'day"));
        assert_eq!(valid.image_url, None);
    }

    #[test]
    fn whitespace_only_text_without_image_is_rejected() {
        assert!(matches!(validate(Draft::text("   \n\t"), MAX), Err(ChatError::EmptyDraft)));
        assert!(matches!(validate(Draft::default(), MAX), Err(ChatError::EmptyDraft)));
    }

    #[test]
    fn image_alone_is_enough() {
        let valid = validate(Draft::image("https://example.invalid/cat.gif"), MAX).unwrap();
        assert_eq!(valid.content, None);
        assert!(valid.image_url.is_some());
    }

    #[test]
    fn blank_image_url_does_not_count() {
        let draft = Draft { image_url: Some("   ".into()), ..Default::default() };
        assert!(matches!(validate(draft, MAX), Err(ChatError::EmptyDraft)));
    }

    #[test]
    fn over_length_content_is_rejected_with_counts() {
        let draft = Draft::text("a".repeat(MAX + 1));
        match validate(draft, MAX) {
            Err(ChatError::ContentTooLong { len, max }) => {
                assert_eq!(len, MAX + 1);
                assert_eq!(max, MAX);
            }
            other => panic!("expected ContentTooLong, got {other:?}"),
        }
    }

    #[test]
    fn length_limit_is_in_characters_not_bytes() {
        // Multi-byte glyphs still count as one character each.
        let draft = Draft::text("🔥".repeat(MAX));
        assert!(validate(draft, MAX).is_ok());
    }

    #[test]
    fn exact_limit_passes() {
        assert!(validate(Draft::text("a".repeat(MAX)), MAX).is_ok());
    }

    #[test]
    fn reply_target_is_carried_through() {
        let id = Uuid::new_v4();
        let valid = validate(Draft::text("oi").replying_to(id), MAX).unwrap();
        assert_eq!(valid.reply_to_id, Some(id));
    }
}
