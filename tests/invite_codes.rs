//! Property tests for invite-code generation and post shape validation

use palaver::backend::community::invite::{generate_code, INVITE_CODE_LENGTH};
use palaver::backend::post::pipeline::validate_input;
use palaver::backend::post::types::{CreatePostInput, PostShape, UploadedFile};
use proptest::prelude::*;

#[test]
fn codes_are_fixed_length_alphanumeric() {
    for _ in 0..500 {
        let code = generate_code();
        assert_eq!(code.len(), INVITE_CODE_LENGTH);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}

#[test]
fn codes_spread_over_the_space() {
    // 62^8 possibilities; 200 draws should essentially never collide
    let codes: std::collections::HashSet<String> = (0..200).map(|_| generate_code()).collect();
    assert!(codes.len() >= 199);
}

fn text_input(title: String, content: Option<String>) -> CreatePostInput {
    CreatePostInput {
        title,
        content,
        shape: PostShape::Text,
        is_anonymous: false,
        file: None,
    }
}

fn media_input(title: String, file: Option<UploadedFile>) -> CreatePostInput {
    CreatePostInput {
        title,
        content: None,
        shape: PostShape::Media,
        is_anonymous: false,
        file,
    }
}

fn some_file() -> UploadedFile {
    UploadedFile {
        filename: "clip.mp4".to_string(),
        content_type: "video/mp4".to_string(),
        data: vec![0u8; 16],
    }
}

proptest! {
    /// A text post without content never validates, whatever the title
    #[test]
    fn text_posts_require_content(title in "[a-zA-Z0-9 ]{1,40}") {
        prop_assert!(validate_input(&text_input(title, None)).is_err());
    }

    /// Whitespace-only content is the same as no content
    #[test]
    fn blank_content_rejected(title in "[a-zA-Z0-9 ]{1,40}", blank in "[ \t]{0,10}") {
        prop_assert!(validate_input(&text_input(title, Some(blank))).is_err());
    }

    /// A missing title fails validation regardless of shape
    #[test]
    fn title_always_required(blank_title in "[ \t]{0,10}", content in "[a-zA-Z0-9 ]{1,40}") {
        prop_assert!(validate_input(&text_input(blank_title.clone(), Some(content))).is_err());
        prop_assert!(validate_input(&media_input(blank_title, Some(some_file()))).is_err());
    }

    /// A media post without a file never validates
    #[test]
    fn media_posts_require_a_file(title in "[a-zA-Z0-9 ]{1,40}") {
        prop_assert!(validate_input(&media_input(title, None)).is_err());
    }

    /// Well-formed inputs of both shapes validate
    #[test]
    fn well_formed_inputs_pass(
        title in "[a-zA-Z0-9][a-zA-Z0-9 ]{0,39}",
        content in "[a-zA-Z0-9][a-zA-Z0-9 ]{0,39}",
    ) {
        prop_assert!(validate_input(&text_input(title.clone(), Some(content))).is_ok());
        prop_assert!(validate_input(&media_input(title, Some(some_file()))).is_ok());
    }
}
