use karmacheck_core::{
    ConfigError, CoreError, ErrorExt, ErrorReporter, FeedError, LookupError,
};

#[test]
fn test_error_codes() {
    let feed_error = CoreError::Feed(FeedError::RequestTimeout);
    assert_eq!(feed_error.error_code(), "FEED");

    let lookup_error = CoreError::Lookup(LookupError::NoMediaFound);
    assert_eq!(lookup_error.error_code(), "LOOKUP");

    let config_error = CoreError::Config(ConfigError::NoSubreddit);
    assert_eq!(config_error.error_code(), "CONFIG");

    assert_eq!(
        LookupError::MalformedUrl {
            url: "https://example.com".to_string()
        }
        .error_code(),
        "LOOKUP_MALFORMED_URL"
    );
}

#[test]
fn test_lookup_error_classification() {
    assert!(LookupError::NoMediaFound.is_content_miss());
    assert!(LookupError::NoSimilarPosts.is_content_miss());
    assert!(!LookupError::Timeout.is_content_miss());

    let malformed = LookupError::MalformedUrl {
        url: "nope".to_string(),
    };
    assert!(!malformed.is_content_miss());
    assert!(!malformed.is_transport());

    assert!(LookupError::Timeout.is_transport());
    assert!(LookupError::Transport {
        details: "connection refused".to_string()
    }
    .is_transport());
}

#[test]
fn test_service_error_is_neither_miss_nor_transport() {
    let error = LookupError::ServiceError { status: 503 };
    assert!(!error.is_content_miss());
    assert!(!error.is_transport());
    assert_eq!(error.error_code(), "LOOKUP_SERVICE_ERROR");
    assert!(error.user_friendly_message().contains("503"));
}

#[test]
fn test_user_friendly_messages() {
    let error = CoreError::Config(ConfigError::InvalidSubreddit {
        name: "bad name".to_string(),
    });
    let message = error.user_friendly_message();
    assert!(message.contains("bad name"));

    let error = CoreError::Feed(FeedError::EmptySubreddit {
        subreddit: "quiet".to_string(),
    });
    assert!(error.user_friendly_message().contains("quiet"));
}

#[test]
fn test_display_strings() {
    assert_eq!(
        LookupError::NoMediaFound.to_string(),
        "KarmaDecay could not locate any media in the post"
    );
    assert_eq!(
        FeedError::EmptySubreddit {
            subreddit: "pics".to_string()
        }
        .to_string(),
        "The subreddit r/pics does not appear to have any posts"
    );
}

#[test]
fn test_error_reporter() {
    let error = CoreError::Lookup(LookupError::Timeout);

    // This test just ensures reporting doesn't panic
    ErrorReporter::new().report_error(&error);
    ErrorReporter::default().report_error(&CoreError::Config(ConfigError::NoSubreddit));
}
