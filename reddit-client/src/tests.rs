#[cfg(test)]
mod tests {
    use crate::api::{self, RedditFeedClient, RedditPostData};
    use karmacheck_core::{CoreError, FeedError, FeedSource, Post};
    use reqwest::StatusCode;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_client(base_url: &str) -> RedditFeedClient {
        RedditFeedClient::new("karmacheck-test/1.0", Duration::from_secs(5))
            .unwrap()
            .with_base_url(base_url)
    }

    fn listing_body(ids: &[&str]) -> String {
        let children: Vec<serde_json::Value> = ids
            .iter()
            .map(|id| {
                serde_json::json!({
                    "kind": "t3",
                    "data": {
                        "id": id,
                        "title": format!("Post {}", id),
                        "author": "test_user",
                        "subreddit": "pics",
                        "url": format!("https://i.redd.it/{}.jpg", id),
                        "permalink": format!("/r/pics/comments/{}/post_{}/", id, id),
                        "created_utc": 1640995200.0,
                        "is_self": false,
                        "stickied": false
                    }
                })
            })
            .collect();

        serde_json::json!({
            "kind": "Listing",
            "data": {
                "children": children,
                "after": null,
                "before": null,
                "dist": ids.len()
            }
        })
        .to_string()
    }

    #[test]
    fn test_reddit_post_data_conversion() {
        let post_data = RedditPostData {
            id: "test123".to_string(),
            title: "Test Post".to_string(),
            author: "test_user".to_string(),
            subreddit: "test".to_string(),
            permalink: "/r/test/comments/test123/test_post/".to_string(),
            created_utc: 1640995200.0,
        };

        let post: Post = post_data.into();
        assert_eq!(post.id, "test123");
        assert_eq!(post.title, "Test Post");
        assert_eq!(
            post.permalink,
            "https://www.reddit.com/r/test/comments/test123/test_post/"
        );
        assert_eq!(post.dedup_key(), post.permalink);
        assert_eq!(post.created_utc.timestamp(), 1640995200);
    }

    #[test]
    fn test_check_status_mapping() {
        assert!(api::check_status(StatusCode::OK, None, "pics").is_ok());

        assert_eq!(
            api::check_status(StatusCode::NOT_FOUND, None, "pics"),
            Err(FeedError::SubredditNotFound {
                subreddit: "pics".to_string()
            })
        );
        assert_eq!(
            api::check_status(StatusCode::TOO_MANY_REQUESTS, Some(12), "pics"),
            Err(FeedError::RateLimitExceeded { retry_after: 12 })
        );
        assert_eq!(
            api::check_status(StatusCode::TOO_MANY_REQUESTS, None, "pics"),
            Err(FeedError::RateLimitExceeded { retry_after: 60 })
        );
        assert!(matches!(
            api::check_status(StatusCode::FORBIDDEN, None, "pics"),
            Err(FeedError::Forbidden { .. })
        ));
        assert_eq!(
            api::check_status(StatusCode::BAD_GATEWAY, None, "pics"),
            Err(FeedError::ServerError { status_code: 502 })
        );
    }

    #[test]
    fn test_parse_listing_rejects_garbage() {
        let result = api::parse_listing("<html>search</html>", "pics");
        assert!(matches!(result, Err(FeedError::InvalidResponse { .. })));
    }

    #[tokio::test]
    async fn test_fetch_latest_returns_posts_in_feed_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/r/pics/new.json"))
            .and(query_param("limit", "3"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(listing_body(&["c", "b", "a"])),
            )
            .mount(&server)
            .await;

        let client = create_test_client(&server.uri());
        let posts = client.fetch_latest("pics", 3).await.unwrap();

        let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
        assert_eq!(
            posts[0].permalink,
            format!("{}/r/pics/comments/c/post_c/", server.uri())
        );
    }

    #[tokio::test]
    async fn test_fetch_latest_truncates_to_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/r/pics/new.json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(listing_body(&["e", "d", "c", "b"])),
            )
            .mount(&server)
            .await;

        let client = create_test_client(&server.uri());
        let posts = client.fetch_latest("pics", 2).await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[1].id, "d");
    }

    #[tokio::test]
    async fn test_fetch_latest_empty_listing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/r/quiet/new.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(listing_body(&[])))
            .mount(&server)
            .await;

        let client = create_test_client(&server.uri());
        let posts = client.fetch_latest("quiet", 10).await.unwrap();
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_latest_maps_http_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/r/missing/new.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = create_test_client(&server.uri());
        let result = client.fetch_latest("missing", 10).await;
        assert!(matches!(
            result,
            Err(CoreError::Feed(FeedError::SubredditNotFound { subreddit })) if subreddit == "missing"
        ));
    }

    #[tokio::test]
    async fn test_fetch_latest_transport_failure() {
        // Nothing listens on the discard port.
        let client = create_test_client("http://127.0.0.1:9");
        let result = client.fetch_latest("pics", 10).await;
        assert!(matches!(
            result,
            Err(CoreError::Feed(FeedError::Transport { .. }))
                | Err(CoreError::Feed(FeedError::RequestTimeout))
        ));
    }
}
