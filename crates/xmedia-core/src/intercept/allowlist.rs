//! URL allowlist for passive interception.

/// Literal URL-substring keywords identifying endpoints likely to carry
/// media metadata. External contract with the upstream API routes.
pub const INTERCEPT_KEYWORDS: &[&str] = &[
    "/graphql/",
    "/i/api/",
    "TweetDetail",
    "TweetResultByRestId",
    "UserTweets",
    "HomeTimeline",
    "HomeLatestTimeline",
    "SearchTimeline",
    "ListLatestTweetsTimeline",
    "Bookmarks",
    "Likes",
    "UserMedia",
];

/// True if a response for this URL should be observed for media capture.
pub fn should_intercept(url: &str) -> bool {
    INTERCEPT_KEYWORDS.iter().any(|keyword| url.contains(keyword))
}
