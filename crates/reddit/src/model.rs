//! Wire shapes of the Reddit JSON API and their conversion into [`Post`].

use serde::{Deserialize, Deserializer};
use serde_json::{Value, json};

use curator_core::{PlatformError, Post};

const WEB_BASE_URL: &str = "https://www.reddit.com";
const LINK_KIND: &str = "t3";

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Me {
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
struct Thing {
    kind: String,
    data: Value,
}

#[derive(Debug, Deserialize)]
struct LinkData {
    id: String,
    #[serde(default)]
    title: String,
    author: Option<String>,
    #[serde(default)]
    url: String,
    #[serde(default)]
    permalink: String,
    created_utc: f64,
    #[serde(default)]
    score: i64,
    #[serde(default, deserialize_with = "lenient_count")]
    num_comments: Option<i64>,
    #[serde(default)]
    removed: Option<bool>,
    /// Moderator who removed the post; `true` when the name is withheld.
    #[serde(default)]
    banned_by: Option<Value>,
}

impl LinkData {
    fn is_removed(&self) -> bool {
        let banned = match &self.banned_by {
            Some(Value::String(name)) => !name.is_empty(),
            Some(Value::Bool(flag)) => *flag,
            _ => false,
        };
        self.removed == Some(true) || banned
    }
}

/// Comment counts that are missing, null or not an integer become `None`.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_i64()))
}

impl From<LinkData> for Post {
    fn from(link: LinkData) -> Self {
        let removed = link.is_removed();
        let permalink = absolute_url(&link.permalink);
        let url = if link.url.is_empty() {
            permalink.clone()
        } else {
            absolute_url(&link.url)
        };
        Self {
            id: link.id,
            title: link.title,
            author: link.author.filter(|name| name != "[deleted]"),
            url,
            permalink,
            created_utc: link.created_utc.floor() as i64,
            score: link.score,
            num_comments: link.num_comments,
            removed,
        }
    }
}

/// Relative permalinks (crossposts point at one) become absolute so urls of
/// a crosspost and its source compare equal.
pub(crate) fn absolute_url(url: &str) -> String {
    if url.starts_with('/') {
        format!("{WEB_BASE_URL}{url}")
    } else {
        url.to_string()
    }
}

pub(crate) fn fullname(post_id: &str) -> String {
    if post_id.starts_with("t3_") {
        post_id.to_string()
    } else {
        format!("{LINK_KIND}_{post_id}")
    }
}

/// Posts of a listing payload.  Non-link children are skipped, and so are
/// links whose data cannot be read.
pub(crate) fn posts_from_listing(payload: Value) -> Result<Vec<Post>, PlatformError> {
    // Comment pages return `[post listing, comment listing]`.
    let payload = match payload {
        Value::Array(mut pages) if !pages.is_empty() => pages.swap_remove(0),
        other => other,
    };
    let listing: Listing =
        serde_json::from_value(payload).map_err(|err| PlatformError::Decode(err.to_string()))?;

    Ok(listing
        .data
        .children
        .into_iter()
        .filter(|thing| thing.kind == LINK_KIND)
        .filter_map(|thing| serde_json::from_value::<LinkData>(thing.data).ok())
        .map(Post::from)
        .collect())
}

/// `json` form field of `/api/v1/modactions/removal_reasons`: attaches the
/// removal reason and the private moderator note to a removed post.
pub(crate) fn removal_reason_body(name: &str, reason_id: &str, note: &str) -> String {
    json!({
        "item_ids": [name],
        "mod_note": note,
        "reason_id": reason_id,
    })
    .to_string()
}

/// `json` form field of `/api/v1/modactions/removal_link_message`: a public
/// comment posted on the removed post as the forum.
pub(crate) fn removal_message_body(name: &str, message: &str) -> String {
    json!({
        "item_id": [name],
        "message": message,
        "title": "ignored",
        "type": "public_as_subreddit",
    })
    .to_string()
}

/// Errors reported inside an `api_type=json` body.
pub(crate) fn api_errors(payload: &Value) -> Option<String> {
    let errors = payload.pointer("/json/errors")?.as_array()?;
    if errors.is_empty() {
        return None;
    }
    let rendered = errors
        .iter()
        .map(|error| match error {
            Value::Array(parts) => parts
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(": "),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join("; ");
    Some(rendered)
}

/// Id of the thing created by `/api/submit` (`json.data.id`) or
/// `/api/comment` (`json.data.things[0].data.id`).
pub(crate) fn created_id(payload: &Value) -> Option<String> {
    payload
        .pointer("/json/data/id")
        .or_else(|| payload.pointer("/json/data/things/0/data/id"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn link(id: &str) -> Value {
        json!({
            "kind": "t3",
            "data": {
                "id": id,
                "title": "Title",
                "author": "someone",
                "url": "https://i.redd.it/image.png",
                "permalink": format!("/r/test/comments/{id}/title/"),
                "created_utc": 1_709_992_800.0,
                "score": 12,
                "num_comments": 4
            }
        })
    }

    #[test]
    fn parses_new_listing() {
        let payload = json!({
            "kind": "Listing",
            "data": { "children": [link("aaa"), link("bbb")] }
        });
        let posts = posts_from_listing(payload).unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(
            posts[0],
            Post {
                id: "aaa".to_string(),
                title: "Title".to_string(),
                author: Some("someone".to_string()),
                url: "https://i.redd.it/image.png".to_string(),
                permalink: "https://www.reddit.com/r/test/comments/aaa/title/".to_string(),
                created_utc: 1_709_992_800,
                score: 12,
                num_comments: Some(4),
                removed: false,
            }
        );
    }

    #[test]
    fn skips_non_link_children_and_unreadable_links() {
        let payload = json!({
            "data": {
                "children": [
                    { "kind": "t1", "data": { "id": "comment" } },
                    { "kind": "t3", "data": { "title": "no id" } },
                    link("ok")
                ]
            }
        });
        let posts = posts_from_listing(payload).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, "ok");
    }

    #[test]
    fn tolerates_anomalous_fields() {
        let payload = json!({
            "data": {
                "children": [{
                    "kind": "t3",
                    "data": {
                        "id": "odd",
                        "author": "[deleted]",
                        "url": "/r/companion/comments/odd/x/",
                        "created_utc": 1_709_992_800.7,
                        "num_comments": "many"
                    }
                }]
            }
        });
        let post = posts_from_listing(payload).unwrap().remove(0);
        assert_eq!(post.author, None);
        assert_eq!(post.url, "https://www.reddit.com/r/companion/comments/odd/x/");
        assert_eq!(post.permalink, "");
        assert_eq!(post.created_utc, 1_709_992_800);
        assert_eq!(post.score, 0);
        assert_eq!(post.num_comments, None);
    }

    #[test]
    fn links_without_a_creation_time_are_skipped() {
        let payload = json!({
            "data": {
                "children": [
                    { "kind": "t3", "data": { "id": "undated", "score": 3 } },
                    link("dated")
                ]
            }
        });
        let posts = posts_from_listing(payload).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, "dated");
    }

    #[test]
    fn reads_moderator_removal_state() {
        let mut by_flag = link("flag");
        by_flag["data"]["removed"] = json!(true);
        let mut by_name = link("name");
        by_name["data"]["banned_by"] = json!("curator-bot");
        let mut withheld = link("withheld");
        withheld["data"]["banned_by"] = json!(true);
        let mut live = link("live");
        live["data"]["removed"] = json!(false);
        live["data"]["banned_by"] = Value::Null;

        let payload = json!({ "data": { "children": [by_flag, by_name, withheld, live] } });
        let removed: Vec<bool> = posts_from_listing(payload)
            .unwrap()
            .iter()
            .map(|post| post.removed)
            .collect();
        assert_eq!(removed, vec![true, true, true, false]);
    }

    #[test]
    fn removal_reason_body_carries_reason_and_note() {
        let body: Value = serde_json::from_str(&removal_reason_body("t3_abc", "reason-1", "id: abc")).unwrap();
        assert_eq!(
            body,
            json!({ "item_ids": ["t3_abc"], "mod_note": "id: abc", "reason_id": "reason-1" })
        );
    }

    #[test]
    fn removal_message_body_is_public_as_forum() {
        let body: Value = serde_json::from_str(&removal_message_body("t3_abc", "Not funny.\n\nts: 25")).unwrap();
        assert_eq!(body["item_id"], json!(["t3_abc"]));
        assert_eq!(body["message"], "Not funny.\n\nts: 25");
        assert_eq!(body["type"], "public_as_subreddit");
    }

    #[test]
    fn sticky_payload_uses_the_first_page() {
        let payload = json!([
            { "data": { "children": [link("pinned")] } },
            { "data": { "children": [] } }
        ]);
        let posts = posts_from_listing(payload).unwrap();
        assert_eq!(posts[0].id, "pinned");
    }

    #[test]
    fn malformed_listing_is_a_decode_error() {
        let err = posts_from_listing(json!({ "nope": true })).unwrap_err();
        assert!(matches!(err, PlatformError::Decode(_)));
    }

    #[test]
    fn extracts_api_errors() {
        let ok = json!({ "json": { "errors": [], "data": { "id": "new1" } } });
        assert_eq!(api_errors(&ok), None);
        assert_eq!(created_id(&ok).as_deref(), Some("new1"));

        let failed = json!({
            "json": { "errors": [["RATELIMIT", "you are doing that too much", "ratelimit"]] }
        });
        assert_eq!(
            api_errors(&failed).as_deref(),
            Some("RATELIMIT: you are doing that too much: ratelimit")
        );
    }

    #[test]
    fn extracts_comment_id() {
        let payload = json!({
            "json": { "errors": [], "data": { "things": [{ "kind": "t1", "data": { "id": "c1" } }] } }
        });
        assert_eq!(created_id(&payload).as_deref(), Some("c1"));
    }

    #[test]
    fn fullnames() {
        assert_eq!(fullname("abc"), "t3_abc");
        assert_eq!(fullname("t3_abc"), "t3_abc");
    }
}
