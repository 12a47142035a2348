//! Boundary models forwarded verbatim to the externally loaded widget.
//!
//! Field names serialize in the camelCase wire form the widget runtime
//! expects; none of these shapes are validated before forwarding.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Company descriptor optionally nested inside [`UserIdentity`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    /// Stable company identifier in the host application's terms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    /// Display name for the company.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Visitor identity attributes passed to `identify`/`setUser`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    /// Stable visitor identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Display name for the visitor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Visitor email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Company the visitor belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanyInfo>,
}

/// Support ticket payload passed to `createTicket`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketData {
    /// Requester first name.
    pub first_name: String,
    /// Requester email address.
    pub email: String,
    /// The ticket body/question text.
    pub query: String,
    /// Free-form extension payload forwarded untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

/// Visitor activity record passed to `logActivity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityData {
    /// Activity category string.
    #[serde(rename = "type")]
    pub activity_type: String,
    /// Open string-keyed attribute map, flattened on the wire.
    #[serde(flatten)]
    pub values: BTreeMap<String, Value>,
}

/// One entry of a locally composed message list shown by invite/campaign
/// overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalMessage {
    /// Message body text.
    pub text: String,
}

/// Column layout for a tracker embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackerDisplayMode {
    /// Flat list layout.
    List,
    /// Kanban board layout.
    Kanban,
}

/// Tagged embed configuration passed to `showEmbed`.
///
/// The `type` tag and camelCase field names are a wire contract with the
/// external widget runtime and must round-trip exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EmbedConfig {
    /// Knowledge-base embed, optionally opened on a specific article.
    #[serde(rename = "KB", rename_all = "camelCase")]
    Kb {
        /// Portal the knowledge base is served from.
        portal_url: String,
        /// Article to open instead of the KB landing view.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        article_id: Option<String>,
    },
    /// Issue-tracker embed.
    #[serde(rename = "TRACKERS", rename_all = "camelCase")]
    Trackers {
        /// Portal the tracker is served from.
        portal_url: String,
        /// Tracker to display.
        tracker_id: String,
        /// Column layout for the tracker view.
        mode: TrackerDisplayMode,
    },
    /// Newsfeed embed, optionally opened on a specific post.
    #[serde(rename = "NEWSFEED", rename_all = "camelCase")]
    Newsfeed {
        /// Portal the newsfeed is served from.
        portal_url: String,
        /// Post to open instead of the feed view.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        post_id: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn trackers_embed_wire_shape_round_trips_exactly() {
        let config = EmbedConfig::Trackers {
            portal_url: "https://portal.example.com".to_string(),
            tracker_id: "tracker-7".to_string(),
            mode: TrackerDisplayMode::Kanban,
        };

        let wire = serde_json::to_value(&config).expect("serialize embed");
        assert_eq!(
            wire,
            json!({
                "type": "TRACKERS",
                "portalUrl": "https://portal.example.com",
                "trackerId": "tracker-7",
                "mode": "kanban",
            })
        );

        let parsed: EmbedConfig = serde_json::from_value(wire).expect("deserialize embed");
        assert_eq!(parsed, config);
    }

    #[test]
    fn kb_embed_omits_absent_article_id() {
        let config = EmbedConfig::Kb {
            portal_url: "https://portal.example.com".to_string(),
            article_id: None,
        };
        assert_eq!(
            serde_json::to_value(&config).expect("serialize embed"),
            json!({ "type": "KB", "portalUrl": "https://portal.example.com" })
        );
    }

    #[test]
    fn newsfeed_embed_carries_post_id_when_present() {
        let config = EmbedConfig::Newsfeed {
            portal_url: "https://portal.example.com".to_string(),
            post_id: Some("post-3".to_string()),
        };
        assert_eq!(
            serde_json::to_value(&config).expect("serialize embed"),
            json!({
                "type": "NEWSFEED",
                "portalUrl": "https://portal.example.com",
                "postId": "post-3",
            })
        );
    }

    #[test]
    fn activity_values_flatten_next_to_the_type_tag() {
        let mut values = BTreeMap::new();
        values.insert("plan".to_string(), json!("pro"));
        values.insert("seats".to_string(), json!(4));
        let activity = ActivityData {
            activity_type: "upgrade".to_string(),
            values,
        };

        assert_eq!(
            serde_json::to_value(&activity).expect("serialize activity"),
            json!({ "type": "upgrade", "plan": "pro", "seats": 4 })
        );
    }

    #[test]
    fn user_identity_skips_absent_fields() {
        let user = UserIdentity {
            user_id: Some("u-1".to_string()),
            company: Some(CompanyInfo {
                company_id: Some("c-1".to_string()),
                name: None,
            }),
            ..UserIdentity::default()
        };
        assert_eq!(
            serde_json::to_value(&user).expect("serialize identity"),
            json!({ "userId": "u-1", "company": { "companyId": "c-1" } })
        );
    }

    #[test]
    fn ticket_meta_is_forwarded_untouched() {
        let ticket = TicketData {
            first_name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            query: "widget misbehaves".to_string(),
            meta: Some(json!({ "browser": "firefox" })),
        };
        assert_eq!(
            serde_json::to_value(&ticket).expect("serialize ticket"),
            json!({
                "firstName": "Ada",
                "email": "ada@example.com",
                "query": "widget misbehaves",
                "meta": { "browser": "firefox" },
            })
        );
    }

    #[test]
    fn local_message_list_serializes_as_text_objects() {
        let messages = vec![
            LocalMessage {
                text: "Hi there!".to_string(),
            },
            LocalMessage {
                text: "Need a hand?".to_string(),
            },
        ];
        assert_eq!(
            serde_json::to_value(&messages).expect("serialize messages"),
            json!([{ "text": "Hi there!" }, { "text": "Need a hand?" }])
        );
    }
}
