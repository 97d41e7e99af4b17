/// Messages and tab records exchanged with the browser
use serde::{Deserialize, Serialize};

/// Request sent by the page agent to the coordinator
///
/// On the wire this is `{ "button": "right", "url": ... }` or
/// `{ "button": "left" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "button", rename_all = "lowercase")]
pub enum LinkRequest {
    Right {
        url: String,
    },
    Left {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
}

impl LinkRequest {
    pub fn right(url: impl Into<String>) -> LinkRequest {
        LinkRequest::Right { url: url.into() }
    }

    pub fn left() -> LinkRequest {
        LinkRequest::Left { url: None }
    }

    pub fn button(&self) -> &'static str {
        match self {
            LinkRequest::Right { .. } => "right",
            LinkRequest::Left { .. } => "left",
        }
    }
}

/// The focused tab of the focused window, as returned by `tabs.query`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTab {
    pub id: i32,
    pub index: i32,
    pub window_id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie_store_id: Option<String>,
}

/// Arguments for `tabs.create`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTabParams {
    pub url: String,
    pub active: bool,
    pub index: i32,
    pub opener_tab_id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie_store_id: Option<String>,
}

/// Payload of the `tabs.onActivated` notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabActivation {
    pub tab_id: i32,
    pub window_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_right_request() {
        let request: LinkRequest =
            serde_json::from_value(json!({ "button": "right", "url": "https://example.com/" })).unwrap();

        assert_eq!(request, LinkRequest::right("https://example.com/"));
        assert_eq!(request.button(), "right");
    }

    #[test]
    fn test_decode_left_request() {
        let request: LinkRequest = serde_json::from_value(json!({ "button": "left" })).unwrap();
        assert_eq!(request, LinkRequest::left());

        let with_url: LinkRequest =
            serde_json::from_value(json!({ "button": "left", "url": "https://example.com/a" })).unwrap();
        assert_eq!(with_url, LinkRequest::Left { url: Some("https://example.com/a".to_string()) });
    }

    #[test]
    fn test_malformed_requests_rejected() {
        for value in [
            json!({ "button": "middle", "url": "https://example.com/" }),
            json!({ "button": "right" }),
            json!({ "url": "https://example.com/" }),
            json!("right"),
            json!(null),
        ] {
            assert!(serde_json::from_value::<LinkRequest>(value).is_err());
        }
    }

    #[test]
    fn test_encode_left_request() {
        assert_eq!(serde_json::to_value(LinkRequest::left()).unwrap(), json!({ "button": "left" }));
    }

    #[test]
    fn test_decode_browser_tab() {
        let tab: ActiveTab = serde_json::from_value(json!({
            "id": 12,
            "index": 3,
            "windowId": 1,
            "active": true,
            "pinned": false,
            "url": "https://example.com/",
            "cookieStoreId": "firefox-container-2",
        }))
        .unwrap();

        assert_eq!(tab.id, 12);
        assert_eq!(tab.index, 3);
        assert_eq!(tab.window_id, 1);
        assert_eq!(tab.cookie_store_id.as_deref(), Some("firefox-container-2"));
    }

    #[test]
    fn test_create_params_omit_missing_container() {
        let params = CreateTabParams {
            url: "https://example.com/".to_string(),
            active: false,
            index: 6,
            opener_tab_id: 1,
            cookie_store_id: None,
        };

        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({ "url": "https://example.com/", "active": false, "index": 6, "openerTabId": 1 })
        );
    }
}
