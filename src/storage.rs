/// Storage serialization utilities for chrome.storage.sync

use crate::domain::{DomainGate, DomainList, ListMode};
use serde::{Deserialize, Serialize};

pub const KEY_RIGHT_CLICK: &str = "link-right-click";
pub const KEY_LEFT_CLICK_PREVENT_NEW_TAB: &str = "link-left-click-prevent-new-tab";
pub const KEY_LIST_MODE: &str = "domain-list-mode";
pub const KEY_DOMAIN_LIST: &str = "domain-list";
pub const KEY_LEGACY_BLACKLIST: &str = "blacklisted-domains";

/// Keys whose change requires the page agent to re-check its domain gate
pub const DOMAIN_KEYS: [&str; 3] = [KEY_LIST_MODE, KEY_DOMAIN_LIST, KEY_LEGACY_BLACKLIST];

/// How a right-clicked link is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RightClickMode {
    #[default]
    Background,
    Foreground,
}

impl RightClickMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RightClickMode::Background => "back",
            RightClickMode::Foreground => "fore",
        }
    }

    /// Unknown values fall back to opening in the background
    pub fn from_setting(value: &str) -> RightClickMode {
        match value {
            "fore" => RightClickMode::Foreground,
            _ => RightClickMode::Background,
        }
    }

    pub fn opens_active(&self) -> bool {
        matches!(self, RightClickMode::Foreground)
    }
}

impl From<String> for RightClickMode {
    fn from(value: String) -> Self {
        RightClickMode::from_setting(&value)
    }
}

impl From<RightClickMode> for String {
    fn from(mode: RightClickMode) -> Self {
        mode.as_str().to_string()
    }
}

/// User preferences as persisted in storage
///
/// Every field has a default so a record with missing keys still decodes.
/// `Preferences::default()` serializes to the defaults object passed to
/// `storage.sync.get`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(rename = "link-right-click", default)]
    pub right_click: RightClickMode,

    #[serde(rename = "link-left-click-prevent-new-tab", default)]
    pub left_click_prevent_new_tab: bool,

    #[serde(rename = "domain-list-mode", default)]
    pub list_mode: ListMode,

    #[serde(rename = "domain-list", default)]
    pub domain_list: String,
}

impl Preferences {
    pub fn domain_gate(&self) -> DomainGate {
        DomainGate::new(self.list_mode, DomainList::parse(&self.domain_list))
    }
}

/// The part of the record involved in moving off the old blacklist-only key
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LegacyRecord {
    #[serde(rename = "domain-list", default)]
    pub domain_list: String,

    #[serde(rename = "blacklisted-domains", default)]
    pub blacklisted_domains: String,
}

/// Values written once to carry a legacy blacklist over to the domain list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MigrationPatch {
    #[serde(rename = "domain-list")]
    pub domain_list: String,

    #[serde(rename = "domain-list-mode")]
    pub list_mode: ListMode,

    #[serde(rename = "blacklisted-domains")]
    pub blacklisted_domains: String,
}

impl LegacyRecord {
    /// A patch is produced only when the legacy key holds patterns and the
    /// new list is still empty. The legacy key is cleared by the patch.
    pub fn migration(&self) -> Option<MigrationPatch> {
        let legacy = self.blacklisted_domains.trim();
        if legacy.is_empty() || !self.domain_list.trim().is_empty() {
            return None;
        }

        Some(MigrationPatch {
            domain_list: legacy.to_string(),
            list_mode: ListMode::Blacklist,
            blacklisted_domains: String::new(),
        })
    }
}
