/// Request handling for the background coordinator
///
/// The browser calls live in `background`; this module only decides what
/// those calls should be.

use crate::error::{Error, Result};
use crate::operations::PlacementCache;
use crate::storage::Preferences;
use crate::tab_data::{ActiveTab, CreateTabParams};

/// What the background glue has to do to finish a left-click request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeftClickOutcome {
    Reply(bool),
    Navigate { url: String },
}

/// Answer a left-click request with the stored preference
///
/// A request that carries a URL is navigated in the current tab when the
/// preference is on; the reply is `true` in that case.
pub fn answer_left(prefs: &Preferences, url: Option<&str>) -> LeftClickOutcome {
    match url {
        Some(url) if prefs.left_click_prevent_new_tab => LeftClickOutcome::Navigate { url: url.to_string() },
        _ => LeftClickOutcome::Reply(prefs.left_click_prevent_new_tab),
    }
}

/// Plan the tab for a right-clicked link
///
/// Fails without touching the cache when the browser reported no active tab.
pub fn plan_right(
    prefs: &Preferences,
    cache: &mut PlacementCache,
    active_tab: Option<&ActiveTab>,
    url: &str,
) -> Result<CreateTabParams> {
    let source = active_tab.ok_or(Error::NoActiveTab)?;
    Ok(cache.place(source, prefs.right_click, url))
}
