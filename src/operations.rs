/// Tab placement for right-clicked links

use crate::storage::RightClickMode;
use crate::tab_data::{ActiveTab, CreateTabParams, TabActivation};
use serde::{Deserialize, Serialize};

/// Counter of tabs opened from the same source tab
///
/// Persisted under `increment`, `activeTabId` and `activeWindowId` so it
/// survives the background context being unloaded between clicks.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementCache {
    #[serde(default)]
    pub increment: i32,
    #[serde(default)]
    pub active_tab_id: Option<i32>,
    #[serde(default)]
    pub active_window_id: Option<i32>,
}

impl PlacementCache {
    fn tracks(&self, tab_id: i32, window_id: i32) -> bool {
        self.active_tab_id == Some(tab_id) && self.active_window_id == Some(window_id)
    }

    /// Compute where the next tab opened from `source` goes and advance the counter
    pub fn place(&mut self, source: &ActiveTab, mode: RightClickMode, url: &str) -> CreateTabParams {
        if !self.tracks(source.id, source.window_id) {
            self.increment = 0;
        }

        self.increment += 1;
        self.active_tab_id = Some(source.id);
        self.active_window_id = Some(source.window_id);

        CreateTabParams {
            url: url.to_string(),
            active: mode.opens_active(),
            index: source.index + self.increment,
            opener_tab_id: source.id,
            cookie_store_id: source.cookie_store_id.clone(),
        }
    }

    /// Undo a placement whose tab was never created
    ///
    /// Only restores `previous` while the cache still holds `planned`; a
    /// placement made in the meantime is left alone.
    pub fn cancel(&mut self, planned: &PlacementCache, previous: PlacementCache) -> bool {
        if self != planned {
            return false;
        }
        *self = previous;
        true
    }

    /// Tab focus moved; start counting again from the new tab
    pub fn focus_changed(&mut self, activation: TabActivation) {
        self.increment = 0;
        self.active_tab_id = Some(activation.tab_id);
        self.active_window_id = Some(activation.window_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source_tab(id: i32, index: i32, window_id: i32) -> ActiveTab {
        ActiveTab {
            id,
            index,
            window_id,
            cookie_store_id: None,
        }
    }

    #[test]
    fn test_first_placement() {
        let mut cache = PlacementCache::default();
        let params = cache.place(&source_tab(1, 5, 1), RightClickMode::Background, "https://example.com/");

        assert_eq!(params.index, 6);
        assert!(!params.active);
        assert_eq!(params.opener_tab_id, 1);
        assert_eq!(params.url, "https://example.com/");
    }

    #[test]
    fn test_rapid_clicks_insert_sequentially() {
        let mut cache = PlacementCache::default();
        let tab = source_tab(1, 5, 1);

        let indices: Vec<i32> = (0..4)
            .map(|_| cache.place(&tab, RightClickMode::Background, "https://example.com/").index)
            .collect();

        assert_eq!(indices, vec![6, 7, 8, 9]);
        assert_eq!(cache.increment, 4);
    }

    #[test]
    fn test_foreground_mode_activates() {
        let mut cache = PlacementCache::default();
        let params = cache.place(&source_tab(1, 0, 1), RightClickMode::Foreground, "https://example.com/");

        assert!(params.active);
    }

    #[test]
    fn test_focus_change_resets_counter() {
        let mut cache = PlacementCache::default();
        let tab = source_tab(1, 5, 1);
        cache.place(&tab, RightClickMode::Background, "https://a.example/");
        cache.place(&tab, RightClickMode::Background, "https://b.example/");

        cache.focus_changed(TabActivation { tab_id: 1, window_id: 1 });

        let params = cache.place(&tab, RightClickMode::Background, "https://c.example/");
        assert_eq!(params.index, 6);
    }

    #[test]
    fn test_different_source_tab_restarts() {
        let mut cache = PlacementCache::default();
        cache.place(&source_tab(1, 5, 1), RightClickMode::Background, "https://a.example/");
        cache.place(&source_tab(1, 5, 1), RightClickMode::Background, "https://b.example/");

        let params = cache.place(&source_tab(2, 0, 1), RightClickMode::Background, "https://c.example/");
        assert_eq!(params.index, 1);
        assert_eq!(params.opener_tab_id, 2);
    }

    #[test]
    fn test_same_tab_id_other_window_restarts() {
        let mut cache = PlacementCache::default();
        cache.place(&source_tab(1, 5, 1), RightClickMode::Background, "https://a.example/");

        let params = cache.place(&source_tab(1, 5, 2), RightClickMode::Background, "https://b.example/");
        assert_eq!(params.index, 6);
    }

    #[test]
    fn test_container_carried_over() {
        let mut cache = PlacementCache::default();
        let tab = ActiveTab {
            cookie_store_id: Some("firefox-container-1".to_string()),
            ..source_tab(3, 2, 1)
        };

        let params = cache.place(&tab, RightClickMode::Background, "https://example.com/");
        assert_eq!(params.cookie_store_id.as_deref(), Some("firefox-container-1"));
    }

    #[test]
    fn test_failed_creation_does_not_skip_index() {
        let mut cache = PlacementCache::default();
        let tab = source_tab(1, 5, 1);

        let previous = cache.clone();
        let failed = cache.place(&tab, RightClickMode::Background, "https://a.example/");
        assert_eq!(failed.index, 6);
        let planned = cache.clone();

        assert!(cache.cancel(&planned, previous));

        let params = cache.place(&tab, RightClickMode::Background, "https://a.example/");
        assert_eq!(params.index, 6);
    }

    #[test]
    fn test_cancel_keeps_later_placement() {
        let mut cache = PlacementCache::default();
        let tab = source_tab(1, 5, 1);

        let previous = cache.clone();
        cache.place(&tab, RightClickMode::Background, "https://a.example/");
        let planned = cache.clone();
        cache.place(&tab, RightClickMode::Background, "https://b.example/");

        assert!(!cache.cancel(&planned, previous));
        assert_eq!(cache.increment, 2);
    }

    #[test]
    fn test_persisted_shape() {
        let mut cache = PlacementCache::default();
        cache.place(&source_tab(7, 0, 3), RightClickMode::Background, "https://example.com/");

        assert_eq!(
            serde_json::to_value(&cache).unwrap(),
            json!({ "increment": 1, "activeTabId": 7, "activeWindowId": 3 })
        );

        let restored: PlacementCache =
            serde_json::from_value(json!({ "increment": 0, "activeTabId": null, "activeWindowId": null })).unwrap();
        assert_eq!(restored, PlacementCache::default());
    }
}
