/// Coordinator: answers link requests and creates tabs

use std::cell::RefCell;

use log::{debug, error, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

use crate::coordinator::{self, LeftClickOutcome};
use crate::error::{Error, Result};
use crate::js::{from_js, to_js};
use crate::operations::PlacementCache;
use crate::storage::{LegacyRecord, Preferences};
use crate::tab_data::{ActiveTab, LinkRequest, TabActivation};

// Import JS bridge functions
#[wasm_bindgen(module = "/background.js")]
extern "C" {
    fn onLinkRequest(handler: &js_sys::Function);

    fn onTabActivated(callback: &js_sys::Function);

    #[wasm_bindgen(catch)]
    async fn getSettings(defaults: JsValue) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setSettings(values: JsValue) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryActiveTab() -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn createTab(params: JsValue) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn updateCurrentTab(url: &str) -> std::result::Result<(), JsValue>;
}

thread_local! {
    // Loaded from storage on first use; the background context may be
    // unloaded between clicks.
    static PLACEMENT: RefCell<Option<PlacementCache>> = const { RefCell::new(None) };
}

/// Entry point for the background script
pub fn start() {
    let handler = Closure::wrap(Box::new(move |request: JsValue| -> js_sys::Promise {
        future_to_promise(async move { Ok(JsValue::from_bool(handle_request(request).await)) })
    }) as Box<dyn FnMut(JsValue) -> js_sys::Promise>);

    onLinkRequest(handler.as_ref().unchecked_ref());
    handler.forget();

    let on_activated = Closure::wrap(Box::new(move |info: JsValue| {
        spawn_local(async move {
            if let Err(e) = reset_placement(info).await {
                warn!("Failed to reset tab placement: {}", e);
            }
        });
    }) as Box<dyn FnMut(JsValue)>);

    onTabActivated(on_activated.as_ref().unchecked_ref());
    on_activated.forget();

    spawn_local(async {
        if let Err(e) = migrate_legacy_settings().await {
            warn!("Failed to migrate legacy blacklist: {}", e);
        }
    });
}

/// Decode and service one message. Anything unexpected answers `false`.
async fn handle_request(request: JsValue) -> bool {
    let request: LinkRequest = match from_js(request) {
        Ok(request) => request,
        Err(e) => {
            debug!("Ignoring unrecognised message: {}", e);
            return false;
        }
    };

    let result = match &request {
        LinkRequest::Right { url } => open_in_new_tab(url).await,
        LinkRequest::Left { url } => answer_left_click(url.as_deref()).await,
    };

    result.unwrap_or_else(|e| {
        error!("Failed to handle {} click: {}", request.button(), e);
        false
    })
}

async fn load_preferences() -> Result<Preferences> {
    let settings = getSettings(to_js(&Preferences::default())?)
        .await
        .map_err(Error::bridge)?;
    from_js(settings)
}

async fn load_placement() -> Result<PlacementCache> {
    let stored = getSettings(to_js(&PlacementCache::default())?)
        .await
        .map_err(Error::bridge)?;
    from_js(stored)
}

async fn save_placement(cache: &PlacementCache) -> Result<()> {
    setSettings(to_js(cache)?).await.map_err(Error::bridge)
}

async fn active_tab() -> Result<Option<ActiveTab>> {
    let tab = queryActiveTab().await.map_err(Error::bridge)?;
    if tab.is_null() || tab.is_undefined() {
        return Ok(None);
    }
    Ok(Some(from_js(tab)?))
}

async fn answer_left_click(url: Option<&str>) -> Result<bool> {
    let prefs = load_preferences().await?;

    match coordinator::answer_left(&prefs, url) {
        LeftClickOutcome::Reply(keep) => Ok(keep),
        LeftClickOutcome::Navigate { url } => {
            updateCurrentTab(&url).await.map_err(Error::bridge)?;
            Ok(true)
        }
    }
}

async fn open_in_new_tab(url: &str) -> Result<bool> {
    let prefs = load_preferences().await?;
    let source = active_tab().await?;

    let persisted = if PLACEMENT.with(|cell| cell.borrow().is_none()) {
        Some(load_placement().await?)
    } else {
        None
    };

    // No await between reading and advancing the counter
    let (params, previous, snapshot) = PLACEMENT.with(|cell| {
        let mut cell = cell.borrow_mut();
        let cache = cell.get_or_insert_with(|| persisted.unwrap_or_default());
        let previous = cache.clone();
        let params = coordinator::plan_right(&prefs, cache, source.as_ref(), url)?;
        Ok::<_, Error>((params, previous, cache.clone()))
    })?;

    debug!("Opening {} at index {} (active={})", params.url, params.index, params.active);
    let created = match to_js(&params) {
        Ok(value) => createTab(value).await.map_err(Error::bridge),
        Err(e) => Err(e),
    };
    if let Err(e) = created {
        // The counter only advances for tabs that exist
        PLACEMENT.with(|cell| {
            if let Some(cache) = cell.borrow_mut().as_mut() {
                cache.cancel(&snapshot, previous);
            }
        });
        return Err(e);
    }

    save_placement(&snapshot).await?;
    Ok(true)
}

async fn reset_placement(info: JsValue) -> Result<()> {
    let activation: TabActivation = from_js(info)?;

    let snapshot = PLACEMENT.with(|cell| {
        let mut cell = cell.borrow_mut();
        let cache = cell.get_or_insert_with(PlacementCache::default);
        cache.focus_changed(activation);
        cache.clone()
    });

    save_placement(&snapshot).await
}

async fn migrate_legacy_settings() -> Result<()> {
    let stored = getSettings(to_js(&LegacyRecord::default())?)
        .await
        .map_err(Error::bridge)?;
    let record: LegacyRecord = from_js(stored)?;

    if let Some(patch) = record.migration() {
        info!("Moving legacy blacklist to the domain list");
        setSettings(to_js(&patch)?).await.map_err(Error::bridge)?;
    }
    Ok(())
}
