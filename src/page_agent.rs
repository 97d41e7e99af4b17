/// Page agent: watches links in the page and forwards clicks to the coordinator

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, EventTarget, HtmlAnchorElement, MouseEvent, MutationObserver, MutationObserverInit};

use crate::click::{
    LeftClickDecision, Modifiers, MouseButton, PointerPos, PointerRelease, RecentRequests, Release,
    classify_release, should_suppress_context_menu,
};
use crate::error::{Error, Result};
use crate::js::{from_js, to_js};
use crate::storage::{DOMAIN_KEYS, KEY_LEFT_CLICK_PREVENT_NEW_TAB, Preferences};
use crate::tab_data::LinkRequest;

// Import JS bridge functions
#[wasm_bindgen(module = "/page_agent.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getSettings(defaults: JsValue) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn sendLinkRequest(request: JsValue) -> std::result::Result<JsValue, JsValue>;

    fn onSettingsChanged(callback: &js_sys::Function);
}

type Shared = Rc<RefCell<AgentState>>;

struct AgentState {
    blocked: bool,
    pressed_at: Option<PointerPos>,
    left_click: LeftClickDecision,
    recent: RecentRequests,
    installed: bool,
    observer: Option<MutationObserver>,
}

impl AgentState {
    fn new() -> Self {
        // Inert until the domain gate has been checked
        AgentState {
            blocked: true,
            pressed_at: None,
            left_click: LeftClickDecision::Unknown,
            recent: RecentRequests::new(),
            installed: false,
            observer: None,
        }
    }

    /// Record the gate result. Returns true exactly once, for the refresh
    /// that has to instrument the page; later refreshes only flip `blocked`.
    fn apply_gate(&mut self, blocked: bool) -> bool {
        self.blocked = blocked;
        if blocked || self.installed {
            return false;
        }
        self.installed = true;
        true
    }
}

/// Listener closures shared by every anchor in the page
struct Listeners {
    mouse_down: Closure<dyn FnMut(MouseEvent)>,
    mouse_up: Closure<dyn FnMut(MouseEvent)>,
    context_menu: Closure<dyn FnMut(MouseEvent)>,
}

impl Listeners {
    fn new(state: &Shared) -> Listeners {
        let on_down = state.clone();
        let on_up = state.clone();
        let on_menu = state.clone();

        Listeners {
            mouse_down: Closure::wrap(Box::new(move |ev: MouseEvent| on_mouse_down(&on_down, &ev))
                as Box<dyn FnMut(MouseEvent)>),
            mouse_up: Closure::wrap(Box::new(move |ev: MouseEvent| on_mouse_up(&on_up, &ev))
                as Box<dyn FnMut(MouseEvent)>),
            context_menu: Closure::wrap(Box::new(move |ev: MouseEvent| on_context_menu(&on_menu, &ev))
                as Box<dyn FnMut(MouseEvent)>),
        }
    }

    fn entries(&self) -> [(&'static str, &js_sys::Function); 3] {
        [
            ("mousedown", self.mouse_down.as_ref().unchecked_ref()),
            ("mouseup", self.mouse_up.as_ref().unchecked_ref()),
            ("contextmenu", self.context_menu.as_ref().unchecked_ref()),
        ]
    }

    /// Remove-then-add so repeated passes never stack duplicate listeners
    fn attach(&self, target: &EventTarget) -> Result<()> {
        for (event, listener) in self.entries() {
            target
                .remove_event_listener_with_callback(event, listener)
                .map_err(Error::bridge)?;
            target
                .add_event_listener_with_callback(event, listener)
                .map_err(Error::bridge)?;
        }
        Ok(())
    }

    fn attach_all(&self, doc: &Document) -> Result<()> {
        let anchors = doc.query_selector_all("a").map_err(Error::bridge)?;
        for i in 0..anchors.length() {
            if let Some(node) = anchors.get(i) {
                self.attach(&node)?;
            }
        }
        Ok(())
    }
}

/// Entry point for the content script
pub fn start() {
    let state: Shared = Rc::new(RefCell::new(AgentState::new()));

    spawn_local(refresh_gate(state.clone()));

    let on_changed = Closure::wrap(Box::new(move |keys: JsValue| {
        let keys: Vec<String> = from_js(keys).unwrap_or_default();

        if keys.iter().any(|key| key == KEY_LEFT_CLICK_PREVENT_NEW_TAB) {
            state.borrow_mut().left_click.invalidate();
        }
        if keys.iter().any(|key| DOMAIN_KEYS.contains(&key.as_str())) {
            spawn_local(refresh_gate(state.clone()));
        }
    }) as Box<dyn FnMut(JsValue)>);

    onSettingsChanged(on_changed.as_ref().unchecked_ref());
    on_changed.forget();
}

fn document() -> Result<Document> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| Error::Bridge("no document".to_string()))
}

fn current_hostname() -> Result<String> {
    let window = web_sys::window().ok_or_else(|| Error::Bridge("no window".to_string()))?;
    window.location().hostname().map_err(Error::bridge)
}

async fn load_preferences() -> Result<Preferences> {
    let settings = getSettings(to_js(&Preferences::default())?)
        .await
        .map_err(Error::bridge)?;
    from_js(settings)
}

/// Re-read the domain list and switch interception on or off for this page
async fn refresh_gate(state: Shared) {
    let blocked = match gate_blocks_page().await {
        Ok(blocked) => blocked,
        Err(e) => {
            warn!("Could not read domain list, leaving links alone: {}", e);
            true
        }
    };

    // Claimed before any await so overlapping refreshes install once
    let needs_install = state.borrow_mut().apply_gate(blocked);

    if needs_install {
        prefetch_left_click(&state).await;
        if let Err(e) = install(&state) {
            warn!("Failed to instrument links: {}", e);
            state.borrow_mut().installed = false;
        }
    }
}

async fn gate_blocks_page() -> Result<bool> {
    let prefs = load_preferences().await?;
    let hostname = current_hostname()?;
    let blocked = prefs.domain_gate().is_blocked(&hostname);
    debug!("Domain gate for {}: blocked={}", hostname, blocked);
    Ok(blocked)
}

/// Attach listeners to every anchor and keep doing so as the page changes
fn install(state: &Shared) -> Result<()> {
    let doc = document()?;
    let listeners = Rc::new(Listeners::new(state));
    listeners.attach_all(&doc)?;

    let observed = listeners.clone();
    let on_mutation = Closure::wrap(Box::new(move |_records: js_sys::Array, _observer: MutationObserver| {
        if let Err(e) = document().and_then(|doc| observed.attach_all(&doc)) {
            warn!("Failed to instrument new links: {}", e);
        }
    }) as Box<dyn FnMut(js_sys::Array, MutationObserver)>);

    let observer = MutationObserver::new(on_mutation.as_ref().unchecked_ref()).map_err(Error::bridge)?;
    on_mutation.forget();

    let options = MutationObserverInit::new();
    options.set_child_list(true);
    options.set_subtree(true);

    let root = doc
        .document_element()
        .ok_or_else(|| Error::Bridge("no document element".to_string()))?;
    observer
        .observe_with_options(&root, &options)
        .map_err(Error::bridge)?;

    state.borrow_mut().observer = Some(observer);
    Ok(())
}

/// Ask the coordinator whether left clicks stay in the current tab, caching the answer
async fn prefetch_left_click(state: &Shared) -> bool {
    if let LeftClickDecision::Known(keep) = state.borrow().left_click {
        return keep;
    }

    let answer = match to_js(&LinkRequest::left()) {
        Ok(request) => sendLinkRequest(request).await.map_err(Error::bridge),
        Err(e) => Err(e),
    };

    let mut st = state.borrow_mut();
    match answer {
        Ok(value) => {
            let keep = value.as_bool().unwrap_or(false);
            st.left_click = LeftClickDecision::Known(keep);
            keep
        }
        Err(e) => {
            warn!("Extension background unresponsive: {}", e);
            st.left_click.invalidate();
            false
        }
    }
}

fn modifiers(ev: &MouseEvent) -> Modifiers {
    Modifiers {
        alt: ev.alt_key(),
        shift: ev.shift_key(),
        ctrl: ev.ctrl_key(),
    }
}

fn strip_target(anchor: &Element) {
    if let Err(e) = anchor.remove_attribute("target") {
        warn!("Failed to remove link target: {:?}", e);
    }
}

fn on_mouse_down(state: &Shared, ev: &MouseEvent) {
    let decision = {
        let mut st = state.borrow_mut();
        if st.blocked {
            return;
        }
        st.pressed_at = Some(PointerPos {
            x: ev.screen_x() as f64,
            y: ev.screen_y() as f64,
        });
        st.left_click
    };

    if MouseButton::from_code(ev.button()) != MouseButton::Left {
        return;
    }

    let Some(anchor) = ev.current_target().and_then(|t| t.dyn_into::<Element>().ok()) else {
        return;
    };

    match decision {
        LeftClickDecision::Known(keep) => {
            if keep {
                strip_target(&anchor);
            }
        }
        // The first click may lose the race against the default action
        LeftClickDecision::Unknown => {
            let state = state.clone();
            spawn_local(async move {
                if prefetch_left_click(&state).await {
                    strip_target(&anchor);
                }
            });
        }
    }
}

fn on_mouse_up(state: &Shared, ev: &MouseEvent) {
    let mut st = state.borrow_mut();
    if st.blocked {
        return;
    }

    let release = PointerRelease {
        button: MouseButton::from_code(ev.button()),
        modifiers: modifiers(ev),
        position: PointerPos {
            x: ev.screen_x() as f64,
            y: ev.screen_y() as f64,
        },
        href: ev
            .current_target()
            .and_then(|t| t.dyn_into::<HtmlAnchorElement>().ok())
            .map(|anchor| anchor.href()),
    };

    let url = match classify_release(st.pressed_at, &release) {
        Release::Open { url } => url,
        Release::Ignore(reason) => {
            debug!("Ignoring release: {:?}", reason);
            return;
        }
    };

    if !st.recent.admit(&url, release.button, js_sys::Date::now()) {
        debug!("Dropping duplicate request for {}", url);
        return;
    }
    drop(st);

    ev.prevent_default();

    let state = state.clone();
    spawn_local(async move {
        let sent = match to_js(&LinkRequest::right(url)) {
            Ok(request) => sendLinkRequest(request).await.map_err(Error::bridge),
            Err(e) => Err(e),
        };
        if let Err(e) = sent {
            warn!("Failed to open link, extension background unresponsive: {}", e);
            state.borrow_mut().left_click.invalidate();
        }
    });
}

fn on_context_menu(state: &Shared, ev: &MouseEvent) {
    let blocked = state.borrow().blocked;
    if should_suppress_context_menu(blocked, modifiers(ev)) {
        ev.prevent_default();
    }
}
