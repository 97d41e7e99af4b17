/// Options page for Link Tab Opener

use patternfly_yew::prelude::{Alert, AlertType, Spinner};
use serde_json::{Value, json};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::domain::{DomainList, ListMode, hostname_of};
use crate::error::{Error, Result};
use crate::js::{from_js, to_js};
use crate::storage::{
    KEY_DOMAIN_LIST, KEY_LEFT_CLICK_PREVENT_NEW_TAB, KEY_LIST_MODE, KEY_RIGHT_CLICK, Preferences, RightClickMode,
};
use crate::ui::components::{CheckboxField, SelectField, TextAreaField};

// Import JS bridge functions
#[wasm_bindgen(module = "/options.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getSettings(defaults: JsValue) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setSettings(values: JsValue) -> std::result::Result<(), JsValue>;
}

#[derive(Clone, PartialEq)]
enum PageState {
    Loading,
    Ready,
    Error(String),
}

#[function_component(OptionsPage)]
pub fn options_page() -> Html {
    let state = use_state(|| PageState::Loading);
    let prefs = use_state(Preferences::default);
    let site_query = use_state(String::new);

    // Load settings on mount
    {
        let state = state.clone();
        let prefs = prefs.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                match load_preferences().await {
                    Ok(loaded) => {
                        prefs.set(loaded);
                        state.set(PageState::Ready);
                    }
                    Err(e) => {
                        state.set(PageState::Error(format!("Failed to load settings: {}", e)));
                    }
                }
            });
            || ()
        });
    }

    // Each control writes only its own key
    let save = {
        let state = state.clone();
        move |key: &'static str, value: Value| {
            let state = state.clone();
            spawn_local(async move {
                if let Err(e) = save_setting(key, value).await {
                    state.set(PageState::Error(format!("Failed to save: {}", e)));
                }
            });
        }
    };

    let on_right_click = {
        let prefs = prefs.clone();
        let save = save.clone();
        Callback::from(move |value: String| {
            let mode = RightClickMode::from_setting(&value);
            prefs.set(Preferences { right_click: mode, ..(*prefs).clone() });
            save(KEY_RIGHT_CLICK, json!(mode.as_str()));
        })
    };

    let on_left_click = {
        let prefs = prefs.clone();
        let save = save.clone();
        Callback::from(move |checked: bool| {
            prefs.set(Preferences { left_click_prevent_new_tab: checked, ..(*prefs).clone() });
            save(KEY_LEFT_CLICK_PREVENT_NEW_TAB, json!(checked));
        })
    };

    let on_list_mode = {
        let prefs = prefs.clone();
        let save = save.clone();
        Callback::from(move |value: String| {
            let mode = ListMode::from_setting(&value);
            prefs.set(Preferences { list_mode: mode, ..(*prefs).clone() });
            save(KEY_LIST_MODE, json!(mode.as_str()));
        })
    };

    let on_domain_list = {
        let prefs = prefs.clone();
        Callback::from(move |text: String| {
            let text = text.trim().to_string();
            prefs.set(Preferences { domain_list: text.clone(), ..(*prefs).clone() });
            save(KEY_DOMAIN_LIST, json!(text));
        })
    };

    let on_site_query = {
        let site_query = site_query.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                site_query.set(input.value());
            }
        })
    };

    let busy = matches!(*state, PageState::Loading);
    let pattern_count = DomainList::parse(&prefs.domain_list).len();
    let list_helper = format!(
        "One domain per line. Prefix with * to include subdomains (*.example.com). {} pattern(s).",
        pattern_count
    );

    html! {
        <div class="padding-20">
            <h1 class="options-title">{"Link Tab Opener"}</h1>

            {match &*state {
                PageState::Loading => html! {
                    <div class="loading-text-center">
                        <Spinner />
                    </div>
                },
                PageState::Error(err) => html! {
                    <Alert r#type={AlertType::Warning} title={err.clone()} inline={true}>
                    </Alert>
                },
                PageState::Ready => html! {},
            }}

            <div class="pf-v5-c-form">
                <SelectField
                    id="link-right-click"
                    label="Right-click on a link opens it in"
                    options={vec![
                        (AttrValue::from("back"), AttrValue::from("a new background tab")),
                        (AttrValue::from("fore"), AttrValue::from("a new foreground tab")),
                    ]}
                    value={AttrValue::from(prefs.right_click.as_str())}
                    onchange={on_right_click}
                    disabled={busy}
                />

                <CheckboxField
                    id="link-left-click-prevent-new-tab"
                    label="Keep left-clicked links in the current tab"
                    checked={prefs.left_click_prevent_new_tab}
                    onchange={on_left_click}
                    disabled={busy}
                />

                <SelectField
                    id="domain-list-mode"
                    label="Domain list"
                    options={vec![
                        (AttrValue::from("blacklist"), AttrValue::from("Disable on listed sites")),
                        (AttrValue::from("whitelist"), AttrValue::from("Enable only on listed sites")),
                    ]}
                    value={AttrValue::from(prefs.list_mode.as_str())}
                    onchange={on_list_mode}
                    disabled={busy}
                />

                <TextAreaField
                    id="domain-list"
                    label="Sites"
                    value={AttrValue::from(prefs.domain_list.clone())}
                    onchange={on_domain_list}
                    helper={AttrValue::from(list_helper)}
                    disabled={busy}
                />

                <div class="pf-v5-c-form__group">
                    <label class="pf-v5-c-form__label" for="site-check">
                        <span class="pf-v5-c-form__label-text">{"Check a site"}</span>
                    </label>
                    <input
                        id="site-check"
                        class="pf-v5-c-form-control"
                        type="text"
                        placeholder="https://news.example.com/"
                        value={(*site_query).clone()}
                        oninput={on_site_query}
                    />
                    {site_status(&prefs, &site_query)}
                </div>
            </div>
        </div>
    }
}

fn site_status(prefs: &Preferences, query: &str) -> Html {
    let query = query.trim();
    if query.is_empty() {
        return html! {};
    }

    let host = hostname_of(query).unwrap_or_else(|| query.to_lowercase());
    let message = if prefs.domain_gate().is_blocked(&host) {
        format!("Links on {} keep the browser's default behavior", host)
    } else {
        format!("Links on {} are handled by Link Tab Opener", host)
    };

    html! { <p class="pf-v5-c-form__helper-text site-status">{message}</p> }
}

async fn load_preferences() -> Result<Preferences> {
    let settings = getSettings(to_js(&Preferences::default())?)
        .await
        .map_err(Error::bridge)?;
    from_js(settings)
}

async fn save_setting(key: &'static str, value: Value) -> Result<()> {
    let mut record = serde_json::Map::new();
    record.insert(key.to_string(), value);
    setSettings(to_js(&record)?).await.map_err(Error::bridge)
}
