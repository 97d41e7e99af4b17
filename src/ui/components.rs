/// Reusable form fields for the options page

use web_sys::{HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct SelectFieldProps {
    pub id: AttrValue,
    pub label: AttrValue,
    /// (value, label) pairs
    pub options: Vec<(AttrValue, AttrValue)>,
    pub value: AttrValue,
    pub onchange: Callback<String>,
    #[prop_or(false)]
    pub disabled: bool,
}

#[function_component(SelectField)]
pub fn select_field(props: &SelectFieldProps) -> Html {
    let onchange = {
        let onchange = props.onchange.clone();
        Callback::from(move |e: Event| {
            if let Some(select) = e.target_dyn_into::<HtmlSelectElement>() {
                onchange.emit(select.value());
            }
        })
    };

    html! {
        <div class="pf-v5-c-form__group">
            <label class="pf-v5-c-form__label" for={props.id.clone()}>
                <span class="pf-v5-c-form__label-text">{&props.label}</span>
            </label>
            <select
                id={props.id.clone()}
                class="pf-v5-c-form-control"
                disabled={props.disabled}
                {onchange}
            >
                {for props.options.iter().map(|(value, label)| html! {
                    <option value={value.clone()} selected={*value == props.value}>{label}</option>
                })}
            </select>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct CheckboxFieldProps {
    pub id: AttrValue,
    pub label: AttrValue,
    pub checked: bool,
    pub onchange: Callback<bool>,
    #[prop_or(false)]
    pub disabled: bool,
}

#[function_component(CheckboxField)]
pub fn checkbox_field(props: &CheckboxFieldProps) -> Html {
    let onchange = {
        let onchange = props.onchange.clone();
        Callback::from(move |e: Event| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                onchange.emit(input.checked());
            }
        })
    };

    html! {
        <div class="pf-v5-c-check">
            <input
                type="checkbox"
                class="pf-v5-c-check__input"
                id={props.id.clone()}
                checked={props.checked}
                disabled={props.disabled}
                {onchange}
            />
            <label class="pf-v5-c-check__label" for={props.id.clone()}>{&props.label}</label>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct TextAreaFieldProps {
    pub id: AttrValue,
    pub label: AttrValue,
    pub value: AttrValue,
    pub onchange: Callback<String>,
    #[prop_or_default]
    pub helper: Option<AttrValue>,
    #[prop_or(false)]
    pub disabled: bool,
}

#[function_component(TextAreaField)]
pub fn text_area_field(props: &TextAreaFieldProps) -> Html {
    let onchange = {
        let onchange = props.onchange.clone();
        Callback::from(move |e: Event| {
            if let Some(area) = e.target_dyn_into::<HtmlTextAreaElement>() {
                onchange.emit(area.value());
            }
        })
    };

    html! {
        <div class="pf-v5-c-form__group">
            <label class="pf-v5-c-form__label" for={props.id.clone()}>
                <span class="pf-v5-c-form__label-text">{&props.label}</span>
            </label>
            <textarea
                id={props.id.clone()}
                class="pf-v5-c-form-control domain-list"
                rows="8"
                value={props.value.clone()}
                disabled={props.disabled}
                {onchange}
            />
            if let Some(helper) = &props.helper {
                <p class="pf-v5-c-form__helper-text">{helper}</p>
            }
        </div>
    }
}
