/// Link Tab Opener - browser extension that opens right-clicked links in new tabs
/// Built with Rust + WASM + Yew

pub mod click;
pub mod coordinator;
pub mod domain;
pub mod error;
pub mod operations;
pub mod storage;
pub mod tab_data;
mod background;
mod js;
mod page_agent;
pub mod ui;

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Content script: intercept link clicks in the page
#[wasm_bindgen]
pub fn start_page_agent() {
    page_agent::start();
}

// Background script: answer link requests and open tabs
#[wasm_bindgen]
pub fn start_coordinator() {
    background::start();
}

// Start the Yew app for the options page
#[wasm_bindgen]
pub fn start_options() {
    yew::Renderer::<ui::options::OptionsPage>::new().render();
}

// Exposed for scripts that need the same domain gate as the page agent
#[wasm_bindgen]
pub fn is_host_blocked(domain_list: &str, list_mode: &str, hostname: &str) -> bool {
    domain::DomainGate::new(
        domain::ListMode::from_setting(list_mode),
        domain::DomainList::parse(domain_list),
    )
    .is_blocked(hostname)
}
