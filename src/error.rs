/// Error type shared by the page agent, the coordinator and the options page
use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("no active tab in the focused window")]
    NoActiveTab,

    #[error("browser bridge call failed: {0}")]
    Bridge(String),

    #[error("failed to decode value: {0}")]
    Decode(String),
}

impl Error {
    /// Wrap a rejected bridge promise
    pub fn bridge(err: JsValue) -> Error {
        Error::Bridge(format!("{:?}", err))
    }
}

impl From<serde_wasm_bindgen::Error> for Error {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        Error::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
