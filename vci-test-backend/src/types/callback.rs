use http::uri::{InvalidUri, Uri};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Uri(#[from] InvalidUri),
    #[error(transparent)]
    SerdeHtmlForm(#[from] serde_html_form::de::Error),
}

pub type Result<T> = core::result::Result<T, Error>;

/// Query parameters of an authorization redirect.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub iss: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

// Only `state` is read, so other parameters cannot affect correlation.
#[derive(Deserialize)]
struct StateParam {
    state: Option<String>,
}

fn query(url: &str) -> Result<String> {
    let uri = url.trim().parse::<Uri>()?;
    Ok(uri.query().unwrap_or_default().to_string())
}

impl CallbackParams {
    pub fn from_url(url: &str) -> Result<Self> {
        Ok(serde_html_form::from_str(&query(url)?)?)
    }
    /// The correlation token carried by `url`.
    ///
    /// A missing `state` parameter, or a URL that cannot be parsed at all,
    /// yields the empty string, which is itself a token waiters may register.
    pub fn state_from_url(url: &str) -> String {
        query(url)
            .ok()
            .and_then(|query| serde_html_form::from_str::<StateParam>(&query).ok())
            .and_then(|param| param.state)
            .unwrap_or_default()
    }
}
