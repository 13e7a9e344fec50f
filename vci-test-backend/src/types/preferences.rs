use serde::{Deserialize, Serialize};

const DEFAULT_WALLET_NAME: &str = "Test Wallet";
const DEFAULT_WALLET_LINK: &str = "https://wallet.example";

fn default_wallet_name() -> String {
    String::from(DEFAULT_WALLET_NAME)
}

fn default_wallet_link() -> String {
    String::from(DEFAULT_WALLET_LINK)
}

fn default_signing_algorithms() -> Vec<String> {
    vec![String::from("ES256")]
}

/// Read-only settings of the wallet client the backend acts for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientPreferences {
    client_id: String,
    redirect_base_url: String,
    #[serde(default)]
    accepted_locales: Vec<String>,
    #[serde(default = "default_signing_algorithms")]
    accepted_signing_algorithms: Vec<String>,
    #[serde(default = "default_wallet_name")]
    wallet_name: String,
    #[serde(default = "default_wallet_link")]
    wallet_link: String,
}

impl ClientPreferences {
    pub fn new(client_id: impl Into<String>, redirect_base_url: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_base_url: redirect_base_url.into(),
            accepted_locales: Vec::new(),
            accepted_signing_algorithms: default_signing_algorithms(),
            wallet_name: default_wallet_name(),
            wallet_link: default_wallet_link(),
        }
    }
    pub fn with_accepted_locales(mut self, locales: Vec<String>) -> Self {
        self.accepted_locales = locales;
        self
    }
    pub fn with_accepted_signing_algorithms(mut self, algorithms: Vec<String>) -> Self {
        self.accepted_signing_algorithms = algorithms;
        self
    }
    pub fn with_wallet(mut self, name: impl Into<String>, link: impl Into<String>) -> Self {
        self.wallet_name = name.into();
        self.wallet_link = link.into();
        self
    }
    pub fn client_id(&self) -> &str {
        &self.client_id
    }
    pub fn redirect_base_url(&self) -> &str {
        &self.redirect_base_url
    }
    pub fn accepted_locales(&self) -> &[String] {
        &self.accepted_locales
    }
    pub fn accepted_signing_algorithms(&self) -> &[String] {
        &self.accepted_signing_algorithms
    }
    pub fn wallet_name(&self) -> &str {
        &self.wallet_name
    }
    pub fn wallet_link(&self) -> &str {
        &self.wallet_link
    }
}
