use crate::config::Config;
use crate::keys::ClientKeyMaterial;
use crate::types::ClientPreferences;

/// Process-wide settings and keys, fixed at construction.
///
/// Wrap it in an `Arc` and hand it to the components that need it.
#[derive(Clone, Debug)]
pub struct ClientContext {
    preferences: ClientPreferences,
    keys: ClientKeyMaterial,
}

impl ClientContext {
    /// Builds a context without validating `keys`; defects in the key
    /// material then surface as signing errors.
    pub fn new(preferences: ClientPreferences, keys: ClientKeyMaterial) -> Self {
        Self { preferences, keys }
    }
    pub fn preferences(&self) -> &ClientPreferences {
        &self.preferences
    }
    pub fn keys(&self) -> &ClientKeyMaterial {
        &self.keys
    }
}

impl TryFrom<Config> for ClientContext {
    type Error = crate::keys::Error;

    fn try_from(config: Config) -> Result<Self, Self::Error> {
        config.keys.validate()?;
        Ok(Self::new(config.preferences, config.keys))
    }
}
