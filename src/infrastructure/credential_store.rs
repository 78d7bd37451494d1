use crate::infrastructure::error::CoreError;
use std::sync::Mutex;

/// Storage for the portal bearer token. Acquiring or refreshing the token is
/// handled by the sign-in flow outside this crate.
pub trait TokenStore: Send + Sync {
    fn save_token(&self, token: &str) -> Result<(), CoreError>;
    fn load_token(&self) -> Result<Option<String>, CoreError>;
    fn delete_token(&self) -> Result<(), CoreError>;
}

#[derive(Debug, Clone)]
pub struct KeyringTokenStore {
    service_name: String,
    account_name: String,
}

impl KeyringTokenStore {
    pub fn new(service_name: impl Into<String>, account_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            account_name: account_name.into(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry, CoreError> {
        keyring::Entry::new(&self.service_name, &self.account_name)
            .map_err(|error| CoreError::Credential(error.to_string()))
    }
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new("studyhub.portal", "default")
    }
}

impl TokenStore for KeyringTokenStore {
    fn save_token(&self, token: &str) -> Result<(), CoreError> {
        self.entry()?
            .set_password(token)
            .map_err(|error| CoreError::Credential(error.to_string()))
    }

    fn load_token(&self) -> Result<Option<String>, CoreError> {
        match self.entry()?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(CoreError::Credential(error.to_string())),
        }
    }

    fn delete_token(&self) -> Result<(), CoreError> {
        match self.entry()?.delete_credential() {
            Ok(_) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(CoreError::Credential(error.to_string())),
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl InMemoryTokenStore {
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for InMemoryTokenStore {
    fn save_token(&self, token: &str) -> Result<(), CoreError> {
        let mut guard = self
            .token
            .lock()
            .map_err(|error| CoreError::Lock(error.to_string()))?;
        *guard = Some(token.to_string());
        Ok(())
    }

    fn load_token(&self) -> Result<Option<String>, CoreError> {
        let guard = self
            .token
            .lock()
            .map_err(|error| CoreError::Lock(error.to_string()))?;
        Ok(guard.clone())
    }

    fn delete_token(&self) -> Result<(), CoreError> {
        let mut guard = self
            .token
            .lock()
            .map_err(|error| CoreError::Lock(error.to_string()))?;
        *guard = None;
        Ok(())
    }
}
