//! Stored credential resolution
//!
//! Steps may reference a named credential entry. Entries live in the OS
//! keychain, keyed by a service name derived from a fixed prefix plus the
//! entry name, with one field per secret (`username`/`password` for basic
//! auth, `token` for token auth).
//!
//! Nothing here raises past the resolver boundary: lookup failures fall
//! back to prompting, prompting failures yield an empty credential map, and
//! store errors are logged and treated as not-found.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Mutex;

use serde_json::{Map, Value};
use tracing::warn;

use crate::plan::{AuthRef, AuthType};

/// Fixed prefix for keychain service names
pub const SERVICE_PREFIX: &str = "testplan_runner";

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Credential store error: {0}")]
    Store(String),

    #[error("Prompt error: {0}")]
    Prompt(#[from] std::io::Error),
}

// ============================================================================
// Store backends
// ============================================================================

/// Backing secret store, keyed by `(service, field)`
pub trait CredentialStore: Send + Sync {
    fn get(&self, service: &str, field: &str) -> Result<Option<String>, CredentialError>;
    fn set(&self, service: &str, field: &str, value: &str) -> Result<(), CredentialError>;
    fn delete(&self, service: &str, field: &str) -> Result<(), CredentialError>;
}

/// OS keychain store
pub struct KeyringStore;

impl KeyringStore {
    fn entry(service: &str, field: &str) -> Result<keyring::Entry, CredentialError> {
        keyring::Entry::new(service, field).map_err(|e| CredentialError::Store(e.to_string()))
    }
}

impl CredentialStore for KeyringStore {
    fn get(&self, service: &str, field: &str) -> Result<Option<String>, CredentialError> {
        match Self::entry(service, field)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(CredentialError::Store(e.to_string())),
        }
    }

    fn set(&self, service: &str, field: &str, value: &str) -> Result<(), CredentialError> {
        let entry = Self::entry(service, field)?;
        if let Err(err) = entry.set_password(value) {
            // Some keychains refuse overwrites; try delete + set as a fallback.
            if entry.delete_credential().is_ok() && entry.set_password(value).is_ok() {
                return Ok(());
            }
            return Err(CredentialError::Store(err.to_string()));
        }
        Ok(())
    }

    fn delete(&self, service: &str, field: &str) -> Result<(), CredentialError> {
        match Self::entry(service, field)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(CredentialError::Store(e.to_string())),
        }
    }
}

/// In-memory store for tests and non-interactive environments
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<(String, String), String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, service: &str, field: &str) -> Result<Option<String>, CredentialError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| CredentialError::Store(e.to_string()))?;
        Ok(entries.get(&(service.to_string(), field.to_string())).cloned())
    }

    fn set(&self, service: &str, field: &str, value: &str) -> Result<(), CredentialError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| CredentialError::Store(e.to_string()))?;
        entries.insert((service.to_string(), field.to_string()), value.to_string());
        Ok(())
    }

    fn delete(&self, service: &str, field: &str) -> Result<(), CredentialError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| CredentialError::Store(e.to_string()))?;
        entries.remove(&(service.to_string(), field.to_string()));
        Ok(())
    }
}

// ============================================================================
// Prompting
// ============================================================================

/// Interactive capture of missing credential fields
pub trait CredentialPrompt: Send + Sync {
    fn prompt(&self, label: &str) -> Result<String, CredentialError>;
}

/// Stdin-based prompt used by the CLI
pub struct StdinPrompt;

impl CredentialPrompt for StdinPrompt {
    fn prompt(&self, label: &str) -> Result<String, CredentialError> {
        print!("{}: ", label);
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        Ok(input.trim().to_string())
    }
}

/// Canned answers for tests; errors once the script runs dry
pub struct ScriptedPrompt {
    answers: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new(answers: Vec<&str>) -> Self {
        let mut answers: Vec<String> = answers.into_iter().map(String::from).collect();
        answers.reverse();
        Self {
            answers: Mutex::new(answers),
        }
    }
}

impl CredentialPrompt for ScriptedPrompt {
    fn prompt(&self, _label: &str) -> Result<String, CredentialError> {
        self.answers
            .lock()
            .ok()
            .and_then(|mut a| a.pop())
            .ok_or_else(|| {
                CredentialError::Prompt(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "prompt cancelled",
                ))
            })
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Looks up or interactively captures credentials for a step's auth entry
pub struct CredentialResolver {
    store: Box<dyn CredentialStore>,
    prompt: Box<dyn CredentialPrompt>,
}

impl CredentialResolver {
    pub fn new(store: Box<dyn CredentialStore>, prompt: Box<dyn CredentialPrompt>) -> Self {
        Self { store, prompt }
    }

    /// Keychain-backed resolver with stdin prompting
    pub fn keyring() -> Self {
        Self::new(Box::new(KeyringStore), Box::new(StdinPrompt))
    }

    pub fn service_name(auth_name: &str) -> String {
        format!("{}_{}", SERVICE_PREFIX, auth_name)
    }

    /// Resolve an auth reference to a parameter map. Keys are
    /// `auth_username`/`auth_password`/`auth_type` for basic auth and
    /// `auth_token`/`auth_type` for token auth. Empty map when no auth is
    /// configured or when capture fails.
    pub fn resolve_authentication(&self, auth: Option<&AuthRef>) -> Map<String, Value> {
        let auth = match auth {
            Some(a) => a,
            None => return Map::new(),
        };

        let stored = self.get_credentials(&auth.authentication_name, auth.authentication_type);
        if !stored.is_empty() {
            return stored;
        }

        self.prompt_for_credentials(&auth.authentication_name, auth.authentication_type)
    }

    fn get_credentials(&self, auth_name: &str, auth_type: AuthType) -> Map<String, Value> {
        let service = Self::service_name(auth_name);
        let mut credentials = Map::new();

        let lookup = |field: &str| -> Option<String> {
            match self.store.get(&service, field) {
                Ok(value) => value,
                Err(e) => {
                    warn!(auth_name, field, error = %e, "failed to retrieve credentials");
                    None
                }
            }
        };

        match auth_type {
            AuthType::Basic => {
                if let (Some(username), Some(password)) = (lookup("username"), lookup("password")) {
                    credentials.insert("auth_username".to_string(), Value::String(username));
                    credentials.insert("auth_password".to_string(), Value::String(password));
                    credentials.insert("auth_type".to_string(), Value::String("basic".to_string()));
                }
            }
            AuthType::Token => {
                if let Some(token) = lookup("token") {
                    credentials.insert("auth_token".to_string(), Value::String(token));
                    credentials.insert("auth_type".to_string(), Value::String("token".to_string()));
                }
            }
        }

        credentials
    }

    fn prompt_for_credentials(&self, auth_name: &str, auth_type: AuthType) -> Map<String, Value> {
        println!("\nAuthentication required for: {}", auth_name);
        println!("Authentication type: {}", auth_type);

        let service = Self::service_name(auth_name);
        let mut credentials = Map::new();

        let result = match auth_type {
            AuthType::Basic => self.prompt.prompt("Username").and_then(|username| {
                self.prompt.prompt("Password").map(|password| {
                    self.persist(&service, &[("username", &username), ("password", &password)]);
                    credentials.insert("auth_username".to_string(), Value::String(username));
                    credentials.insert("auth_password".to_string(), Value::String(password));
                    credentials.insert("auth_type".to_string(), Value::String("basic".to_string()));
                })
            }),
            AuthType::Token => self.prompt.prompt("Token").map(|token| {
                self.persist(&service, &[("token", &token)]);
                credentials.insert("auth_token".to_string(), Value::String(token));
                credentials.insert("auth_type".to_string(), Value::String("token".to_string()));
            }),
        };

        if let Err(e) = result {
            warn!(auth_name, error = %e, "credential input cancelled");
            return Map::new();
        }

        credentials
    }

    fn persist(&self, service: &str, fields: &[(&str, &str)]) {
        for (field, value) in fields {
            if let Err(e) = self.store.set(service, field, value) {
                warn!(service, field, error = %e, "failed to store credentials");
            }
        }
    }
}
