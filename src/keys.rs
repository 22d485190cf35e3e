// ABOUTME: API key records, token generation, and the key store seam
// ABOUTME: Resolves presented tokens for the authorization gate; keys load from a JSON file
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventgate Project

//! # API Key Management
//!
//! Key records are owned by a [`KeyStore`], the seam the authorization
//! gate resolves tokens through. The bundled [`MemoryKeyStore`] loads
//! records from a JSON file so the server binary works stand-alone;
//! embedding applications can provide their own store.
//!
//! Raw tokens never appear in logs; use [`fingerprint`] instead.

use crate::constants::TOKEN_PREFIX;
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// A resolved API key and what it grants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    /// Stable identifier for logs and audit trails
    pub id: Uuid,
    /// Opaque token clients present in the `X-Api-Key` header
    pub token: String,
    /// Human-readable owner label
    pub label: String,
    /// Free-form permission names consumed by post-authorization checks
    #[serde(default)]
    pub permissions: Vec<String>,
    /// When the key was minted
    pub created_at: DateTime<Utc>,
}

impl ApiKey {
    /// Mint a new key with a fresh token
    #[must_use]
    pub fn new(label: impl Into<String>, permissions: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            token: generate_token(),
            label: label.into(),
            permissions,
            created_at: Utc::now(),
        }
    }

    /// Whether this key carries the named permission
    #[must_use]
    pub fn has_permission(&self, name: &str) -> bool {
        self.permissions.iter().any(|p| p == name)
    }
}

/// Generate a fresh token: `egk_` followed by 32 alphanumeric characters
#[must_use]
pub fn generate_token() -> String {
    let random_bytes: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();
    format!("{TOKEN_PREFIX}{random_bytes}")
}

/// Short SHA-256 fingerprint of a token, safe for logs
#[must_use]
pub fn fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..8].to_owned()
}

/// Resolves presented tokens to keys
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Look up a key by its token; `None` means the token is unknown
    async fn resolve(&self, token: &str) -> Option<Arc<ApiKey>>;
}

/// In-memory key store backed by a concurrent map
#[derive(Default)]
pub struct MemoryKeyStore {
    keys: DashMap<String, Arc<ApiKey>>,
}

impl MemoryKeyStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key record; the token is the lookup handle
    ///
    /// # Errors
    ///
    /// Returns an error if a key with the same token is already present
    pub fn insert(&self, key: ApiKey) -> AppResult<()> {
        let token = key.token.clone();
        if self.keys.contains_key(&token) {
            return Err(AppError::invalid_input(format!(
                "duplicate API key token (fingerprint {})",
                fingerprint(&token)
            )));
        }
        self.keys.insert(token, Arc::new(key));
        Ok(())
    }

    /// Load key records from a JSON file holding an array of keys
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if it
    /// contains duplicate tokens
    pub fn load_file(&self, path: &Path) -> AppResult<usize> {
        let raw = fs::read_to_string(path).map_err(|e| {
            AppError::config(format!("cannot read API keys file {}", path.display()))
                .with_source(e)
        })?;
        let records: Vec<ApiKey> = serde_json::from_str(&raw).map_err(|e| {
            AppError::config(format!("cannot parse API keys file {}", path.display()))
                .with_source(e)
        })?;

        let count = records.len();
        for key in records {
            self.insert(key)?;
        }
        info!(keys = count, file = %path.display(), "Loaded API keys");
        Ok(count)
    }

    /// Number of keys currently held
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the store holds no keys
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[async_trait]
impl KeyStore for MemoryKeyStore {
    async fn resolve(&self, token: &str) -> Option<Arc<ApiKey>> {
        self.keys.get(token).map(|entry| Arc::clone(entry.value()))
    }
}
