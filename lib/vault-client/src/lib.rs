//! vault-client - minimal HashiCorp Vault KV v2 reader
//!
//! Configuration is taken from the builder first, then from the environment:
//! `VAULT_ADDR`, `VAULT_TOKEN`, `VAULT_MOUNT` (default `secret`) and
//! `VAULT_SECRET_FIELD` (default `value`).

mod client;
mod error;
mod models;

pub use client::{VaultClient, VaultClientBuilder};
pub use error::VaultError;
pub use models::{KvData, KvVersion};
