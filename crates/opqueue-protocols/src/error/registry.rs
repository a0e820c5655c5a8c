//! Registry errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Tool already registered: {0}")]
    AlreadyRegistered(String),
}
