// SPDX-License-Identifier: MIT

//! Errors surfaced by [`crate::Registry`] implementations.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("lease not found")]
    LeaseNotFound,
    #[error("lease_ttl must be greater than zero")]
    ZeroTtl,
}
