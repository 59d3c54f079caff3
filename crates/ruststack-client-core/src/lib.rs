//! Named object-storage clients with result-oriented operations.
//!
//! This crate resolves named [`ClientSettings`] bags into configured storage
//! clients and wraps every object operation so that its outcome is an
//! [`OperationResult`] instead of a propagated fault.
//!
//! # Architecture
//!
//! ```text
//! SettingsSource (JSON file, env, map)
//!        |
//!        v
//! ClientFactory --drives--> ClientBuilder --build--> ObjectBackend
//!                                                        |
//!                                                        v
//!                                  ops::* (classify faults -> OperationResult)
//! ```
//!
//! Backends live in their own crates (`ruststack-client-s3`); an in-process
//! [`memory::InMemoryBackend`] is provided here.

pub mod args;
pub mod backend;
pub mod error;
pub mod factory;
pub mod memory;
pub mod naming;
pub mod ops;
pub mod result;
pub mod settings;

pub use args::{ByteRange, Configure, GetObjectArgs, PutObjectArgs, RemoveObjectArgs, StatObjectArgs};
pub use backend::{ObjectBackend, ObjectReader, ObjectStat, PutObjectOutput};
pub use error::{ErrorKind, OperationError, OperationFault, StorageFault, classify};
pub use factory::{ClientBuilder, ClientFactory, FactoryError, ResolvedSettings};
pub use naming::{DefaultMimeTypeMap, MimeTypeMap};
pub use result::OperationResult;
pub use settings::{ClientSettings, ClientSettingsRegistry, SettingsError, SettingsSource};
