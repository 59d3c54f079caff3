//! `aws-sdk-s3` backend for the RustStack client factory.
//!
//! [`S3ClientBuilder`] implements [`ruststack_client_core::ClientBuilder`],
//! so named settings resolve straight into an [`S3Client`]:
//!
//! ```no_run
//! use ruststack_client_core::{ClientFactory, ClientSettingsRegistry, ops};
//! use ruststack_client_s3::S3ClientBuilder;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let registry = ClientSettingsRegistry::from_json_file("s3clients.json")?;
//! let factory = ClientFactory::new(registry);
//! let client = factory.create_client::<S3ClientBuilder>("archive")?;
//!
//! let stat = ops::stat_object(&client, "reports", "2024/q1.csv", None, None).await;
//! stat.handle(
//!     |stat| println!("{} bytes", stat.size),
//!     |kind, message| eprintln!("{kind}: {message}"),
//! );
//! # Ok(())
//! # }
//! ```
//!
//! SDK errors are mapped onto [`ruststack_client_core::StorageFault`] so the
//! operation layer classifies them like any other backend's faults.

mod builder;
mod client;
mod error;

pub use builder::{DEFAULT_REGION, S3ClientBuilder};
pub use client::S3Client;
