//! Typed resources for keyform
//!
//! This layer is what applications use. It adds:
//! - `Resource<T>`: declaration of how records of shape `T` are keyed and where they live
//! - `InterfaceBuilder` / `Interface`: the validated set of declarations plus connection config
//! - `Session`: one open pool, scoped by `connect`/`close`
//! - `Bound<T>`: create, save, get, delete, expire, iterate and filter records
//!
//! # Example
//!
//! ```rust,ignore
//! use keyform_memory_store::MemoryBackend;
//! use keyform_resource::{ConnectionConfig, Interface, Resource, SaveOptions};
//!
//! let mut builder = Interface::builder();
//! let users = builder.declare(Resource::<User>::keyed_by("id"))?;
//! let interface = builder.build(
//!     ConnectionConfig::new("memory://local"),
//!     MemoryBackend::new().connector(),
//! );
//!
//! let mut session = interface.connect().await?;
//! let bound = session.bind(&users);
//! bound.save(&[bob.clone()], SaveOptions::default()).await?;
//! assert_eq!(bound.get(&bob).await?, bob);
//! session.close().await;
//! ```

mod config;
mod cursor;
mod descriptor;
mod interface;
mod manager;

pub use config::ConnectionConfig;
pub use cursor::Cursor;
pub use descriptor::{KeySource, Resource, ResourceDescriptor, ResourceInfo};
pub use interface::{Interface, InterfaceBuilder, Session};
pub use manager::{Bound, Lookup, ResourceManager, SaveOptions};

// Re-export lower layers for convenience
pub use keyform_core_store::{ConnectOptions, Connector, Error, KeyCodec, Partition, Result, Shape};
pub use keyform_serde_store::{Codec, Filter, JsonCodec};
