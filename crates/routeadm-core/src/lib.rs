//! routeadm-core: standard service contract, service adapter and collection
//! state orchestration
//!
//! Consumers depend on [`StandardService`] and [`Collection`] only. Backend
//! services with their own method names are brought onto the standard verbs
//! with [`AdapterBuilder`].

pub mod adapter;
pub mod collection;
pub mod config;
pub mod error;
pub mod message;
pub mod notify;
pub mod resources;
pub mod service;
pub mod state;

pub use adapter::{AdapterBuilder, BoxedVerb, ServiceAdapter, Verb};
pub use collection::{Collection, LivenessToken};
pub use config::CollectionOptions;
pub use error::{AdapterError, CollectionError};
pub use message::CollectionEvent;
pub use notify::{ChannelNotifier, Notice, NoticeLevel, Notifier, TracingNotifier};
pub use service::{BATCH_UNSUPPORTED, StandardService};
pub use state::CollectionState;
