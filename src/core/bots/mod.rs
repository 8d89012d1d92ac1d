//! Bot hosting core: persisted records, the live process registry, uploads,
//! and the lifecycle operations that keep the two in step.

mod controller;
mod error;
mod record;
mod registry;
mod store;
mod upload;

pub use controller::LifecycleController;
pub use error::BotError;
pub use record::{BotRecord, BotStatus, ScriptKind};
pub use registry::ProcessRegistry;
pub use store::RecordStore;
pub use upload::{UploadHandler, UploadRequest, UploadedFile};
