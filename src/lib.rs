//! Tabular view engine behind a dashboard data table.
//!
//! A [`model::TableController`] owns the records and every piece of view
//! state. UI intents come in as [`domain::Message`]s; after each one the
//! controller runs filter, sort and pagination over the whole store and
//! publishes a [`model::RenderInstruction`]. Notifications and file
//! downloads are queued as [`domain::Effect`]s for the presentation side.

pub mod bulk;
pub mod controller;
pub mod domain;
pub mod export;
pub mod filter;
pub mod inputter;
pub mod loader;
pub mod model;
pub mod paginate;
pub mod record;
pub mod selection;
pub mod sort;
pub mod store;
pub mod ui;

pub use domain::{Effect, Message, Notification, Severity, TabError, TableConfig};
pub use model::{RenderInstruction, TableController};
pub use record::{Record, RecordId, Role, Status};
pub use store::RecordStore;
