//! Infrastructure layer: durable storage backends for confab-core.

pub mod json_store;

pub use json_store::JsonFileStore;
