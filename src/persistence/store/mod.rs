pub mod command_handler;
pub mod document_store;

pub use command_handler::{CommandContext, CommandHandler};
pub use document_store::{decode_row, Document, DocumentStore, StoreError};
