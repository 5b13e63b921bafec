// Clients for third-party APIs
pub mod instagram;

pub use instagram::InstagramGraphClient;
