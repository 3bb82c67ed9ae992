mod core;
mod hierarchy;

pub use self::core::AzureClient;
