pub mod cache;
pub mod resolver;

pub use cache::PermissionCache;
pub use resolver::AccessResolver;
