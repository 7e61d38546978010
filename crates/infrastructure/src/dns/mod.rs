pub mod https_resolver;
pub mod message_builder;
pub mod record_type_map;
pub mod tls;

pub use https_resolver::{HttpsResolver, HttpsResolverBuilder};
pub use message_builder::MessageBuilder;
pub use record_type_map::RecordTypeMapper;
