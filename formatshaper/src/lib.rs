pub mod mapping;
pub mod properties;

pub use mapping::{MappingKey, MappingPair, MappingTable};
pub use properties::CodecProperties;
