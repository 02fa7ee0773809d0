pub mod file_map;
pub mod ordered_map;

pub use file_map::FileMap;
pub use ordered_map::{MapLimits, MemoryMap, OrderedMap};
