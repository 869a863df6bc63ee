pub mod serializer;
pub use serializer::{Literal, Params, Placeholder, Serializer};
