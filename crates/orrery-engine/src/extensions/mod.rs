// extensions/mod.rs
//
// Scene-graph helpers shared by render backends.
// The composer never sees these; backends opt in to them.

pub mod transform;

pub use transform::{LocalTransform, TransformGraph};
