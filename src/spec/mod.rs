//! Spec layer: the tagged intermediate representation and the normalizer
//! that lowers input values into it.
//!
//! It owns:
//! - `SpecNode` / `Tagged` (the tree the rendering side consumes)
//! - `normalize` (the recursive, ordered type dispatch)

pub mod node;
pub mod normalize;

pub use node::{CallDescriptor, Kind, SpecNode, TAG_KEY, Tagged};
pub use normalize::{MAX_DEPTH, normalize};
