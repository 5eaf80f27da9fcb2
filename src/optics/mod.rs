//! Optics for focusing a parent state or input onto a child's.
//!
//! - [`Lens`]: total focus on an always-present part of a product type
//! - [`Prism`]: partial focus on one case of a sum type
//! - [`AffineTraversal`]: a lens followed by a prism, focusing on zero or one part
//!
//! Children never know about their parent. A parent composes a child
//! machine by lifting the child's mapping through these optics, see
//! [`Mapping::transform`](crate::core::Mapping::transform).

mod affine;
mod lens;
mod prism;

pub use affine::AffineTraversal;
pub use lens::Lens;
pub use prism::Prism;
