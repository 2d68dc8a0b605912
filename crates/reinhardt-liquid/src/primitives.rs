//! Structural primitives.
//!
//! Each primitive renders as a Liquid block on the server target and is
//! resolved against the renderer's [`Context`](crate::context::Context) on
//! the client target:
//!
//! | Primitive | Server | Client |
//! |-----------|--------|--------|
//! | [`Conditional`] | `{% if %}` / `{% unless %}` | first branch whose condition holds |
//! | [`Loop`] | `{% for %}` | children once per element, with `forloop` bound |
//! | [`Branch`] | `{% case %}` | first case whose key matches the stringified value |

mod branch;
mod conditional;
mod r#loop;

pub use branch::Branch;
pub use conditional::Conditional;
pub use r#loop::{Loop, LoopItem};
