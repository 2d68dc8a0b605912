//! Hydration islands.
//!
//! An island is a region of server-rendered markup that the client runtime
//! later mounts a live component into. [`IslandMarker`] writes the wrapper
//! the runtime looks for; [`IslandFactory`] turns an ordinary component into
//! an island, assembling its props JSON inside the Liquid template.

mod factory;
mod marker;

pub use factory::{IslandFactory, PropMapping, PropSource};
pub use marker::{
	HYDRATION_ATTR_ID, HYDRATION_ATTR_PROPS, ISLAND_ATTR, IslandMarker, PayloadForm,
};
