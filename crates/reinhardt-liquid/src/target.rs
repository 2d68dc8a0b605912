//! Render targets.

use serde::{Deserialize, Serialize};

/// Where rendered output is headed.
///
/// The target is a field of the [`Renderer`](crate::renderer::Renderer) and
/// travels with every render call; there is no process-wide switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderTarget {
	/// Emit Liquid source for the server-side engine.
	#[default]
	ServerTemplate,
	/// Evaluate against live data and emit plain HTML.
	Client,
}

impl RenderTarget {
	/// Returns `true` for [`RenderTarget::ServerTemplate`].
	pub fn is_server(self) -> bool {
		self == RenderTarget::ServerTemplate
	}

	/// Returns `true` for [`RenderTarget::Client`].
	pub fn is_client(self) -> bool {
		self == RenderTarget::Client
	}
}
