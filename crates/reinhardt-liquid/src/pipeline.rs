//! Multi-unit compilation.
//!
//! A build compiles many units (sections, snippets, pages) into separate
//! Liquid templates. A unit that fails is reported on its own and the
//! remaining units still compile.

use crate::component::{DynComponent, Props};
use crate::error::{CompileError, CompileResult};
use crate::renderer::{RenderOptions, Renderer};

/// One unit of a build.
#[derive(Debug, Clone)]
pub struct CompileUnit {
	name: String,
	export: Option<DynComponent>,
	props: Props,
}

impl CompileUnit {
	/// Creates a unit with no component export yet.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			export: None,
			props: Props::new(),
		}
	}

	/// Sets the component the unit exports.
	pub fn export(mut self, component: impl Into<DynComponent>) -> Self {
		self.export = Some(component.into());
		self
	}

	/// Sets the props the component renders with.
	pub fn props(mut self, props: Props) -> Self {
		self.props = props;
		self
	}

	/// The unit name.
	pub fn name(&self) -> &str {
		&self.name
	}
}

/// A successfully compiled unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledUnit {
	/// The unit name.
	pub name: String,
	/// The exported component's name.
	pub component: String,
	/// The Liquid template.
	pub template: String,
}

/// The result for one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitOutcome {
	/// The unit name.
	pub unit: String,
	/// The compiled template or the error that stopped it.
	pub result: CompileResult<CompiledUnit>,
}

/// Compiles every unit to a server template, in order.
pub fn compile_units(
	units: impl IntoIterator<Item = CompileUnit>,
	options: &RenderOptions,
) -> Vec<UnitOutcome> {
	units
		.into_iter()
		.map(|unit| {
			let result = compile_unit(&unit, options);
			match &result {
				Ok(compiled) => tracing::debug!(
					unit = %unit.name,
					component = %compiled.component,
					bytes = compiled.template.len(),
					"compiled unit"
				),
				Err(error) => tracing::error!(unit = %unit.name, %error, "failed to compile unit"),
			}
			UnitOutcome {
				unit: unit.name,
				result,
			}
		})
		.collect()
}

fn compile_unit(unit: &CompileUnit, options: &RenderOptions) -> CompileResult<CompiledUnit> {
	let component = unit
		.export
		.as_ref()
		.ok_or_else(|| CompileError::MissingExport(unit.name.clone()))?;
	let view = component.render(&unit.props);
	let template = Renderer::server()
		.with_options(options.clone())
		.render(&view)?;
	Ok(CompiledUnit {
		name: unit.name.clone(),
		component: component.name().to_string(),
		template,
	})
}
