//! The renderable view tree.
//!
//! [`View`] describes markup once; a [`Renderer`](crate::renderer::Renderer)
//! turns it into Liquid source or into HTML depending on its target.

use crate::expr::Expr;
use crate::island::{IslandFactory, IslandMarker};
use crate::primitives::{Branch, Conditional, Loop};
use std::borrow::Cow;

/// A unified representation of renderable content.
#[derive(Debug)]
pub enum View {
	/// An HTML element.
	Element(ElementView),
	/// Static text, HTML-escaped on output.
	Text(Cow<'static, str>),
	/// An expression output, HTML-escaped.
	Output(Expr),
	/// An expression output written as is.
	RawOutput(Expr),
	/// `if` / `unless` block.
	Conditional(Box<Conditional>),
	/// `for` block.
	Loop(Box<Loop>),
	/// `case` block.
	Branch(Box<Branch>),
	/// Hydration island marker.
	Island(Box<IslandMarker>),
	/// A component wrapped by an island factory.
	IslandComponent(Box<IslandFactory>),
	/// A fragment containing multiple views (no wrapper element).
	Fragment(Vec<View>),
	/// An empty view (renders nothing).
	Empty,
}

/// An attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
	/// Fixed text.
	Static(Cow<'static, str>),
	/// Bound to an expression.
	Expr(Expr),
}

/// An HTML element in the view tree.
#[derive(Debug)]
pub struct ElementView {
	tag: Cow<'static, str>,
	attrs: Vec<(Cow<'static, str>, AttrValue)>,
	children: Vec<View>,
	is_void: bool,
}

impl ElementView {
	/// Creates a new element view.
	pub fn new(tag: impl Into<Cow<'static, str>>) -> Self {
		let tag = tag.into();
		let is_void = matches!(
			tag.as_ref(),
			"area"
				| "base" | "br"
				| "col" | "embed"
				| "hr" | "img"
				| "input" | "link"
				| "meta" | "source"
				| "track" | "wbr"
		);
		Self {
			tag,
			attrs: Vec::new(),
			children: Vec::new(),
			is_void,
		}
	}

	/// Adds a static attribute.
	pub fn attr(
		mut self,
		name: impl Into<Cow<'static, str>>,
		value: impl Into<Cow<'static, str>>,
	) -> Self {
		self.attrs
			.push((name.into(), AttrValue::Static(value.into())));
		self
	}

	/// Adds an attribute bound to an expression.
	pub fn attr_expr(mut self, name: impl Into<Cow<'static, str>>, value: impl Into<Expr>) -> Self {
		self.attrs.push((name.into(), AttrValue::Expr(value.into())));
		self
	}

	/// Adds a child view.
	pub fn child(mut self, child: impl IntoView) -> Self {
		self.children.push(child.into_view());
		self
	}

	/// Adds multiple child views.
	pub fn children(mut self, children: impl IntoIterator<Item = impl IntoView>) -> Self {
		self.children
			.extend(children.into_iter().map(|c| c.into_view()));
		self
	}

	/// Returns the tag name.
	pub fn tag_name(&self) -> &str {
		&self.tag
	}

	/// Returns the attributes.
	pub fn attrs(&self) -> &[(Cow<'static, str>, AttrValue)] {
		&self.attrs
	}

	/// Returns the child views.
	pub fn child_views(&self) -> &[View] {
		&self.children
	}

	/// Returns whether this is a void element.
	pub fn is_void(&self) -> bool {
		self.is_void
	}
}

impl View {
	/// Creates an element view.
	pub fn element(tag: impl Into<Cow<'static, str>>) -> ElementView {
		ElementView::new(tag)
	}

	/// Creates a text view.
	pub fn text(content: impl Into<Cow<'static, str>>) -> Self {
		View::Text(content.into())
	}

	/// Creates an escaped expression output.
	pub fn output(expr: impl Into<Expr>) -> Self {
		View::Output(expr.into())
	}

	/// Creates an unescaped expression output.
	pub fn raw_output(expr: impl Into<Expr>) -> Self {
		View::RawOutput(expr.into())
	}

	/// Creates a fragment view.
	pub fn fragment(children: impl IntoIterator<Item = impl IntoView>) -> Self {
		View::Fragment(children.into_iter().map(|c| c.into_view()).collect())
	}

	/// Creates an empty view.
	pub fn empty() -> Self {
		View::Empty
	}
}

/// Conversion into a [`View`].
pub trait IntoView {
	/// Converts self into a view.
	fn into_view(self) -> View;
}

impl IntoView for View {
	fn into_view(self) -> View {
		self
	}
}

impl IntoView for ElementView {
	fn into_view(self) -> View {
		View::Element(self)
	}
}

impl IntoView for String {
	fn into_view(self) -> View {
		View::Text(Cow::Owned(self))
	}
}

impl IntoView for &'static str {
	fn into_view(self) -> View {
		View::Text(Cow::Borrowed(self))
	}
}

impl IntoView for Expr {
	fn into_view(self) -> View {
		View::Output(self)
	}
}

impl<T: IntoView> IntoView for Option<T> {
	fn into_view(self) -> View {
		match self {
			Some(v) => v.into_view(),
			None => View::Empty,
		}
	}
}

impl<T: IntoView> IntoView for Vec<T> {
	fn into_view(self) -> View {
		View::Fragment(self.into_iter().map(|v| v.into_view()).collect())
	}
}

impl IntoView for () {
	fn into_view(self) -> View {
		View::Empty
	}
}

impl<A: IntoView, B: IntoView> IntoView for (A, B) {
	fn into_view(self) -> View {
		View::Fragment(vec![self.0.into_view(), self.1.into_view()])
	}
}

impl<A: IntoView, B: IntoView, C: IntoView> IntoView for (A, B, C) {
	fn into_view(self) -> View {
		View::Fragment(vec![
			self.0.into_view(),
			self.1.into_view(),
			self.2.into_view(),
		])
	}
}

/// Escapes text for HTML content and attribute values.
///
/// Matches the Liquid `escape` filter character for character.
pub fn html_escape(s: &str) -> String {
	let mut escaped = String::with_capacity(s.len() + 8);
	for c in s.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			'\'' => escaped.push_str("&#39;"),
			_ => escaped.push(c),
		}
	}
	escaped
}

/// Wraps text in `{% raw %}` when it contains Liquid delimiters or ends in
/// `{` (which would run into a following `{{` or `{%`).
///
/// Each raw block ends right after a `{%` of the text, so the text can never
/// spell `{% endraw %}` inside a block and close it early.
pub(crate) fn protect_delimiters(text: &str) -> Cow<'_, str> {
	if !text.contains("{{") && !text.contains("{%") && !text.ends_with('{') {
		return Cow::Borrowed(text);
	}
	let mut out = String::with_capacity(text.len() + 32);
	let mut rest = text;
	while let Some(at) = rest.find("{%") {
		let (block, tail) = rest.split_at(at + 2);
		push_raw(&mut out, block);
		rest = tail;
	}
	if !rest.is_empty() {
		push_raw(&mut out, rest);
	}
	Cow::Owned(out)
}

fn push_raw(out: &mut String, text: &str) {
	out.push_str("{% raw %}");
	out.push_str(text);
	out.push_str("{% endraw %}");
}
