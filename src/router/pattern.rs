//! Route pattern compiler.
//!
//! `compile("/users/:id/posts")` yields `[Literal("users"), Param("id"), Literal("posts")]`.

use crate::error::RouterError;
use std::collections::HashSet;
use std::fmt;

/// Prefix that marks a parameter segment.
pub const PARAM_MARKER: char = ':';

/// One segment of a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
  /// Matches exactly this text (case-sensitive).
  Literal(String),
  /// Matches any non-empty segment and binds it under this name.
  Param(String),
}

/// A compiled route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
  segments: Vec<Segment>,
}

impl Pattern {
  /// Segments in path order.
  pub fn segments(&self) -> &[Segment] {
    &self.segments
  }

  /// Names of the parameter segments, in path order.
  pub fn param_names(&self) -> impl Iterator<Item = &str> {
    self.segments.iter().filter_map(|s| match s {
      Segment::Param(name) => Some(name.as_str()),
      Segment::Literal(_) => None,
    })
  }

  /// Number of segments a matching path must have.
  pub fn len(&self) -> usize {
    self.segments.len()
  }

  /// True for the root pattern `/`.
  pub fn is_empty(&self) -> bool {
    self.segments.is_empty()
  }
}

impl fmt::Display for Pattern {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.segments.is_empty() {
      return f.write_str("/");
    }
    for segment in &self.segments {
      match segment {
        Segment::Literal(text) => write!(f, "/{text}")?,
        Segment::Param(name) => write!(f, "/{PARAM_MARKER}{name}")?,
      }
    }
    Ok(())
  }
}

/// Splits a path into its non-empty segments.
///
/// Leading, trailing and repeated slashes are ignored. Used for both templates
/// and request paths so the two always agree.
pub fn split_segments(path: &str) -> impl Iterator<Item = &str> {
  path.split('/').filter(|s| !s.is_empty())
}

/// Compiles a route template.
///
/// # Errors
///
/// [`RouterError::MalformedPattern`] if the template is empty, has an empty or
/// invalid parameter name, captures the same name twice, or uses an
/// unsupported marker (`*` wildcards, `{name}` captures).
pub fn compile(template: &str) -> Result<Pattern, RouterError> {
  let template = template.trim();
  if template.is_empty() {
    return Err(RouterError::malformed_pattern(template, "empty template"));
  }

  let mut seen = HashSet::new();
  let mut segments = Vec::new();
  for raw in split_segments(template) {
    if raw.starts_with('*') {
      return Err(RouterError::malformed_pattern(
        template,
        format!("wildcard segment '{raw}' is not supported"),
      ));
    }
    if raw.contains(['{', '}']) {
      return Err(RouterError::malformed_pattern(
        template,
        format!("brace capture '{raw}' is not supported, use '{PARAM_MARKER}name'"),
      ));
    }

    match raw.strip_prefix(PARAM_MARKER) {
      Some(name) => {
        validate_param_name(template, name)?;
        if !seen.insert(name) {
          return Err(RouterError::malformed_pattern(
            template,
            format!("parameter '{name}' is captured twice"),
          ));
        }
        segments.push(Segment::Param(name.to_string()));
      }
      None => segments.push(Segment::Literal(raw.to_string())),
    }
  }

  Ok(Pattern { segments })
}

fn validate_param_name(template: &str, name: &str) -> Result<(), RouterError> {
  if name.is_empty() {
    return Err(RouterError::malformed_pattern(template, "empty parameter name"));
  }
  if let Some(ch) = name.chars().find(|c| !c.is_alphanumeric() && *c != '_') {
    return Err(RouterError::malformed_pattern(
      template,
      format!("invalid character '{ch}' in parameter name"),
    ));
  }
  Ok(())
}
