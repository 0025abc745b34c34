//! Parsing and formatting of stack element identifiers.
//!
//! A stack element lives in a branch named `{feature}-part_{position}[-{change}]`. Its base
//! marker lives in `_start_-{identifier}`, and a restack in flight uses `_tmp_-` prefixed
//! copies of both. These names are the only thing `gg` persists, so the format must stay
//! byte-compatible with stacks created by earlier versions of the tool.

use crate::{
    constants::{
        DEFAULT_POSITION, FIELD_SEPARATOR, MARKER_PREFIX, PART_INFIX, POSITION_SCALE, TEMP_PREFIX,
    },
    errors::{GgError, GgResult},
};
use std::fmt::{self, Display};

/// One reviewable unit within a feature, derived from its branch name.
#[derive(Debug, Clone, PartialEq)]
pub struct StackElement {
    /// The feature that groups all parts of the stack.
    pub feature: String,
    /// The order key of the element within its feature.
    pub position: f64,
    /// An optional free-form label.
    pub change: Option<String>,
}

impl StackElement {
    /// Creates a new [StackElement], validating the feature and change names.
    ///
    /// ## Takes
    /// - `feature` - The feature name. Must be non-empty and free of the field separator.
    /// - `position` - The position within the feature. Defaults to `1.0`.
    /// - `change` - The optional change label. Must be free of the field separator.
    ///
    /// ## Returns
    /// - `Ok(StackElement)` - The validated element.
    /// - `Err(GgError::InvalidField)` - If a name is invalid.
    /// - `Err(GgError::InvalidPosition)` - If the position is not a positive, finite number.
    pub fn new(feature: &str, position: Option<f64>, change: Option<&str>) -> GgResult<Self> {
        validate_field("feature", feature)?;
        if feature.is_empty() {
            return Err(GgError::InvalidField {
                field: "feature",
                value: feature.to_string(),
            });
        }
        if let Some(change) = change {
            validate_field("change", change)?;
        }
        let position = position.unwrap_or(DEFAULT_POSITION);
        validate_position(position)?;

        Ok(Self {
            feature: feature.to_string(),
            position,
            change: change.map(ToOwned::to_owned),
        })
    }

    /// Returns the branch name of the element.
    pub fn identifier(&self) -> String {
        self.to_string()
    }

    /// Returns the branch name of the element's base marker.
    pub fn marker_identifier(&self) -> String {
        marker_for(&self.identifier())
    }

    /// Returns the rounded comparison key of the element's position.
    pub fn position_key(&self) -> i64 {
        position_key(self.position)
    }

    /// Returns a copy of the element moved to `position`.
    pub fn with_position(&self, position: f64) -> GgResult<Self> {
        validate_position(position)?;
        Ok(Self {
            position,
            ..self.clone()
        })
    }
}

impl Display for StackElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.feature, PART_INFIX, format_position(self.position))?;
        if let Some(change) = &self.change {
            write!(f, "{}{}", FIELD_SEPARATOR, change)?;
        }
        Ok(())
    }
}

/// Parses a branch name into a [StackElement].
///
/// A name without the `-part_` infix is a bare feature at position `0.0`.
pub fn parse(identifier: &str) -> GgResult<StackElement> {
    let Some((feature, suffix)) = identifier.split_once(PART_INFIX) else {
        return Ok(StackElement {
            feature: identifier.to_string(),
            position: 0.0,
            change: None,
        });
    };

    let (raw_position, change) = match suffix.split_once(FIELD_SEPARATOR) {
        Some((raw_position, change)) => (raw_position, Some(change.to_string())),
        None => (suffix, None),
    };

    let position = raw_position
        .parse::<f64>()
        .map_err(|e| GgError::MalformedIdentifier {
            identifier: identifier.to_string(),
            reason: format!("position `{}` is not a number ({})", raw_position, e),
        })?;
    if !position.is_finite() {
        return Err(GgError::MalformedIdentifier {
            identifier: identifier.to_string(),
            reason: format!("position `{}` is not finite", raw_position),
        });
    }

    Ok(StackElement {
        feature: feature.to_string(),
        position,
        change,
    })
}

/// Returns the marker branch name for `identifier`.
pub fn marker_for(identifier: &str) -> String {
    format!("{}{}", MARKER_PREFIX, identifier)
}

/// Returns the element identifier behind a marker branch name, or [None] if `branch` is
/// not a marker.
pub fn target_from_marker(branch: &str) -> Option<String> {
    branch.strip_prefix(MARKER_PREFIX).map(ToOwned::to_owned)
}

/// Returns the temporary branch name used while restacking `branch`.
pub fn temp_for(branch: &str) -> String {
    format!("{}{}", TEMP_PREFIX, branch)
}

/// Returns the branch behind a temporary branch name, or [None] if `branch` is not
/// temporary.
pub fn target_from_temp(branch: &str) -> Option<String> {
    branch.strip_prefix(TEMP_PREFIX).map(ToOwned::to_owned)
}

/// Returns the rounded comparison key for `position`.
pub fn position_key(position: f64) -> i64 {
    // `as` saturates, so infinite bounds map to the ends of the key space.
    (position * POSITION_SCALE).round() as i64
}

/// Renders a position with at least one decimal digit (`1.0`, `1.5`, `2.25`).
fn format_position(position: f64) -> String {
    let rendered = position.to_string();
    if rendered.contains('.') {
        rendered
    } else {
        format!("{}.0", rendered)
    }
}

/// Rejects positions that would not survive a round trip through [parse]: negative, zero
/// or non-finite.
pub fn validate_position(position: f64) -> GgResult<()> {
    if !position.is_finite() || position_key(position) <= 0 {
        return Err(GgError::InvalidPosition(position));
    }
    Ok(())
}

fn validate_field(field: &'static str, value: &str) -> GgResult<()> {
    if value.contains(FIELD_SEPARATOR) {
        return Err(GgError::InvalidField {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn format(feature: &str, position: Option<f64>, change: Option<&str>) -> GgResult<String> {
        StackElement::new(feature, position, change).map(|element| element.identifier())
    }

    #[test]
    fn parse_bare_feature() {
        let element = parse("my_feature").unwrap();
        assert_eq!(element.feature, "my_feature");
        assert_eq!(element.position, 0.0);
        assert_eq!(element.change, None);
    }

    #[test]
    fn parse_full_identifier() {
        let element = parse("login-part_2.5-add_button").unwrap();
        assert_eq!(element.feature, "login");
        assert_eq!(element.position, 2.5);
        assert_eq!(element.change.as_deref(), Some("add_button"));
    }

    #[test]
    fn parse_keeps_everything_after_second_separator_as_change() {
        let element = parse("login-part_1.0-fix-typo").unwrap();
        assert_eq!(element.change.as_deref(), Some("fix-typo"));
    }

    #[test]
    fn parse_rejects_non_numeric_position() {
        assert!(matches!(
            parse("login-part_abc"),
            Err(GgError::MalformedIdentifier { .. })
        ));
        assert!(matches!(
            parse("login-part_inf"),
            Err(GgError::MalformedIdentifier { .. })
        ));
    }

    #[test]
    fn format_defaults_position() {
        assert_eq!(format("login", None, None).unwrap(), "login-part_1.0");
        assert_eq!(
            format("login", Some(3.0), Some("api")).unwrap(),
            "login-part_3.0-api"
        );
        assert_eq!(format("login", Some(1.25), None).unwrap(), "login-part_1.25");
    }

    #[test]
    fn format_rejects_separator() {
        assert!(matches!(
            format("log-in", None, None),
            Err(GgError::InvalidField { field: "feature", .. })
        ));
        assert!(matches!(
            format("login", None, Some("a-b")),
            Err(GgError::InvalidField { field: "change", .. })
        ));
        assert!(matches!(
            format("", None, None),
            Err(GgError::InvalidField { .. })
        ));
    }

    #[test]
    fn parse_inverts_format() {
        let cases = [
            ("f", 1.0, None),
            ("f", 1.5, Some("c")),
            ("feature_x", 12.125, Some("with_label")),
            ("f", 0.001, None),
        ];
        for (feature, position, change) in cases {
            let identifier = format(feature, Some(position), change).unwrap();
            let element = parse(&identifier).unwrap();
            assert_eq!(element.feature, feature);
            assert_eq!(element.position, position);
            assert_eq!(element.change.as_deref(), change);
        }
    }

    #[test]
    fn marker_and_temp_names() {
        assert_eq!(marker_for("f-part_1.0"), "_start_-f-part_1.0");
        assert_eq!(
            target_from_marker("_start_-f-part_1.0").as_deref(),
            Some("f-part_1.0")
        );
        assert_eq!(target_from_marker("f-part_1.0"), None);

        assert_eq!(temp_for("f-part_1.0"), "_tmp_-f-part_1.0");
        assert_eq!(
            target_from_temp("_tmp_-_start_-f-part_1.0").as_deref(),
            Some("_start_-f-part_1.0")
        );
        assert_eq!(target_from_temp("main"), None);
    }

    #[test]
    fn position_key_rounds() {
        assert_eq!(position_key(1.0), 1000);
        assert_eq!(position_key(1.0004), 1000);
        assert_eq!(position_key(1.0006), 1001);
        assert_eq!(position_key(f64::INFINITY), i64::MAX);
    }

    #[test]
    fn new_rejects_positions_parse_would_reject() {
        for position in [-1.0, 0.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                StackElement::new("login", Some(position), None),
                Err(GgError::InvalidPosition(_))
            ));
        }

        let element = StackElement::new("login", Some(2.5), Some("api")).unwrap();
        assert_eq!(parse(&element.identifier()).unwrap(), element);
        assert!(matches!(
            element.with_position(-0.5),
            Err(GgError::InvalidPosition(_))
        ));
        assert_eq!(element.with_position(3.0).unwrap().identifier(), "login-part_3.0-api");
    }
}
