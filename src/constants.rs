//! Constants for the `gg` application.

use nu_ansi_term::Color;

/// Name of the configuration file, relative to the user's home directory.
pub(crate) const GG_CFG_FILE_NAME: &str = ".gg_config.toml";

/// Separates the feature, position and change fields of an identifier.
pub(crate) const FIELD_SEPARATOR: char = '-';

/// Infix between the feature name and the position of a stack element.
pub(crate) const PART_INFIX: &str = "-part_";

/// Prefix of the branch that records where a stack element started.
pub(crate) const MARKER_PREFIX: &str = "_start_-";

/// Prefix of the scratch branches that hold replayed commits during a restack.
pub(crate) const TEMP_PREFIX: &str = "_tmp_-";

/// Position given to a new element when none is requested.
pub(crate) const DEFAULT_POSITION: f64 = 1.0;

/// Positions are compared after scaling by this factor and rounding.
pub(crate) const POSITION_SCALE: f64 = 1000.0;

/// Minimum distance past the current position for an element to count as "next".
pub(crate) const NEXT_OFFSET: f64 = 0.01;

/// Upper bound used for open-ended position ranges.
pub(crate) const UNBOUNDED_POSITION: f64 = f64::INFINITY;

/// Build state reported by GitHub when every status check passed.
pub(crate) const BUILD_SUCCESS: &str = "success";

pub(crate) const COLORS: [Color; 6] = [
    Color::Blue,
    Color::Cyan,
    Color::Green,
    Color::Red,
    Color::Yellow,
    Color::Purple,
];

pub(crate) const FILLED_CIRCLE: char = '●';
pub(crate) const EMPTY_CIRCLE: char = '○';
