use crate::axis::AxisRole;
use crate::coordinate_system::CsId;

/// Errors that can occur in the geometry core.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A projection that needs a view direction was given a zero or non-finite one.
    ZeroViewDirection,

    /// A configuration value is out of range or inconsistent.
    InvalidConfiguration(String),

    /// An internal invariant does not hold (programming error).
    InvariantViolation(String),

    /// The coordinate system handle is stale or belongs to another tree.
    UnknownCoordinateSystem(CsId),

    /// An axis was looked up on a coordinate system it does not belong to.
    AxisNotInSystem { system: CsId, role: AxisRole },

    /// A data value cannot be converted by a dimension.
    InvalidDataValue { dimension: String, value: String },

    /// The interval search produced no boundaries.
    IntervalSearchExhausted { min: f64, max: f64, target_count: usize },

    /// Calendar fields do not form a valid date.
    InvalidCalendarDate {
        year: i32,
        month: u32,
        day: u32,
    },

    /// A timestamp lies outside the representable calendar range.
    TimestampOutOfRange(i64),
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroViewDirection => {
                write!(f, "View direction must be a finite, non-zero vector")
            }
            Self::InvalidConfiguration(msg) => write!(f, "Invalid configuration: {}", msg),
            Self::InvariantViolation(msg) => write!(f, "Invariant violated: {}", msg),
            Self::UnknownCoordinateSystem(id) => {
                write!(f, "Coordinate system {:?} does not exist", id)
            }
            Self::AxisNotInSystem { system, role } => write!(
                f,
                "Axis with role {:?} does not belong to coordinate system {:?}",
                role, system
            ),
            Self::InvalidDataValue { dimension, value } => write!(
                f,
                "Value {} cannot be converted by dimension '{}'",
                value, dimension
            ),
            Self::IntervalSearchExhausted {
                min,
                max,
                target_count,
            } => write!(
                f,
                "Interval search over [{}, {}] with target {} produced no boundaries",
                min, max, target_count
            ),
            Self::InvalidCalendarDate { year, month, day } => {
                write!(f, "Invalid calendar date {:04}-{:02}-{:02}", year, month, day)
            }
            Self::TimestampOutOfRange(seconds) => write!(
                f,
                "Timestamp {} is outside the supported calendar range",
                seconds
            ),
        }
    }
}

impl std::error::Error for GeometryError {}

/// Result type for geometry operations.
pub type GeometryResult<T> = Result<T, GeometryError>;
