//! Crate-wide defaults for inspector widgets.
//!
//! Usage: `spin::float_spin(ui, v, -FLOAT_FIELD_MAX..=FLOAT_FIELD_MAX, ..)`

/// Absolute bound of the float field range
pub const FLOAT_FIELD_MAX: f64 = 99_999_999_999.0;

/// Single wheel/drag step of the float field
pub const FLOAT_FIELD_STEP: f64 = 0.1;

/// Displayed/committed float precision
pub const FLOAT_FIELD_DECIMALS: usize = 4;

/// Absolute bound of the int field range
pub const INT_FIELD_MAX: i32 = 999_999_999;

/// Default label column width in the inspector panel
pub const LABEL_COLUMN_WIDTH: f32 = 140.0;
