pub use types::*;

// Default int types, used unless the `i64` feature is enabled.
#[cfg(not(feature = "i64"))]
mod types {
    /// Type representing an integer constant.
    pub type IntCst = i32;

    /// Type used to store the result of operations on `IntCst` that may overflow
    pub type LongCst = i64;

    /// Name of the `IntCst` underlying type
    pub const INT_TYPE_NAME: &str = "i32";
}

#[cfg(feature = "i64")]
mod types {
    /// Type representing an integer constant.
    pub type IntCst = i64;

    /// Type used to store the result of operations on `IntCst` that may overflow
    pub type LongCst = i128;

    /// Name of the `IntCst` underlying type
    pub const INT_TYPE_NAME: &str = "i64";
}

/// Convert IntCst to LongCst
pub(crate) const fn cst_int_to_long(cst: IntCst) -> LongCst {
    cst as LongCst
}

/// Convert LongCst to IntCst, saturating at the infinity sentinels.
pub(crate) fn cst_long_to_int(cst: LongCst) -> IntCst {
    if cst <= NEG_INF as LongCst {
        NEG_INF
    } else if cst >= POS_INF as LongCst {
        POS_INF
    } else {
        cst as IntCst
    }
}

/// Sentinel standing for minus infinity. It is never a legal value of a domain and is returned
/// by [`Domain::previous`](crate::core::Domain::previous) when there is no smaller value.
pub const NEG_INF: IntCst = IntCst::MIN;

/// Sentinel standing for plus infinity. It is never a legal value of a domain and is returned
/// by [`Domain::next`](crate::core::Domain::next) when there is no larger value.
pub const POS_INF: IntCst = IntCst::MAX;

/// Smallest value a domain may contain.
pub const INT_CST_MIN: IntCst = NEG_INF + 1;

/// Largest value a domain may contain.
pub const INT_CST_MAX: IntCst = POS_INF - 1;
