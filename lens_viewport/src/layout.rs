// Copyright 2025 the Lens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Container sizing.

use kurbo::Size;

use crate::settings::Dimensions;

/// Resolves container dimensions against the element's natural size.
///
/// Percentages are taken per axis. The width never exceeds
/// `available_width` when that is known (positive).
#[must_use]
pub fn resolve(dims: Dimensions, natural: Size, available_width: f64) -> Size {
    let mut width = dims.width.resolve(natural.width);
    let height = dims.height.resolve(natural.height);
    if available_width > 0.0 {
        width = width.min(available_width);
    }
    Size::new(width.max(0.0), height.max(0.0))
}

/// Formats a pixel length for an inline style.
pub(crate) fn px(value: f64) -> String {
    format!("{}px", round3(value))
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}
