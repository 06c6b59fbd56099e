// Copyright 2025 the Lens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Seams to the host application.

use kurbo::Size;
use lens_doc::NodeId;

use crate::{BoundaryError, UnitId, ViewId};

/// Image data handed to the clipboard or a download.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageData {
    /// Serialized vector markup.
    Vector(String),
    /// Location of a raster image.
    Raster(String),
}

/// What to put on the clipboard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClipboardPayload {
    /// Plain text.
    Text(String),
    /// An image; the host rasterizes vector data itself.
    Image(ImageData),
}

/// Side-effecting facilities the host provides.
///
/// Every fallible method reports failure as a [`BoundaryError`]; the engine
/// turns those into a [`HostBoundary::notice`] and a logged error.
pub trait HostBoundary {
    /// Writes to the system clipboard.
    fn write_clipboard(&mut self, payload: ClipboardPayload) -> Result<(), BoundaryError>;

    /// Offers `data` as a file download named `file_name`.
    fn download(&mut self, file_name: &str, data: ImageData) -> Result<(), BoundaryError>;

    /// Shows a transient message to the user.
    fn notice(&mut self, message: &str);

    /// Presents `container` fullscreen and returns the screen size.
    fn request_fullscreen(&mut self, container: NodeId) -> Result<Size, BoundaryError>;

    /// Leaves fullscreen.
    fn exit_fullscreen(&mut self) -> Result<(), BoundaryError>;

    /// Returns the source text the unit's content was rendered from, if known.
    fn source_text(&self, view: ViewId, unit: UnitId) -> Option<String>;
}

/// Bookkeeping callbacks. The engine does not track which host object a
/// unit belongs to beyond its [`ViewId`]; hosts that need more hook in here.
pub trait EngineHooks {
    /// A unit was created for `view`.
    fn on_unit_created(&mut self, view: ViewId, unit: UnitId) {
        let _ = (view, unit);
    }

    /// Every unit of `view` was torn down.
    fn on_units_cleared_for_view(&mut self, view: ViewId) {
        let _ = view;
    }
}
