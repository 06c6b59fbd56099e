// Copyright 2025 the Lens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Context-menu actions against the clipboard and download boundary.

use lens_doc::{Document, MarkupOptions};

use crate::host::{ClipboardPayload, HostBoundary, ImageData};
use crate::unit::{ATTRIBUTE_PREFIX, CONTAINER_CLASS, CONTENT_CLASS, Unit};
use crate::{BoundaryError, UnitKind};

/// Context-menu entries offered on a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContextAction {
    /// Save the image as a file.
    Export,
    /// Put the image on the clipboard.
    CopyImage,
    /// Put the element's markup on the clipboard.
    CopyMarkup,
    /// Put the text the element was rendered from on the clipboard.
    CopySource,
}

impl ContextAction {
    fn label(self) -> &'static str {
        match self {
            Self::Export => "export image",
            Self::CopyImage => "copy image",
            Self::CopyMarkup => "copy markup",
            Self::CopySource => "copy source",
        }
    }
}

/// How a host-facing action ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The host carried it out.
    Done,
    /// Nothing happened: unknown unit, or the panel has no such button.
    Ignored,
    /// The host failed; the user has already been notified.
    Failed(BoundaryError),
}

/// File name for an exported unit: `<rule>-<unit>.<svg|png>`, with the rule
/// name reduced to lowercase ASCII letters, digits, and dashes.
#[must_use]
pub fn export_file_name(unit: &Unit) -> String {
    let mut slug = String::with_capacity(unit.rule_name().len());
    for c in unit.rule_name().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    let slug = if slug.is_empty() { "unit" } else { slug };
    format!("{slug}-{}.{}", unit.id(), unit.kind().extension())
}

/// Runs `action` for `unit`. Failures are reported through
/// [`HostBoundary::notice`] and logged; they never propagate.
pub(crate) fn run(
    action: ContextAction,
    unit: &Unit,
    doc: &Document,
    host: &mut dyn HostBoundary,
) -> ActionOutcome {
    match perform(action, unit, doc, host) {
        Ok(()) => ActionOutcome::Done,
        Err(err) => {
            tracing::error!(unit = %unit.id(), action = action.label(), error = %err, "context action failed");
            host.notice(&format!("Could not {}: {err}", action.label()));
            ActionOutcome::Failed(err)
        }
    }
}

fn perform(
    action: ContextAction,
    unit: &Unit,
    doc: &Document,
    host: &mut dyn HostBoundary,
) -> Result<(), BoundaryError> {
    match action {
        ContextAction::Export => {
            let data = image_data(unit, doc)?;
            host.download(&export_file_name(unit), data)
        }
        ContextAction::CopyImage => {
            let data = image_data(unit, doc)?;
            host.write_clipboard(ClipboardPayload::Image(data))
        }
        ContextAction::CopyMarkup => {
            let markup = source_markup(unit, doc).ok_or(BoundaryError::NothingToCopy)?;
            host.write_clipboard(ClipboardPayload::Text(markup))
        }
        ContextAction::CopySource => {
            let text = host
                .source_text(unit.view(), unit.id())
                .filter(|t| !t.is_empty())
                .ok_or(BoundaryError::NothingToCopy)?;
            host.write_clipboard(ClipboardPayload::Text(text))
        }
    }
}

fn image_data(unit: &Unit, doc: &Document) -> Result<ImageData, BoundaryError> {
    match unit.kind() {
        UnitKind::Vector => source_markup(unit, doc)
            .map(ImageData::Vector)
            .ok_or(BoundaryError::NothingToCopy),
        UnitKind::Raster => doc
            .attribute(unit.element(), "src")
            .filter(|src| !src.is_empty())
            .map(|src| ImageData::Raster(src.to_owned()))
            .ok_or(BoundaryError::NothingToCopy),
    }
}

/// The element's markup without the engine's own attributes and classes.
fn source_markup(unit: &Unit, doc: &Document) -> Option<String> {
    let options = MarkupOptions {
        skip_attribute_prefix: Some(ATTRIBUTE_PREFIX),
        skip_classes: &[CONTAINER_CLASS, CONTENT_CLASS],
    };
    doc.to_markup_with(unit.element(), options)
}
