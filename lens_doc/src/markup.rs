// Copyright 2025 the Lens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Markup serialization, used for vector export and copy-as-markup.

use alloc::string::String;
use core::fmt::Write as _;

use crate::{Document, NodeId};

/// What [`Document::to_markup_with`] leaves out of the output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MarkupOptions<'a> {
    /// Attributes whose names start with this prefix are dropped.
    pub skip_attribute_prefix: Option<&'a str>,
    /// Classes dropped wherever they appear.
    pub skip_classes: &'a [&'a str],
}

impl MarkupOptions<'_> {
    fn keeps_attribute(&self, name: &str) -> bool {
        self.skip_attribute_prefix
            .is_none_or(|prefix| !name.starts_with(prefix))
    }

    fn keeps_class(&self, class: &str) -> bool {
        !self.skip_classes.iter().any(|&skip| skip == class)
    }
}

impl Document {
    /// Serializes `id` and its subtree as markup.
    ///
    /// Attributes keep insertion order; `class` and `style` are emitted first
    /// when present. Returns `None` for stale handles.
    #[must_use]
    pub fn to_markup(&self, id: NodeId) -> Option<String> {
        self.to_markup_with(id, MarkupOptions::default())
    }

    /// Serializes like [`Document::to_markup`], leaving out what `options`
    /// names.
    #[must_use]
    pub fn to_markup_with(&self, id: NodeId, options: MarkupOptions<'_>) -> Option<String> {
        self.data(id)?;
        let mut out = String::new();
        self.write_markup(id, &options, &mut out);
        Some(out)
    }

    fn write_markup(&self, id: NodeId, options: &MarkupOptions<'_>, out: &mut String) {
        let Some(data) = self.data(id) else {
            return;
        };
        out.push('<');
        out.push_str(&data.tag);
        let mut classes = data.classes.iter().filter(|c| options.keeps_class(c));
        if let Some(first) = classes.next() {
            out.push_str(" class=\"");
            escape_into(first, out);
            for class in classes {
                out.push(' ');
                escape_into(class, out);
            }
            out.push('"');
        }
        if !data.style.is_empty() {
            out.push_str(" style=\"");
            for (i, (k, v)) in data.style.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                let _ = write!(out, "{k}: ");
                escape_into(v, out);
                out.push(';');
            }
            out.push('"');
        }
        for (k, v) in data.attrs.iter().filter(|(k, _)| options.keeps_attribute(k)) {
            let _ = write!(out, " {k}=\"");
            escape_into(v, out);
            out.push('"');
        }
        out.push('>');
        if let Some(text) = &data.text {
            escape_into(text, out);
        }
        for &child in &data.children {
            self.write_markup(child, options, out);
        }
        let _ = write!(out, "</{}>", data.tag);
    }
}

fn escape_into(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Document, MarkupOptions};

    #[test]
    fn markup_nests_and_escapes() {
        let mut doc = Document::new();
        let svg = doc.create_element("svg");
        doc.add_class(svg, "flowchart").unwrap();
        doc.set_attribute(svg, "viewBox", "0 0 10 10").unwrap();
        let text = doc.create_element("text");
        doc.set_text(text, Some("a < b & \"c\"")).unwrap();
        doc.append_child(svg, text).unwrap();

        assert_eq!(
            doc.to_markup(svg).as_deref(),
            Some(
                "<svg class=\"flowchart\" viewBox=\"0 0 10 10\">\
                 <text>a &lt; b &amp; &quot;c&quot;</text></svg>"
            )
        );
    }

    #[test]
    fn options_drop_marked_attributes_and_classes() {
        let mut doc = Document::new();
        let svg = doc.create_element("svg");
        doc.add_class(svg, "flowchart").unwrap();
        doc.add_class(svg, "tool-owned").unwrap();
        doc.set_attribute(svg, "data-tool-mark", "yes").unwrap();
        doc.set_attribute(svg, "viewBox", "0 0 10 10").unwrap();
        let g = doc.create_element("g");
        doc.add_class(g, "tool-owned").unwrap();
        doc.append_child(svg, g).unwrap();

        let options = MarkupOptions {
            skip_attribute_prefix: Some("data-tool-"),
            skip_classes: &["tool-owned"],
        };
        assert_eq!(
            doc.to_markup_with(svg, options).as_deref(),
            Some("<svg class=\"flowchart\" viewBox=\"0 0 10 10\"><g></g></svg>")
        );
    }

    #[test]
    fn stale_node_has_no_markup() {
        let mut doc = Document::new();
        let el = doc.create_element("img");
        doc.destroy(el).unwrap();
        assert_eq!(doc.to_markup(el), None);
    }
}
