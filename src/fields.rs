//! Field projection over [`Document`] values.
//!
//! Clients may ask for a subset of a document's fields (`?fields=title,description`)
//! or for everything except some fields. Projection is driven by a static
//! field registry mapping each document field's internal name and wire name
//! to a copy function, so no runtime struct reflection is needed.
//!
//! Projection is permissive: unknown field names are skipped silently, never
//! rejected. A client asking for `fields=bogus` gets an empty value for that
//! name, not an error.
//!
//! Callers treat an empty keep-list as "no filtering requested" and must not
//! call [`project`] in that case; the projector itself projects exactly what
//! it is told to.

use crate::models::Document;

type CopyFn = fn(&Document, &mut Document);

struct FieldSpec {
    /// Rust-side field name.
    internal: &'static str,
    /// JSON wire name, as clients address fields.
    wire: &'static str,
    copy: CopyFn,
}

/// One entry per [`Document`] field, in declaration order.
static REGISTRY: &[FieldSpec] = &[
    FieldSpec {
        internal: "internal_id",
        wire: "_internal_id",
        copy: |src, dst| dst.internal_id = src.internal_id.clone(),
    },
    FieldSpec {
        internal: "id",
        wire: "_id",
        copy: |src, dst| dst.id = src.id.clone(),
    },
    FieldSpec {
        internal: "title",
        wire: "title",
        copy: |src, dst| dst.title = src.title.clone(),
    },
    FieldSpec {
        internal: "description",
        wire: "description",
        copy: |src, dst| dst.description = src.description.clone(),
    },
    FieldSpec {
        internal: "owner",
        wire: "owner",
        copy: |src, dst| dst.owner = src.owner.clone(),
    },
    FieldSpec {
        internal: "contributors",
        wire: "contributors",
        copy: |src, dst| dst.contributors = src.contributors.clone(),
    },
    FieldSpec {
        internal: "primary_url",
        wire: "primary_url",
        copy: |src, dst| dst.primary_url = src.primary_url.clone(),
    },
    FieldSpec {
        internal: "other_urls",
        wire: "other_urls",
        copy: |src, dst| dst.other_urls = src.other_urls.clone(),
    },
    FieldSpec {
        internal: "thumbnail_url",
        wire: "thumbnail_url",
        copy: |src, dst| dst.thumbnail_url = src.thumbnail_url.clone(),
    },
    FieldSpec {
        internal: "content",
        wire: "content",
        copy: |src, dst| dst.content = src.content.clone(),
    },
    FieldSpec {
        internal: "publication_date",
        wire: "publication_date",
        copy: |src, dst| dst.publication_date = src.publication_date.clone(),
    },
    FieldSpec {
        internal: "modified_date",
        wire: "modified_date",
        copy: |src, dst| dst.modified_date = src.modified_date.clone(),
    },
    FieldSpec {
        internal: "language",
        wire: "language",
        copy: |src, dst| dst.language = src.language.clone(),
    },
    FieldSpec {
        internal: "content_type",
        wire: "content_type",
        copy: |src, dst| dst.content_type = src.content_type.clone(),
    },
    FieldSpec {
        internal: "network_node",
        wire: "network_node",
        copy: |src, dst| dst.network_node = src.network_node.clone(),
    },
];

/// How requested field names are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    /// Keep the named fields, resolved by internal name.
    KeepInternal,
    /// Keep the named fields, resolved by wire (JSON) name.
    KeepWire,
    /// Keep every field except the named ones, resolved by internal name.
    RemoveInternal,
}

/// Builds a new document containing only the permitted fields; everything
/// else stays at its zero value. The input is never mutated.
pub fn project<S: AsRef<str>>(doc: &Document, fields: &[S], mode: ProjectionMode) -> Document {
    let mut out = Document::default();
    match mode {
        ProjectionMode::KeepInternal => {
            for name in fields {
                if let Some(spec) = REGISTRY.iter().find(|s| s.internal == name.as_ref()) {
                    (spec.copy)(doc, &mut out);
                }
            }
        }
        ProjectionMode::KeepWire => {
            for name in fields {
                if let Some(spec) = REGISTRY.iter().find(|s| s.wire == name.as_ref()) {
                    (spec.copy)(doc, &mut out);
                }
            }
        }
        ProjectionMode::RemoveInternal => {
            for spec in REGISTRY {
                if !fields.iter().any(|f| f.as_ref() == spec.internal) {
                    (spec.copy)(doc, &mut out);
                }
            }
        }
    }
    out
}
