//! Renderer: artifact grouping, serialization, and raw override application
//!
//! Groups validated properties by destination artifact and serializes each
//! group: properties-style files as `key=value` lines, environment files as
//! `KEY="value"` lines. Line order is the stable first-seen order of the
//! resolved properties, never alphabetical, so repeated resolutions diff
//! cleanly.
//!
//! Raw `configOverrides` are applied last, per file: an override replaces
//! the line with its exact key or appends a new one. Overrides are never
//! validated - an override can silently replace a value the validator
//! accepted. That is the documented escape hatch, preserved exactly.

use std::collections::BTreeMap;

use tracing::debug;

use crate::catalog::{DestinationKind, PropertyCatalog};
use crate::merge::ValueSource;
use crate::validate::ResolvedProperty;

/// Line syntax of a rendered artifact
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ArtifactStyle {
    /// `key=value`
    Properties,
    /// `KEY="value"`
    Environment,
}

/// One artifact being assembled, entries in first-seen order
struct RenderedFile {
    style: ArtifactStyle,
    entries: Vec<(String, String, ValueSource)>,
}

impl RenderedFile {
    fn new(style: ArtifactStyle) -> Self {
        Self {
            style,
            entries: Vec::new(),
        }
    }

    /// Replace the value for an existing key or append a new entry
    fn set(&mut self, key: &str, value: &str, source: ValueSource) {
        match self.entries.iter_mut().find(|(k, _, _)| k == key) {
            Some(entry) => {
                if source == ValueSource::ExplicitOverride {
                    debug!(key, "raw override replaces computed value");
                }
                entry.1 = value.to_string();
                entry.2 = source;
            }
            None => self
                .entries
                .push((key.to_string(), value.to_string(), source)),
        }
    }

    fn serialize(&self) -> String {
        let mut out = String::new();
        for (key, value, _) in &self.entries {
            match self.style {
                ArtifactStyle::Properties => {
                    out.push_str(key);
                    out.push('=');
                    out.push_str(value);
                }
                ArtifactStyle::Environment => {
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(value);
                    out.push('"');
                }
            }
            out.push('\n');
        }
        out
    }
}

fn file_entry<'a>(
    files: &'a mut BTreeMap<String, RenderedFile>,
    name: &str,
    style: ArtifactStyle,
) -> &'a mut RenderedFile {
    files
        .entry(name.to_string())
        .or_insert_with(|| RenderedFile::new(style))
}

fn style_for(file: &str) -> ArtifactStyle {
    if file == crate::SPARK_ENV_SH {
        ArtifactStyle::Environment
    } else {
        ArtifactStyle::Properties
    }
}

/// Render resolved properties into per-file artifact contents
///
/// Properties with a catalog definition render once per binding (legacy and
/// current names both receive the value). Pass-through properties without a
/// definition land in the primary config file. `config_overrides` are keyed
/// by destination file and applied last.
pub fn render(
    resolved: &[ResolvedProperty],
    config_overrides: &BTreeMap<String, BTreeMap<String, String>>,
    catalog: &PropertyCatalog,
) -> BTreeMap<String, String> {
    let mut files: BTreeMap<String, RenderedFile> = BTreeMap::new();

    for property in resolved {
        match property.definition.as_deref().and_then(|id| catalog.get(id)) {
            Some(def) => {
                for binding in &def.bindings {
                    let style = match binding.kind {
                        DestinationKind::File => ArtifactStyle::Properties,
                        DestinationKind::EnvironmentVariable => ArtifactStyle::Environment,
                    };
                    file_entry(&mut files, binding.artifact(), style).set(
                        &binding.external_name,
                        &property.value,
                        property.source,
                    );
                }
            }
            None => {
                // Catalog-less pass-through keys have no binding to name a
                // destination; they land in the primary config file.
                file_entry(&mut files, crate::SPARK_DEFAULTS_CONF, ArtifactStyle::Properties)
                    .set(&property.key, &property.value, property.source);
            }
        }
    }

    for (file, overrides) in config_overrides {
        let target = file_entry(&mut files, file, style_for(file));
        for (key, value) in overrides {
            target.set(key, value, ValueSource::ExplicitOverride);
        }
    }

    files
        .into_iter()
        .map(|(name, file)| (name, file.serialize()))
        .collect()
}
