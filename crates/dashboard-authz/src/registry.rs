//! Registry loading and normalization.
//!
//! # Purpose
//! Parses registry text (`apps: [ { application: {...} } ]`, YAML or JSON) into
//! validated [`ApplicationEntry`] records, derives display names, and sorts the
//! result case-insensitively by name.
//!
//! # Key invariants
//! - A parse failure returns [`RegistryError::ParseFailure`]; nothing partial is
//!   ever returned.
//! - Invalid entries are dropped with a warning and kept only as
//!   [`RegistryError::InvalidEntry`] records for operability.
//! - A missing or null `apps` key is an empty registry, not an error.
use crate::errors::{RegistryError, RegistryResult};
use crate::types::{AccessProvider, ApplicationEntry, AssuranceLevel, DisplayFlag};
use crate::vanity::VanityMap;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeSet;

/// Longest display name shown on a tile before truncation kicks in.
pub const DISPLAY_NAME_MAX: usize = 18;
const TRUNCATED_PREFIX: usize = 16;
const TRUNCATION_MARKER: &str = "..";

const REQUIRED_FIELDS: [&str; 3] = ["display", "authorized_groups", "authorized_users"];

/// Normalized, immutable application registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    entries: Vec<ApplicationEntry>,
    rejected: Vec<RegistryError>,
}

impl Registry {
    /// Registry with no entries; what callers use before the first good load.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse and normalize registry text.
    ///
    /// # Errors
    /// - [`RegistryError::ParseFailure`] when the text is not a structured
    ///   document of the expected shape.
    pub fn load(raw_text: &str) -> RegistryResult<Self> {
        let document: Value = serde_yaml::from_str(raw_text)
            .map_err(|err| RegistryError::ParseFailure(err.to_string()))?;

        let items = match document {
            Value::Null => return Ok(Self::empty()),
            Value::Mapping(mut root) => match root.remove("apps") {
                None | Some(Value::Null) => return Ok(Self::empty()),
                Some(Value::Sequence(items)) => items,
                Some(_) => {
                    return Err(RegistryError::ParseFailure(
                        "`apps` must be a sequence".to_string(),
                    ));
                }
            },
            _ => {
                return Err(RegistryError::ParseFailure(
                    "registry document must be a mapping".to_string(),
                ));
            }
        };

        let mut entries = Vec::with_capacity(items.len());
        let mut rejected = Vec::new();
        for (position, item) in items.iter().enumerate() {
            match parse_entry(position, item) {
                Ok(entry) => entries.push(entry),
                Err(err) => {
                    tracing::warn!(error = %err, "skipping invalid registry entry");
                    rejected.push(err);
                }
            }
        }

        entries.sort_by_cached_key(|entry| entry.name.to_lowercase());

        tracing::debug!(
            entries = entries.len(),
            rejected = rejected.len(),
            "registry loaded"
        );
        Ok(Self { entries, rejected })
    }

    pub fn entries(&self) -> &[ApplicationEntry] {
        &self.entries
    }

    pub fn rejected(&self) -> &[RegistryError] {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build the vanity path map from the valid entries, in registry order.
    pub fn vanity_urls(&self) -> VanityMap {
        VanityMap::from_entries(&self.entries)
    }
}

/// Shorten a name to the tile budget: names longer than [`DISPLAY_NAME_MAX`]
/// characters become their first 16 characters followed by `..`.
pub fn truncate_display_name(name: &str) -> String {
    if name.chars().count() > DISPLAY_NAME_MAX {
        let mut short: String = name.chars().take(TRUNCATED_PREFIX).collect();
        short.push_str(TRUNCATION_MARKER);
        short
    } else {
        name.to_string()
    }
}

fn parse_entry(position: usize, item: &Value) -> RegistryResult<ApplicationEntry> {
    let app = item
        .get("application")
        .and_then(Value::as_mapping)
        .ok_or_else(|| RegistryError::invalid(position, "", "missing `application` mapping"))?;

    let name = string_field(app, "name");
    for field in REQUIRED_FIELDS {
        if !app.contains_key(field) {
            return Err(RegistryError::invalid(
                position,
                &name,
                format!("missing required field `{field}`"),
            ));
        }
    }

    let display = display_flag(app.get("display"))
        .ok_or_else(|| RegistryError::invalid(position, &name, "`display` must be a scalar"))?;
    let authorized_users = string_set(app.get("authorized_users")).ok_or_else(|| {
        RegistryError::invalid(position, &name, "`authorized_users` must be a sequence")
    })?;
    let authorized_groups = string_set(app.get("authorized_groups")).ok_or_else(|| {
        RegistryError::invalid(position, &name, "`authorized_groups` must be a sequence")
    })?;

    let aal = app.get("AAL").and_then(Value::as_str).and_then(|raw| {
        let level = AssuranceLevel::parse(raw);
        if level.is_none() {
            tracing::debug!(app = %name, aal = raw, "ignoring unknown assurance level");
        }
        level
    });

    Ok(ApplicationEntry {
        display_name: truncate_display_name(&name),
        url: string_field(app, "url"),
        logo: string_field(app, "logo"),
        access_provider: AccessProvider::parse(&string_field(app, "op")),
        display,
        authorized_users,
        authorized_groups,
        vanity_paths: vanity_paths(app.get("vanity_url")),
        client_id: app
            .get("client_id")
            .and_then(Value::as_str)
            .map(str::to_string),
        aal,
        name,
    })
}

fn string_field(app: &Mapping, key: &str) -> String {
    app.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

fn display_flag(value: Option<&Value>) -> Option<DisplayFlag> {
    match value? {
        Value::Bool(flag) => Some(DisplayFlag::Bool(*flag)),
        Value::String(text) => Some(DisplayFlag::Text(text.clone())),
        Value::Null => Some(DisplayFlag::Bool(false)),
        Value::Number(number) => Some(DisplayFlag::Bool(number.as_f64() != Some(0.0))),
        _ => None,
    }
}

fn string_set(value: Option<&Value>) -> Option<BTreeSet<String>> {
    let items = value?.as_sequence()?;
    Some(
        items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
    )
}

fn vanity_paths(value: Option<&Value>) -> Vec<String> {
    // Absent or non-sequence vanity fields are ignored rather than rejected.
    value
        .and_then(Value::as_sequence)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
