use elevate_core::{Component, FieldKind, Node};
use serde::Serialize;

/// Where an elevated field's current value comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// A synchronous write the host has not confirmed yet.
    Shadow,
    Container,
    /// Not present anywhere.
    Missing,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldSnapshot {
    pub name: String,
    pub kind: String,
    pub writable: bool,
    pub source: Source,
    pub type_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComponentSnapshot {
    pub class: String,
    pub parent: Option<String>,
    pub mounted: bool,
    pub render_count: u64,
    pub fields: Vec<FieldSnapshot>,
}

pub struct Inspector {
    pub enabled: bool,
    snapshots_taken: u64,
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new()
    }
}

impl Inspector {
    pub fn new() -> Self {
        Self {
            enabled: true,
            snapshots_taken: 0,
        }
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    pub fn snapshots_taken(&self) -> u64 {
        self.snapshots_taken
    }

    pub fn snapshot<R: Node>(&mut self, component: &Component<R>) -> ComponentSnapshot {
        self.snapshots_taken += 1;
        let class = component.class();
        let fields = class
            .fields()
            .iter()
            .map(|d| {
                let value = component.get(d.name).ok().flatten();
                let source = match (d.kind, &value) {
                    (FieldKind::State, _) if component.is_shadowed(d.name) => Source::Shadow,
                    (_, Some(_)) => Source::Container,
                    (_, None) => Source::Missing,
                };
                FieldSnapshot {
                    name: d.name.to_string(),
                    kind: d.kind.to_string(),
                    writable: d.access.contains(elevate_core::FieldAccess::WRITE),
                    source,
                    type_name: value.map(|v| v.type_name().to_string()),
                }
            })
            .collect();
        ComponentSnapshot {
            class: class.name().to_string(),
            parent: class.parent().map(str::to_string),
            mounted: component.is_mounted(),
            render_count: component.render_count(),
            fields,
        }
    }

    /// One line per field.
    pub fn table<R: Node>(&mut self, component: &Component<R>) -> String {
        let snap = self.snapshot(component);
        let mut lines = vec![format!(
            "{} (renders: {}{})",
            snap.class,
            snap.render_count,
            if snap.mounted { "" } else { ", unmounted" }
        )];
        for f in &snap.fields {
            lines.push(format!(
                "  {:<12} {:<8} {:<2} {:<9} {}",
                f.name,
                f.kind,
                if f.writable { "rw" } else { "r" },
                format!("{:?}", f.source).to_lowercase(),
                f.type_name.as_deref().unwrap_or("-")
            ));
        }
        lines.join("\n")
    }

    pub fn to_json<R: Node>(&mut self, component: &Component<R>) -> String {
        let snap = self.snapshot(component);
        serde_json::to_string(&snap).unwrap_or_else(|e| {
            log::warn!("elevate-devtools: snapshot serialization failed: {e}");
            String::from("{}")
        })
    }

    /// Logs the field table at debug level when enabled.
    pub fn frame<R: Node>(&mut self, component: &Component<R>) {
        if self.enabled {
            let table = self.table(component);
            log::debug!("{table}");
        }
    }
}
