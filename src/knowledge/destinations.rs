//! Destination catalog: descriptive metadata keyed by destination id.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{KnowledgeError, KnowledgeResult};

const DESTINATIONS_TOML: &str = include_str!("../../data/knowledge/destinations.toml");

/// Descriptive record for one destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub region: String,
    /// Icon shown next to the name.
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default)]
    pub climate: Vec<String>,
    #[serde(default)]
    pub altitude: String,
    #[serde(default)]
    pub avg_temperature: String,
    #[serde(default)]
    pub best_months: Vec<String>,
    #[serde(default)]
    pub accommodations: String,
    #[serde(default)]
    pub local_food: String,
    #[serde(default)]
    pub local_transport: String,
}

impl Destination {
    /// Placeholder returned for ids missing from the catalog.
    pub fn unknown(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            description: "Destino no encontrado".into(),
            region: "Desconocido".into(),
            image: "❓".into(),
            activities: Vec::new(),
            climate: Vec::new(),
            altitude: "N/A".into(),
            avg_temperature: "N/A".into(),
            best_months: Vec::new(),
            accommodations: "N/A".into(),
            local_food: "N/A".into(),
            local_transport: "N/A".into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogToml {
    #[serde(default)]
    destinations: Vec<Destination>,
}

/// All known destinations, in file order.
#[derive(Debug, Clone, Default)]
pub struct DestinationCatalog {
    destinations: Vec<Destination>,
}

impl DestinationCatalog {
    /// The catalog compiled into the binary.
    pub fn bundled() -> KnowledgeResult<Self> {
        Self::from_toml_str(DESTINATIONS_TOML, "bundled")
    }

    pub fn load(path: &Path) -> KnowledgeResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| KnowledgeError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    pub fn from_toml_str(toml_str: &str, origin: &str) -> KnowledgeResult<Self> {
        let parsed: CatalogToml = toml::from_str(toml_str).map_err(|e| KnowledgeError::Parse {
            what: "destination catalog",
            origin: origin.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            destinations: parsed.destinations,
        })
    }

    pub fn get(&self, id: &str) -> Option<&Destination> {
        self.destinations.iter().find(|d| d.id == id)
    }

    /// The catalog entry for `id`, or [`Destination::unknown`].
    pub fn lookup(&self, id: &str) -> Destination {
        match self.get(id) {
            Some(d) => d.clone(),
            None => {
                tracing::debug!(destination = id, "destination not in catalog");
                Destination::unknown(id)
            }
        }
    }

    pub fn list(&self) -> &[Destination] {
        &self.destinations
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_catalog_has_six_destinations() {
        let catalog = DestinationCatalog::bundled().unwrap();
        assert_eq!(catalog.len(), 6);
        let lima = catalog.get("lima").unwrap();
        assert_eq!(lima.region, "Lima");
        assert!(!lima.activities.is_empty());
    }

    #[test]
    fn every_bundled_recommendation_has_a_destination() {
        let catalog = DestinationCatalog::bundled().unwrap();
        let kb = crate::knowledge::KnowledgeBase::bundled().unwrap();
        for consequent in &kb.terminal_consequents {
            let id = consequent.strip_prefix(&kb.recommendation_prefix).unwrap();
            assert!(catalog.get(id).is_some(), "missing destination {id}");
        }
    }

    #[test]
    fn lookup_falls_back_to_placeholder() {
        let catalog = DestinationCatalog::bundled().unwrap();
        let unknown = catalog.lookup("atlantis");
        assert_eq!(unknown.name, "atlantis");
        assert_eq!(unknown.description, "Destino no encontrado");
        assert_eq!(unknown.altitude, "N/A");
        assert!(unknown.best_months.is_empty());
    }

    #[test]
    fn parse_error_names_origin() {
        let err = DestinationCatalog::from_toml_str("[[destinations]]\nname = 1", "inline")
            .unwrap_err();
        assert!(matches!(err, KnowledgeError::Parse { origin, .. } if origin == "inline"));
    }
}
