//! User travel preferences and their translation into facts.

use serde::{Deserialize, Serialize};

use crate::chain::Fact;

/// Preferences collected from the user. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelPreferences {
    /// Preferred activity, e.g. `cultura`, `aventura`, `gastronomia`.
    pub actividad_preferida: Option<String>,
    /// Budget band: `baja`, `media`, `alta`.
    pub presupuesto: Option<String>,
    /// Preferred climate: `calido`, `templado`, `frio`, `variado`.
    pub clima_preferido: Option<String>,
    /// Trip length: `1-3`, `4-7`, `7+`.
    pub duracion: Option<String>,
    /// Travel group: `solo`, `pareja`, `familia`, `amigos`.
    pub tipo_grupo: Option<String>,
}

impl TravelPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_activity(mut self, value: impl Into<String>) -> Self {
        self.actividad_preferida = Some(value.into());
        self
    }

    pub fn with_budget(mut self, value: impl Into<String>) -> Self {
        self.presupuesto = Some(value.into());
        self
    }

    pub fn with_climate(mut self, value: impl Into<String>) -> Self {
        self.clima_preferido = Some(value.into());
        self
    }

    pub fn with_duration(mut self, value: impl Into<String>) -> Self {
        self.duracion = Some(value.into());
        self
    }

    pub fn with_group(mut self, value: impl Into<String>) -> Self {
        self.tipo_grupo = Some(value.into());
        self
    }

    /// One asserted fact `<field>_<value>` per non-blank field.
    pub fn to_facts(&self) -> Vec<Fact> {
        [
            ("actividad_preferida", &self.actividad_preferida),
            ("presupuesto", &self.presupuesto),
            ("duracion", &self.duracion),
            ("tipo_grupo", &self.tipo_grupo),
            ("clima_preferido", &self.clima_preferido),
        ]
        .into_iter()
        .filter_map(|(field, value)| {
            let value = value.as_deref()?.trim();
            (!value.is_empty()).then(|| Fact::asserted(format!("{field}_{value}")))
        })
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.to_facts().is_empty()
    }
}
