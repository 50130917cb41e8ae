use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::write_json;
use crate::game::physics::{PARAM_DRAG, PARAM_ENGINE_FORCE, PARAM_MASS};

/// Allowed customisation percentage, applied to the standard value
pub const ADJUST_RANGE: std::ops::RangeInclusive<f64> = -50.0..=50.0;

/// Factory tuning values: name, value, description
const STANDARD: [(&str, f64, &str); 12] = [
    ("Adjust Torque Levels", 500.0, "Engine torque in Nm"),
    ("Change Tire Width", 1.0, "Multiplier for tire width"),
    (
        "Modify Drag Coefficient",
        0.3,
        "Drag coefficient for aerodynamic resistance",
    ),
    ("Adjust Gear Ratio", 3.5, "Gear ratio for power transmission"),
    (
        "Adjust Damping and Rebound Settings",
        1.0,
        "Multiplier for suspension damping performance",
    ),
    (
        "Adjust Brake Caliper Settings",
        1.0,
        "Multiplier for brake caliper performance",
    ),
    (
        "Alter Weight Distribution",
        50.0,
        "Percentage of weight distribution at the front",
    ),
    (
        "Modify Differential Limited-Slip Settings",
        1.0,
        "Multiplier for differential slip performance",
    ),
    (
        "Adjust Fuel-Air Mixture and Injection Timing",
        14.7,
        "Standard stoichiometric fuel-air mixture",
    ),
    (
        "Modify Exhaust Diameter and Configuration",
        2.5,
        "Exhaust diameter in inches",
    ),
    (
        "Adjust ECU Parameters",
        1.0,
        "Multiplier for Engine Control Unit performance",
    ),
    (
        "Adjust Vehicle Cold Air Intake (CAI)",
        1.0,
        "Multiplier for cold air intake flow",
    ),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: f64,
    pub description: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: f64, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            description: description.into(),
        }
    }
}

pub fn standard_parameters() -> Vec<Parameter> {
    STANDARD
        .iter()
        .map(|&(name, value, description)| Parameter::new(name, value, description))
        .collect()
}

/// Mean of the factory values
pub fn standard_average() -> f64 {
    STANDARD.iter().map(|p| p.1).sum::<f64>() / STANDARD.len() as f64
}

fn standard_entry(name: &str) -> Option<(f64, &'static str)> {
    STANDARD.iter().find(|p| p.0 == name).map(|p| (p.1, p.2))
}

/// Description for a parameter created by name alone
pub fn parameter_description(name: &str) -> &'static str {
    if let Some((_, description)) = standard_entry(name) {
        return description;
    }
    match name {
        PARAM_MASS => "Vehicle mass in kg",
        PARAM_ENGINE_FORCE => "Engine force in N",
        PARAM_DRAG => "Aerodynamic drag coefficient",
        _ => "Custom parameter",
    }
}

/// `base` moved by `percent`, clamped to [`ADJUST_RANGE`]
pub fn adjusted_value(base: f64, percent: f64) -> f64 {
    let percent = percent.clamp(*ADJUST_RANGE.start(), *ADJUST_RANGE.end());
    base * (1.0 + percent / 100.0)
}

/// Named tuning values with create, read, update, delete and an average
pub trait ParameterStore {
    fn list(&self) -> &[Parameter];

    /// Insert or replace by name
    fn upsert(&mut self, parameter: Parameter) -> Result<()>;

    /// Change the value of an existing parameter; `false` if unknown
    fn set_value(&mut self, name: &str, value: f64) -> Result<bool>;

    /// Update `name`, creating it with a default description if missing
    fn set_or_create(&mut self, name: &str, value: f64) -> Result<()> {
        if !self.set_value(name, value)? {
            self.upsert(Parameter::new(name, value, parameter_description(name)))?;
        }
        Ok(())
    }

    /// `false` if there was nothing to remove
    fn remove(&mut self, name: &str) -> Result<bool>;

    fn get(&self, name: &str) -> Option<&Parameter> {
        self.list().iter().find(|p| p.name == name)
    }

    /// Mean of every stored value, `None` when empty
    fn average(&self) -> Option<f64> {
        let parameters = self.list();
        if parameters.is_empty() {
            return None;
        }
        Some(parameters.iter().map(|p| p.value).sum::<f64>() / parameters.len() as f64)
    }

    /// Set a standard parameter to its factory value moved by `percent`.
    ///
    /// Returns the new value, or `None` for a name with no factory value.
    fn adjust(&mut self, name: &str, percent: f64) -> Result<Option<f64>> {
        let Some((base, description)) = standard_entry(name) else {
            return Ok(None);
        };
        let value = adjusted_value(base, percent);
        self.upsert(Parameter::new(name, value, description))?;
        Ok(Some(value))
    }

    /// Flat name to value map, as consumed by the vehicle physics
    fn values(&self) -> HashMap<String, f64> {
        self.list()
            .iter()
            .map(|p| (p.name.clone(), p.value))
            .collect()
    }
}

/// Ratio of the current parameter average to the factory average.
///
/// 1.0 for an untouched store, an empty store or a degenerate average.
pub fn speed_multiplier(store: &dyn ParameterStore) -> f64 {
    match store.average() {
        Some(average) if average.is_finite() && average > 0.0 => average / standard_average(),
        _ => 1.0,
    }
}

/// Parameters kept in a JSON file and written on every change
#[derive(Debug, Clone)]
pub struct JsonParameterStore {
    path: PathBuf,
    parameters: Vec<Parameter>,
}

impl JsonParameterStore {
    /// Read `path`, seeding the standard parameters when it does not exist
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let parameters = if path.exists() {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read parameters from {:?}", path))?;
            serde_json::from_str(&json)
                .with_context(|| format!("Failed to deserialize parameters from {:?}", path))?
        } else {
            info!(path = ?path, "Seeding standard parameters");
            standard_parameters()
        };

        Ok(Self { path, parameters })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        write_json(&self.path, &self.parameters)
    }
}

impl ParameterStore for JsonParameterStore {
    fn list(&self) -> &[Parameter] {
        &self.parameters
    }

    fn upsert(&mut self, parameter: Parameter) -> Result<()> {
        match self.parameters.iter_mut().find(|p| p.name == parameter.name) {
            Some(existing) => *existing = parameter,
            None => self.parameters.push(parameter),
        }
        self.persist()
    }

    fn set_value(&mut self, name: &str, value: f64) -> Result<bool> {
        let Some(existing) = self.parameters.iter_mut().find(|p| p.name == name) else {
            return Ok(false);
        };
        existing.value = value;
        self.persist()?;
        Ok(true)
    }

    fn remove(&mut self, name: &str) -> Result<bool> {
        let before = self.parameters.len();
        self.parameters.retain(|p| p.name != name);
        if self.parameters.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::physics::{PARAM_DRAG_LABEL, PARAM_MASS};
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> JsonParameterStore {
        JsonParameterStore::open(dir.path().join("params.json")).unwrap()
    }

    #[test]
    fn test_seeds_standard_parameters() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        assert_eq!(store.list().len(), 12);
        assert_eq!(store.get("Modify Drag Coefficient").unwrap().value, 0.3);
        assert!((store.average().unwrap() - 577.0 / 12.0).abs() < 1e-9);
        assert!((speed_multiplier(&store) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_drag_label_matches_physics_key() {
        assert_eq!(standard_entry(PARAM_DRAG_LABEL).map(|e| e.0), Some(0.3));
    }

    #[test]
    fn test_adjusted_value() {
        assert_eq!(adjusted_value(500.0, 10.0), 550.0);
        assert_eq!(adjusted_value(500.0, -50.0), 250.0);
        // Out of range percentages are clamped
        assert_eq!(adjusted_value(500.0, 80.0), 750.0);
    }

    #[test]
    fn test_adjust_uses_factory_base() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);

        assert_eq!(store.adjust("Adjust Torque Levels", 20.0).unwrap(), Some(600.0));
        // Adjusting again starts from the factory value, not the current one
        assert_eq!(store.adjust("Adjust Torque Levels", 20.0).unwrap(), Some(600.0));
        assert_eq!(store.adjust("Unknown", 20.0).unwrap(), None);
        assert_eq!(
            store.get("Adjust Torque Levels").unwrap().description,
            "Engine torque in Nm"
        );
    }

    #[test]
    fn test_speed_multiplier_follows_average() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        store.adjust("Adjust Torque Levels", 50.0).unwrap();

        let expected = (577.0 + 250.0) / 577.0;
        assert!((speed_multiplier(&store) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_crud_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("params.json");
        {
            let mut store = JsonParameterStore::open(&path).unwrap();
            store
                .upsert(Parameter::new("engine_force", 6000.0, "Engine force in N"))
                .unwrap();
            assert!(store.set_value("Change Tire Width", 1.2).unwrap());
            assert!(!store.set_value("Missing", 1.0).unwrap());
            assert!(store.remove("Adjust ECU Parameters").unwrap());
            assert!(!store.remove("Adjust ECU Parameters").unwrap());
        }

        let store = JsonParameterStore::open(&path).unwrap();
        assert_eq!(store.list().len(), 12);
        assert_eq!(store.get("Change Tire Width").unwrap().value, 1.2);
        assert!(store.get("Adjust ECU Parameters").is_none());
        assert_eq!(store.values().get("engine_force"), Some(&6000.0));
    }

    #[test]
    fn test_set_or_create() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);

        store.set_or_create("Change Tire Width", 1.3).unwrap();
        store.set_or_create(PARAM_MASS, 900.0).unwrap();
        store.set_or_create("Spoiler Angle", 12.0).unwrap();

        assert_eq!(store.list().len(), 14);
        assert_eq!(store.get("Change Tire Width").unwrap().value, 1.3);
        let mass = store.get(PARAM_MASS).unwrap();
        assert_eq!(mass.value, 900.0);
        assert_eq!(mass.description, "Vehicle mass in kg");
        assert_eq!(
            store.get("Spoiler Angle").unwrap().description,
            "Custom parameter"
        );
    }

    #[test]
    fn test_parameter_description_prefers_factory_text() {
        assert_eq!(parameter_description("Adjust Torque Levels"), "Engine torque in Nm");
        assert_eq!(parameter_description("engine_force"), "Engine force in N");
    }

    #[test]
    fn test_empty_store_has_neutral_multiplier() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        for parameter in standard_parameters() {
            store.remove(&parameter.name).unwrap();
        }
        assert_eq!(store.average(), None);
        assert_eq!(speed_multiplier(&store), 1.0);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("params.json");
        std::fs::write(&path, "nope").unwrap();
        assert!(JsonParameterStore::open(&path).is_err());
    }
}
