use anyhow::{bail, Result};

use crate::store::{speed_multiplier, standard_average, ParameterStore};

/// Changes requested on the command line, applied in order: set, adjust, remove
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamsCommand {
    pub set: Vec<(String, f64)>,
    pub adjust: Vec<(String, f64)>,
    pub remove: Vec<String>,
}

/// Parse `NAME=VALUE` as used by `--set` and `--adjust`
pub fn parse_assignment(arg: &str) -> Result<(String, f64), String> {
    let (name, value) = arg
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", arg))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing parameter name in '{}'", arg));
    }
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid number in '{}'", arg))?;
    if !value.is_finite() {
        return Err(format!("value must be finite in '{}'", arg));
    }
    Ok((name.to_string(), value))
}

/// Apply the requested changes, then print the store and its average
pub fn run_params(store: &mut dyn ParameterStore, command: &ParamsCommand) -> Result<()> {
    apply(store, command)?;
    for line in format_parameters(store) {
        println!("{}", line);
    }
    Ok(())
}

fn apply(store: &mut dyn ParameterStore, command: &ParamsCommand) -> Result<()> {
    for (name, value) in &command.set {
        store.set_or_create(name, *value)?;
    }

    for (name, percent) in &command.adjust {
        if store.adjust(name, *percent)?.is_none() {
            bail!("'{}' has no standard value to adjust", name);
        }
    }

    for name in &command.remove {
        if !store.remove(name)? {
            bail!("Unknown parameter '{}'", name);
        }
    }

    Ok(())
}

pub fn format_parameters(store: &dyn ParameterStore) -> Vec<String> {
    let mut lines: Vec<String> = store
        .list()
        .iter()
        .map(|p| format!("{:<45} {:>10.3}  {}", p.name, p.value, p.description))
        .collect();

    let average = store
        .average()
        .map(|avg| format!("{:.3}", avg))
        .unwrap_or_else(|| "--".to_string());
    lines.push(String::new());
    lines.push(format!(
        "Average: {} (standard {:.3}), speed multiplier {:.3}",
        average,
        standard_average(),
        speed_multiplier(store)
    ));
    lines
}
