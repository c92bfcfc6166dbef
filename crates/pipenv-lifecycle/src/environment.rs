//! Layer environment contributions
//!
//! The lifecycle reads one file per variable and operation from a layer's
//! `env/` directories (`PATH.prepend`, `PATH.delim`, `PYTHONUSERBASE.default`,
//! ...). [`Environment`] keeps exactly that key/value shape in memory.

use std::collections::BTreeMap;
use std::fmt::Write as _;

/// A single change to one environment variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvDelta {
    /// `value<delim>$NAME`
    Prepend { value: String, delim: String },
    /// Only applies when the variable is unset
    Default(String),
}

/// Map of `"<NAME>.<operation>"` to value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment(BTreeMap<String, String>);

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, name: &str, delta: EnvDelta) {
        match delta {
            EnvDelta::Prepend { value, delim } => {
                self.0.insert(format!("{}.prepend", name), value);
                self.0.insert(format!("{}.delim", name), delim);
            }
            EnvDelta::Default(value) => {
                self.0.insert(format!("{}.default", name), value);
            }
        }
    }

    pub fn prepend(&mut self, name: &str, value: impl Into<String>, delim: impl Into<String>) {
        self.apply(
            name,
            EnvDelta::Prepend {
                value: value.into(),
                delim: delim.into(),
            },
        );
    }

    pub fn set_default(&mut self, name: &str, value: impl Into<String>) {
        self.apply(name, EnvDelta::Default(value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Human-readable rendering for the build log, one variable per line:
    ///
    /// ```text
    /// PATH       -> "/layers/packages/app-Xy12/bin:$PATH"
    /// PYTHONPATH -> "/layers/packages/lib/python3.8/site-packages:$PYTHONPATH"
    /// ```
    pub fn formatted(&self) -> String {
        let mut lines: Vec<(String, String)> = Vec::new();
        for (key, value) in &self.0 {
            let Some((name, op)) = key.rsplit_once('.') else {
                continue;
            };
            let delim = self.get(&format!("{}.delim", name)).unwrap_or("");
            let rendered = match op {
                "prepend" => format!("{}{}${}", value, delim, name),
                "default" => value.clone(),
                _ => continue,
            };
            lines.push((name.to_string(), rendered));
        }

        let width = lines.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
        let mut out = String::new();
        for (name, rendered) in lines {
            let _ = writeln!(out, "{:<width$} -> {:?}", name, rendered, width = width);
        }
        out.trim_end().to_string()
    }
}
