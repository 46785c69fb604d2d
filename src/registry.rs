//! Indicator registry.
//!
//! The fixed list of economic indicators the dashboard tracks, with the
//! display metadata each one needs: name, unit and polarity. Registry
//! order is fetch order.

use serde::Deserialize;
use std::collections::HashMap;

use crate::types::{PulseError, Unit};

/// Display metadata for one indicator code.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IndicatorDef {
    pub code: String,
    pub name: String,
    pub unit: Unit,
    /// Whether an increase is economically favorable.
    #[serde(default = "default_higher_is_better")]
    pub higher_is_better: bool,
}

fn default_higher_is_better() -> bool {
    true
}

struct BuiltIn {
    code: &'static str,
    name: &'static str,
    unit: Unit,
    higher_is_better: bool,
}

const BUILT_IN: &[BuiltIn] = &[
    BuiltIn { code: "NY.GDP.MKTP.CD", name: "GDP", unit: Unit::CurrencyBillions, higher_is_better: true },
    BuiltIn { code: "FP.CPI.TOTL.ZG", name: "Inflation Rate", unit: Unit::Percent, higher_is_better: false },
    BuiltIn { code: "SL.UEM.TOTL.ZS", name: "Unemployment", unit: Unit::Percent, higher_is_better: false },
    BuiltIn { code: "NY.GDP.PCAP.CD", name: "GDP per Capita", unit: Unit::CurrencyRaw, higher_is_better: true },
    BuiltIn { code: "NE.EXP.GNFS.ZS", name: "Exports (% GDP)", unit: Unit::Percent, higher_is_better: true },
    BuiltIn { code: "NE.IMP.GNFS.ZS", name: "Imports (% GDP)", unit: Unit::Percent, higher_is_better: true },
];

/// Code of the headline GDP series, used by the comparison chart.
pub const GDP_CODE: &str = "NY.GDP.MKTP.CD";

/// Ordered set of tracked indicators.
#[derive(Debug, Clone)]
pub struct IndicatorRegistry {
    defs: Vec<IndicatorDef>,
}

impl IndicatorRegistry {
    /// Build a registry from explicit definitions. Codes must be unique.
    pub fn new(defs: Vec<IndicatorDef>) -> Result<Self, PulseError> {
        if defs.is_empty() {
            return Err(PulseError::Config("indicator registry is empty".into()));
        }
        let mut seen = std::collections::HashSet::new();
        for def in &defs {
            if def.code.trim().is_empty() {
                return Err(PulseError::Config("indicator code must not be empty".into()));
            }
            if !seen.insert(def.code.as_str()) {
                return Err(PulseError::Config(format!("duplicate indicator code: {}", def.code)));
            }
        }
        Ok(Self { defs })
    }

    /// The six headline indicators tracked by default.
    pub fn built_in() -> Self {
        Self {
            defs: BUILT_IN
                .iter()
                .map(|b| IndicatorDef {
                    code: b.code.to_string(),
                    name: b.name.to_string(),
                    unit: b.unit,
                    higher_is_better: b.higher_is_better,
                })
                .collect(),
        }
    }

    pub fn get(&self, code: &str) -> Option<&IndicatorDef> {
        self.defs.iter().find(|d| d.code == code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndicatorDef> {
        self.defs.iter()
    }

    pub fn codes(&self) -> Vec<String> {
        self.defs.iter().map(|d| d.code.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Snapshot of each indicator's polarity flag.
    pub fn polarity_table(&self) -> PolarityTable {
        PolarityTable(
            self.defs
                .iter()
                .map(|d| (d.code.clone(), d.higher_is_better))
                .collect(),
        )
    }
}

impl Default for IndicatorRegistry {
    fn default() -> Self {
        Self::built_in()
    }
}

/// Maps indicator code → `higher_is_better`. Unknown codes default to `true`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolarityTable(HashMap<String, bool>);

impl PolarityTable {
    pub fn higher_is_better(&self, code: &str) -> bool {
        self.0.get(code).copied().unwrap_or(true)
    }

    pub fn with(mut self, code: &str, higher_is_better: bool) -> Self {
        self.0.insert(code.to_string(), higher_is_better);
        self
    }
}
