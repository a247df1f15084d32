//! Symbol to lane resolution.

use crate::error::{EngineError, Result};
use crate::models::engine::constants::{DEFAULT_LANE_SYMBOLS, NUM_LANES};
use std::collections::HashMap;

/// Immutable lookup from key symbols to lane indices.
///
/// Each lane has a primary symbol (used for labels and beat-map records) and
/// may accept extra aliases. Lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyMap {
    lookup: HashMap<String, usize>,
    primary: Vec<String>,
}

impl KeyMap {
    /// Builds a map from one primary symbol per lane.
    pub fn new<S: AsRef<str>>(symbols: &[S]) -> Result<Self> {
        let lanes: Vec<Vec<String>> = symbols
            .iter()
            .map(|s| vec![s.as_ref().to_string()])
            .collect();
        Self::with_aliases(&lanes)
    }

    /// Builds a map where every lane lists its accepted symbols, primary first.
    pub fn with_aliases(lanes: &[Vec<String>]) -> Result<Self> {
        if lanes.len() != NUM_LANES {
            return Err(EngineError::InvalidKeyMap(format!(
                "expected {} lanes, got {}",
                NUM_LANES,
                lanes.len()
            )));
        }

        let mut lookup = HashMap::new();
        let mut primary = Vec::with_capacity(NUM_LANES);

        for (lane, symbols) in lanes.iter().enumerate() {
            let Some(first) = symbols.first() else {
                return Err(EngineError::InvalidKeyMap(format!(
                    "lane {} has no symbol",
                    lane
                )));
            };
            primary.push(normalize(first));

            for symbol in symbols {
                let key = normalize(symbol);
                if key.is_empty() {
                    return Err(EngineError::InvalidKeyMap(format!(
                        "lane {} has an empty symbol",
                        lane
                    )));
                }
                if let Some(previous) = lookup.insert(key.clone(), lane) {
                    if previous != lane {
                        return Err(EngineError::InvalidKeyMap(format!(
                            "symbol {:?} bound to lanes {} and {}",
                            key, previous, lane
                        )));
                    }
                }
            }
        }

        Ok(Self { lookup, primary })
    }

    /// Resolves a symbol to its lane, ignoring case.
    pub fn lane_of(&self, symbol: &str) -> Option<usize> {
        self.lookup.get(&normalize(symbol)).copied()
    }

    /// Primary symbol for a lane.
    pub fn symbol(&self, lane: usize) -> Option<&str> {
        self.primary.get(lane).map(String::as_str)
    }

    pub fn symbols(&self) -> &[String] {
        &self.primary
    }

    pub fn lane_count(&self) -> usize {
        self.primary.len()
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        let primary: Vec<String> = DEFAULT_LANE_SYMBOLS.iter().map(|s| s.to_string()).collect();
        let lookup = primary
            .iter()
            .cloned()
            .enumerate()
            .map(|(lane, symbol)| (symbol, lane))
            .collect();
        Self { lookup, primary }
    }
}

fn normalize(symbol: &str) -> String {
    symbol.to_lowercase()
}
