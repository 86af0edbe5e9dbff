/// Tuning knobs for [`Pathfinder`](crate::Pathfinder).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchConfig {
    /// Stop after expanding this many nodes. `None` searches until the
    /// frontier is exhausted.
    pub max_expansions: Option<usize>,
    /// Step diagonally as well as orthogonally. When `false` the search is
    /// 4-way and uses the Manhattan heuristic.
    pub diagonals: bool,
    /// Allow diagonal steps between two cells whose shared orthogonal
    /// neighbours are impassable.
    pub corner_cutting: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_expansions: None,
            diagonals: true,
            corner_cutting: true,
        }
    }
}

impl SearchConfig {
    /// Cap the number of expanded nodes.
    pub fn with_max_expansions(mut self, limit: usize) -> Self {
        self.max_expansions = Some(limit);
        self
    }

    /// Restrict the search to orthogonal steps, or allow diagonals again.
    pub fn with_diagonals(mut self, allow: bool) -> Self {
        self.diagonals = allow;
        self
    }

    /// Permit or forbid squeezing diagonally past blocked corners.
    pub fn with_corner_cutting(mut self, allow: bool) -> Self {
        self.corner_cutting = allow;
        self
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: SearchConfig = serde_json::from_str(r#"{"max_expansions": 500}"#).unwrap();
        assert_eq!(cfg.max_expansions, Some(500));
        assert!(cfg.diagonals);
        assert!(cfg.corner_cutting);
    }
}
