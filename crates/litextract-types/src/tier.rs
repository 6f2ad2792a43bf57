//! Extraction tiers, cheapest to most expensive.

use serde::{Deserialize, Serialize};

/// One level of the extraction cascade. Ordered `local < cheap < regex <
/// premium` so `merge_by_precedence`'s `Ord` comparison alone gives regex
/// priority over the LLM tiers it locks against, while still leaving room
/// for a strictly-higher-confidence premium result to override a locked
/// field (see `merge_by_precedence`'s regex special case).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Tier {
    Local = 1,
    Cheap = 2,
    /// Deterministic regex/heuristic tier. Outranks `Local`/`Cheap` so a
    /// locked field survives those passes unconditionally; `Premium` still
    /// outranks it, but `merge_by_precedence` additionally requires a
    /// strictly higher confidence before it overrides a locked value.
    Regex = 3,
    Premium = 4,
}

impl Tier {
    #[must_use]
    pub fn accept_threshold_default(self) -> f64 {
        match self {
            Tier::Regex => 0.90,
            Tier::Local => 0.85,
            Tier::Cheap => 0.80,
            Tier::Premium => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regex_outranks_local_and_cheap_but_not_premium() {
        assert!(Tier::Regex > Tier::Local);
        assert!(Tier::Regex > Tier::Cheap);
        assert!(Tier::Premium > Tier::Regex);
        assert!(Tier::Cheap > Tier::Local);
    }
}
