//! Universe: the ordered list of tracked instruments.
//!
//! Order matters. Instruments are resolved one at a time in list order and
//! each one's chart color is picked by its position in the list.

use crate::domain::Instrument;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("universe has no instruments")]
    Empty,

    #[error("ticker '{0}' appears more than once")]
    DuplicateTicker(String),

    #[error("instrument '{0}' has an empty ticker")]
    EmptyTicker(String),
}

/// The tracked instruments, in display and resolution order.
#[derive(Debug, Clone, PartialEq)]
pub struct Universe {
    pub instruments: Vec<Instrument>,
}

impl Universe {
    /// Build a universe, rejecting empty lists and duplicate tickers.
    pub fn new(instruments: Vec<Instrument>) -> Result<Self, UniverseError> {
        let universe = Self { instruments };
        universe.validate()?;
        Ok(universe)
    }

    pub fn validate(&self) -> Result<(), UniverseError> {
        if self.instruments.is_empty() {
            return Err(UniverseError::Empty);
        }
        let mut seen = HashSet::new();
        for inst in &self.instruments {
            if inst.ticker.trim().is_empty() {
                return Err(UniverseError::EmptyTicker(inst.name.clone()));
            }
            if !seen.insert(inst.ticker.as_str()) {
                return Err(UniverseError::DuplicateTicker(inst.ticker.clone()));
            }
        }
        Ok(())
    }

    /// Position of a ticker in the list.
    pub fn position(&self, ticker: &str) -> Option<usize> {
        self.instruments.iter().position(|i| i.ticker == ticker)
    }

    /// The ten largest Malaysian banks listed on Bursa Malaysia.
    pub fn malaysian_banks() -> Self {
        let instruments = [
            ("Malayan Banking Berhad (Maybank)", "1155.KL"),
            ("Public Bank Berhad", "1295.KL"),
            ("CIMB Group Holdings Berhad", "1023.KL"),
            ("Hong Leong Bank Berhad", "5819.KL"),
            ("RHB Bank Berhad", "1066.KL"),
            ("AMMB Holdings Berhad (AmBank)", "1015.KL"),
            ("Hong Leong Financial Group Berhad", "1082.KL"),
            ("Alliance Bank Malaysia Berhad", "2488.KL"),
            ("Malaysia Building Society Berhad (MBSB)", "1171.KL"),
            ("Affin Bank Berhad", "5185.KL"),
        ]
        .into_iter()
        .map(|(name, ticker)| Instrument::new(name, ticker))
        .collect();

        Self { instruments }
    }
}

impl Default for Universe {
    fn default() -> Self {
        Self::malaysian_banks()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_universe_has_ten_banks() {
        let u = Universe::default();
        assert_eq!(u.instruments.len(), 10);
        assert_eq!(u.instruments[0].ticker, "1155.KL");
        assert_eq!(u.instruments[9].ticker, "5185.KL");
        assert!(u.validate().is_ok());
    }

    #[test]
    fn rejects_duplicate_tickers() {
        let result = Universe::new(vec![
            Instrument::new("A", "AAA"),
            Instrument::new("A again", "AAA"),
        ]);
        assert!(matches!(result, Err(UniverseError::DuplicateTicker(t)) if t == "AAA"));
    }

    #[test]
    fn rejects_empty_list() {
        assert!(matches!(Universe::new(vec![]), Err(UniverseError::Empty)));
    }

    #[test]
    fn position_lookup() {
        let u = Universe::default();
        assert_eq!(u.position("1023.KL"), Some(2));
        assert_eq!(u.position("SPY"), None);
    }
}
