//! Compartments of the epidemic models.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A disjoint population state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compartment {
    Susceptible,
    Exposed,
    Infectious,
    Recovered,
    Asymptomatic,
    Hospitalized,
    Deceased,
}

impl Compartment {
    pub const ALL: [Compartment; 7] = [
        Compartment::Susceptible,
        Compartment::Exposed,
        Compartment::Infectious,
        Compartment::Recovered,
        Compartment::Asymptomatic,
        Compartment::Hospitalized,
        Compartment::Deceased,
    ];

    /// State ordering of the four-compartment model.
    pub const BASIC: [Compartment; 4] = [
        Compartment::Susceptible,
        Compartment::Exposed,
        Compartment::Infectious,
        Compartment::Recovered,
    ];

    /// State ordering of the seven-compartment models.
    pub const EXTENDED: [Compartment; 7] = Self::ALL;

    pub fn label(self) -> &'static str {
        match self {
            Compartment::Susceptible => "Susceptible",
            Compartment::Exposed => "Exposed",
            Compartment::Infectious => "Infectious",
            Compartment::Recovered => "Recovered",
            Compartment::Asymptomatic => "Asymptomatic",
            Compartment::Hospitalized => "Hospitalized",
            Compartment::Deceased => "Deceased",
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Compartment::Susceptible => 'S',
            Compartment::Exposed => 'E',
            Compartment::Infectious => 'I',
            Compartment::Recovered => 'R',
            Compartment::Asymptomatic => 'A',
            Compartment::Hospitalized => 'H',
            Compartment::Deceased => 'D',
        }
    }
}

impl fmt::Display for Compartment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn symbols_are_unique() {
        let symbols: HashSet<char> = Compartment::ALL.iter().map(|c| c.symbol()).collect();
        assert_eq!(symbols.len(), Compartment::ALL.len());
    }

    #[test]
    fn basic_ordering_is_prefix_of_extended() {
        assert_eq!(&Compartment::EXTENDED[..4], &Compartment::BASIC[..]);
    }

    #[test]
    fn display_uses_label() {
        assert_eq!(Compartment::Deceased.to_string(), "Deceased");
        assert_eq!(Compartment::Deceased.symbol(), 'D');
    }
}
