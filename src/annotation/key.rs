use std::fmt;

use serde::{Deserialize, Serialize};

use super::AnnotationError;

/// Structured identity of an annotated ion: a molecular formula plus the
/// adduct it was detected with.
///
/// Ordering is lexicographic on `(formula, adduct)`. Every table in the crate
/// iterates ions in this order, which makes target tie-breaks reproducible.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IonKey {
    /// Molecular formula, e.g. `C6H12O6`
    pub formula: String,

    /// Adduct including its sign, e.g. `+H`, `-H2O`, or empty when adducts
    /// have been merged
    pub adduct: String,
}

impl IonKey {
    /// Create a key from its two parts
    pub fn new(formula: impl Into<String>, adduct: impl Into<String>) -> Self {
        Self {
            formula: formula.into(),
            adduct: adduct.into(),
        }
    }

    /// Parse a concatenated ion string (`C6H12O6+H`) by splitting at the
    /// first adduct sign.
    ///
    /// Only meant for inputs that carry nothing but the composite string. The
    /// split is ambiguous for formulas with an internal charge sign.
    pub fn parse_ion(ion: &str) -> Result<Self, AnnotationError> {
        let ion = ion.trim();
        let split = ion.find(['+', '-']).unwrap_or(ion.len());
        if split == 0 {
            return Err(AnnotationError::InvalidIon(ion.to_string()));
        }
        Ok(Self::new(&ion[..split], &ion[split..]))
    }

    /// Base formula used for target matching
    pub fn base_formula(&self) -> &str {
        base_formula(&self.formula)
    }

    /// Display form `formula+adduct`, used for output columns only
    pub fn ion(&self) -> String {
        format!("{}{}", self.formula, self.adduct)
    }
}

impl fmt::Display for IonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.formula, self.adduct)
    }
}

/// Leading formula substring before the first `+` or `-`.
///
/// A string without any sign is its own base formula.
pub fn base_formula(ion: &str) -> &str {
    match ion.find(['+', '-']) {
        Some(idx) => &ion[..idx],
        None => ion,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_formula() {
        assert_eq!(base_formula("C6H12O6+H"), "C6H12O6");
        assert_eq!(base_formula("C6H12O6-H2O"), "C6H12O6");
        assert_eq!(base_formula("C6H12O6+"), "C6H12O6");
        assert_eq!(base_formula("C6H12O6"), "C6H12O6");
        assert_eq!(base_formula("C3H7NO2+Na-H"), "C3H7NO2");
    }

    #[test]
    fn test_parse_ion() {
        let key = IonKey::parse_ion("C6H12O6+Na").unwrap();
        assert_eq!(key.formula, "C6H12O6");
        assert_eq!(key.adduct, "+Na");
        assert_eq!(key.ion(), "C6H12O6+Na");

        let bare = IonKey::parse_ion(" C5H5N5 ").unwrap();
        assert_eq!(bare.formula, "C5H5N5");
        assert_eq!(bare.adduct, "");

        assert!(matches!(
            IonKey::parse_ion("+H"),
            Err(AnnotationError::InvalidIon(_))
        ));
    }

    #[test]
    fn test_key_ordering() {
        let mut keys = vec![
            IonKey::new("C6H12O6", "+Na"),
            IonKey::new("C16H32O2", "+H"),
            IonKey::new("C6H12O6", "+H"),
        ];
        keys.sort();
        assert_eq!(keys[0].ion(), "C16H32O2+H");
        assert_eq!(keys[1].ion(), "C6H12O6+H");
        assert_eq!(keys[2].ion(), "C6H12O6+Na");
    }

    #[test]
    fn test_structured_base_formula_ignores_unsigned_adduct() {
        // A composite split would yield "C6H12O6[M]" here
        let key = IonKey::new("C6H12O6", "[M]+");
        assert_eq!(key.base_formula(), "C6H12O6");
    }
}
