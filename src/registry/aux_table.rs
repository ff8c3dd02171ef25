use serde::{Deserialize, Serialize};

/// Auxiliary-storage kinds and the irtypes that map onto them.
///
/// Fixed configuration, not loaded from a declaration; the aux enum
/// emitter derives its ordinals from the declaration order here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuxTable {
    kinds: Vec<String>,
    by_irtype: Vec<(String, String)>,
}

impl AuxTable {
    /// Builds a table from explicit kinds and irtype mappings
    pub fn new(kinds: Vec<String>, by_irtype: Vec<(String, String)>) -> Self {
        AuxTable { kinds, by_irtype }
    }

    /// The builtin auxiliary-storage kinds
    pub fn builtin() -> Self {
        let kinds = [
            "IRAuxBool", "IRAuxI8", "IRAuxI16", "IRAuxI32", "IRAuxI64", "IRAuxF32", "IRAuxF64",
            "IRAuxMem", "IRAuxSym",
        ];
        let by_irtype = [
            ("bool", "IRAuxBool"),
            ("i8", "IRAuxI8"),
            ("i16", "IRAuxI16"),
            ("i32", "IRAuxI32"),
            ("i64", "IRAuxI64"),
            ("f32", "IRAuxF32"),
            ("f64", "IRAuxF64"),
            ("mem", "IRAuxMem"),
            ("sym", "IRAuxSym"),
        ];
        Self::new(
            kinds.iter().map(|s| s.to_string()).collect(),
            by_irtype
                .iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect(),
        )
    }

    /// Kinds in ordinal order
    pub fn kinds(&self) -> &[String] {
        &self.kinds
    }

    /// Aux kind for an irtype, if one exists
    pub fn kind_for_irtype(&self, irtype: &str) -> Option<&str> {
        self.by_irtype
            .iter()
            .find(|(t, _)| t == irtype)
            .map(|(_, k)| k.as_str())
    }

    /// Comma-joined accepted irtypes for error messages
    pub fn expected_irtypes(&self) -> String {
        self.by_irtype
            .iter()
            .map(|(t, _)| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let aux = AuxTable::builtin();
        assert_eq!(aux.kind_for_irtype("i32"), Some("IRAuxI32"));
        assert_eq!(aux.kind_for_irtype("sym"), Some("IRAuxSym"));
        assert_eq!(aux.kind_for_irtype("s32"), None);
        assert_eq!(aux.kinds().len(), 9);
    }
}
