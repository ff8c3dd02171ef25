//! Static declaration emitters
//!
//! Three small bodies whose content depends only on builtin configuration,
//! not on the schema: the flag bitmask enum, the auxiliary-storage kind
//! enum, and the per-operator descriptor struct.

use crate::gen::do_not_edit;
use crate::registry::AuxTable;
use crate::schema::OpFlag;

/// Start marker of the flag enum
pub const FLAG_START: &str = "typedef enum IROpFlag {";
/// End marker of the flag enum
pub const FLAG_END: &str = "} IROpFlag;";

/// Start marker of the aux kind enum
pub const AUX_START: &str = "typedef enum IRAux {";
/// End marker of the aux kind enum
pub const AUX_END: &str = "} IRAux;";

/// Start marker of the descriptor struct
pub const DESCR_START: &str = "typedef struct IROpDescr {";
/// End marker of the descriptor struct
pub const DESCR_END: &str = "} IROpDescr;";

/// Descriptor fields: (C type, field name, trailing comment). The info-map
/// emitter fills values for these fields in this order.
pub const DESCR_FIELDS: [(&str, &str, &str); 3] = [
    ("IROpFlag", "flags", ""),
    ("TypeCode", "outputType", "invariant: < TypeCode_NUM_END"),
    ("IRAux", "aux", "type of data in IRValue.aux"),
];

/// Generates the `IROpFlag` bitmask enum body
pub fn generate_flag_enum() -> String {
    let mut lines = vec![
        FLAG_START.to_string(),
        do_not_edit(),
        "  IROpFlagNone = 0,".to_string(),
    ];
    let width = OpFlag::ALL
        .iter()
        .map(|(f, _)| f.name().len())
        .max()
        .unwrap_or(0);
    for (flag, comment) in OpFlag::ALL {
        lines.push(format!(
            "  IROpFlag{:<width$} = 1 << {:<2},// {}",
            flag.name(),
            flag.bit(),
            comment
        ));
    }
    lines.push(FLAG_END.to_string());
    lines.join("\n")
}

/// Generates the `IRAux` kind enum body
pub fn generate_aux_enum(aux: &AuxTable) -> String {
    let mut lines = vec![
        AUX_START.to_string(),
        do_not_edit(),
        "  IRAuxNone = 0,".to_string(),
    ];
    for kind in aux.kinds() {
        lines.push(format!("  {},", kind));
    }
    lines.push(AUX_END.to_string());
    lines.join("\n")
}

/// Generates the `IROpDescr` struct body
pub fn generate_descr_struct() -> String {
    let mut lines = vec![DESCR_START.to_string(), do_not_edit()];
    let type_w = DESCR_FIELDS.iter().map(|(t, _, _)| t.len()).max().unwrap_or(0);
    let name_w = DESCR_FIELDS.iter().map(|(_, n, _)| n.len()).max().unwrap_or(0) + 1;
    for (ctype, name, comment) in DESCR_FIELDS {
        let comment = if comment.is_empty() {
            String::new()
        } else {
            format!(" // {}", comment)
        };
        let field = format!("{};", name);
        let line = format!("  {:<type_w$} {:<name_w$}{}", ctype, field, comment);
        lines.push(line.trim_end().to_string());
    }
    lines.push(DESCR_END.to_string());
    lines.join("\n")
}
