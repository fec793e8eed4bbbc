//! Line items and the per-item ICMS detail.

use serde::{Deserialize, Serialize};

/// One product/service entry, one per `det` node, in document order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineItem {
    /// Product code (`cProd`).
    pub code: String,
    /// Description (`xProd`).
    pub description: String,
    /// NCM tax-classification code.
    pub ncm: String,
    /// CFOP operation code.
    pub cfop: String,
    /// Commercial unit (`uCom`).
    pub unit: String,
    /// Quantity (`qCom`), raw decimal string.
    pub quantity: String,
    /// Unit value (`vUnCom`), raw decimal string.
    pub unit_value: String,
    /// Line total (`vProd`), raw decimal string.
    pub total_value: String,
    /// ICMS detail from the regime-specific child group.
    pub icms: IcmsDetail,
}

/// ICMS fields pulled from the regime-specific child of `imposto/ICMS`.
///
/// The child's tag name encodes the tax regime (`ICMS00`, `ICMS60`,
/// `ICMSSN102`, ...). The regime is classified into [`IcmsRegime`] rather
/// than taken positionally, so an unexpected ordering of siblings cannot
/// change which group is read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IcmsDetail {
    /// Which regime group supplied the fields.
    pub regime: IcmsRegime,
    /// `CST` or `CSOSN`, whichever the group carries.
    pub cst: String,
    /// ICMS basis (`vBC`), raw; empty when the group has none.
    pub v_bc: String,
    /// ICMS value (`vICMS`), raw; empty when the group has none.
    pub v_icms: String,
}

/// The ICMS regime group found on an item.
///
/// The schema enumerates the regular-regime groups; Simples Nacional uses
/// `ICMSSN*` tags carrying a CSOSN instead of a CST. Tags outside either
/// family still have their sub-fields read, via [`IcmsRegime::Unknown`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IcmsRegime {
    Icms00,
    Icms10,
    Icms20,
    Icms30,
    Icms40,
    Icms51,
    Icms60,
    Icms70,
    Icms90,
    /// Simples Nacional group; carries the full tag, e.g. "ICMSSN102".
    SimplesNacional(String),
    /// Unrecognized group tag, kept verbatim.
    Unknown(String),
    /// No ICMS group present on the item.
    #[default]
    Absent,
}

impl IcmsRegime {
    /// Classify a group tag name.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "ICMS00" => IcmsRegime::Icms00,
            "ICMS10" => IcmsRegime::Icms10,
            "ICMS20" => IcmsRegime::Icms20,
            "ICMS30" => IcmsRegime::Icms30,
            "ICMS40" => IcmsRegime::Icms40,
            "ICMS51" => IcmsRegime::Icms51,
            "ICMS60" => IcmsRegime::Icms60,
            "ICMS70" => IcmsRegime::Icms70,
            "ICMS90" => IcmsRegime::Icms90,
            t if t.starts_with("ICMSSN") => IcmsRegime::SimplesNacional(t.to_string()),
            t => IcmsRegime::Unknown(t.to_string()),
        }
    }

    /// Whether this regime's situation code is a CSOSN rather than a CST.
    pub fn uses_csosn(&self) -> bool {
        matches!(self, IcmsRegime::SimplesNacional(_))
    }
}
