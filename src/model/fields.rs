//! Document-level field records.
//!
//! All values are kept as the raw strings found in the XML; locale
//! formatting (money, dates, key grouping) happens at render time. Missing
//! fields are empty strings; the layout draws the box either way.

use super::LineItem;
use serde::{Deserialize, Serialize};

/// Every field extracted from one NF-e, resolved per section.
///
/// Created fresh per render call and immutable once built. Sections that
/// share leaf tag names (`xNome`, `CNPJ`, `UF`, `fone`, `IE` appear under
/// issuer, recipient, and transporter alike) are extracted scoped to their
/// own ancestor element, so values never cross-assign.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DanfeFields {
    /// Invoice identification (`ide` section).
    pub identification: Identification,

    /// 44-digit access key, ungrouped.
    pub access_key: String,

    /// Issuer (`emit` section).
    pub issuer: Party,

    /// Recipient (`dest` section).
    pub recipient: Party,

    /// Invoice totals (`total/ICMSTot` section).
    pub totals: Totals,

    /// Transporter and volumes (`transp` section).
    pub transport: Transport,

    /// Authorization protocol (`protNFe` section); blank while pending.
    pub protocol: Protocol,

    /// Free-text additional information (`infAdic` section).
    pub additional: AdditionalInfo,

    /// Line items in document order, one per `det`.
    pub items: Vec<LineItem>,
}

impl DanfeFields {
    /// Base name for the output artifact: the invoice number, falling back
    /// to the access key, falling back to a constant placeholder.
    pub fn filename_base(&self) -> &str {
        if !self.identification.number.is_empty() {
            &self.identification.number
        } else if !self.access_key.is_empty() {
            &self.access_key
        } else {
            "documento"
        }
    }

    /// Derived download filename, e.g. `DANFE_951354.pdf`.
    pub fn filename(&self) -> String {
        format!("DANFE_{}.pdf", self.filename_base())
    }
}

/// Fields of the `ide` identification section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Identification {
    /// Invoice number (`nNF`).
    pub number: String,
    /// Series (`serie`).
    pub series: String,
    /// Nature of the operation (`natOp`).
    pub nat_op: String,
    /// Emission timestamp (`dhEmi`), raw.
    pub issued_at: String,
    /// Exit/entry timestamp (`dhSaiEnt`), raw.
    pub exit_at: String,
    /// `tpNF`: "0" for incoming, "1" for outgoing.
    pub tp_nf: String,
}

/// A party on the invoice: issuer or recipient.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Party {
    /// Legal name (`xNome`).
    pub name: String,
    /// CNPJ or CPF, whichever the document carries.
    pub cnpj: String,
    /// State registration (`IE`).
    pub ie: String,
    /// Address block (`enderEmit`/`enderDest`).
    pub address: Address,
}

/// Address fields shared by both parties.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Address {
    /// Street (`xLgr`).
    pub street: String,
    /// Number (`nro`).
    pub number: String,
    /// District (`xBairro`).
    pub district: String,
    /// Municipality (`xMun`).
    pub city: String,
    /// State code (`UF`).
    pub uf: String,
    /// Postal code (`CEP`).
    pub cep: String,
    /// Phone (`fone`).
    pub phone: String,
}

impl Address {
    /// Street and number joined for a single box, e.g. "RUA JACUI, 8090".
    pub fn street_line(&self) -> String {
        match (self.street.is_empty(), self.number.is_empty()) {
            (false, false) => format!("{}, {}", self.street, self.number),
            (false, true) => self.street.clone(),
            (true, false) => self.number.clone(),
            (true, true) => String::new(),
        }
    }
}

/// Aggregate tax totals from `total/ICMSTot`. Raw decimal strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Totals {
    /// ICMS tax basis (`vBC`).
    pub v_bc: String,
    /// ICMS value (`vICMS`).
    pub v_icms: String,
    /// ICMS-ST basis (`vBCST`).
    pub v_bc_st: String,
    /// ICMS-ST value (`vST`).
    pub v_st: String,
    /// Products total (`vProd`).
    pub v_prod: String,
    /// Freight (`vFrete`).
    pub v_frete: String,
    /// Insurance (`vSeg`).
    pub v_seg: String,
    /// Discount (`vDesc`).
    pub v_desc: String,
    /// Other expenses (`vOutro`).
    pub v_outro: String,
    /// IPI value (`vIPI`).
    pub v_ipi: String,
    /// Invoice grand total (`vNF`).
    pub v_nf: String,
}

/// Transporter and volume fields from `transp`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transport {
    /// Transporter legal name (`transporta/xNome`).
    pub name: String,
    /// Transporter CNPJ or CPF.
    pub cnpj: String,
    /// Transporter state registration (`IE`).
    pub ie: String,
    /// Free-form address (`xEnder`).
    pub address: String,
    /// Municipality (`xMun`).
    pub city: String,
    /// State code (`UF`).
    pub uf: String,
    /// Freight responsibility code (`modFrete`).
    pub mod_frete: String,
    /// Volume count (`vol/qVol`).
    pub volume_qty: String,
    /// Volume kind (`vol/esp`).
    pub volume_kind: String,
    /// Net weight (`vol/pesoL`).
    pub net_weight: String,
    /// Gross weight (`vol/pesoB`).
    pub gross_weight: String,
}

impl Transport {
    /// Printable freight-responsibility label for the `modFrete` code.
    pub fn freight_label(&self) -> String {
        match self.mod_frete.as_str() {
            "0" => "0-EMITENTE".to_string(),
            "1" => "1-DESTINATARIO".to_string(),
            "2" => "2-TERCEIROS".to_string(),
            "9" => "9-SEM FRETE".to_string(),
            "" => String::new(),
            other => other.to_string(),
        }
    }
}

/// Authorization protocol fields from `protNFe`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Protocol {
    /// Protocol number (`nProt`).
    pub number: String,
    /// Authorization timestamp (`dhRecbto`), raw.
    pub authorized_at: String,
}

impl Protocol {
    /// Whether the document carries an authorization protocol at all.
    pub fn is_present(&self) -> bool {
        !self.number.is_empty() || !self.authorized_at.is_empty()
    }
}

/// Free-text blocks from `infAdic`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdditionalInfo {
    /// Taxpayer complementary information (`infCpl`).
    pub complementary: String,
    /// Fiscal authority information (`infAdFisco`).
    pub fiscal: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_from_number() {
        let fields = DanfeFields {
            identification: Identification {
                number: "951354".to_string(),
                ..Default::default()
            },
            access_key: "3".repeat(44),
            ..Default::default()
        };
        assert_eq!(fields.filename(), "DANFE_951354.pdf");
    }

    #[test]
    fn test_filename_falls_back_to_key() {
        let fields = DanfeFields {
            access_key: "3".repeat(44),
            ..Default::default()
        };
        assert_eq!(fields.filename(), format!("DANFE_{}.pdf", "3".repeat(44)));
    }

    #[test]
    fn test_filename_placeholder() {
        let fields = DanfeFields::default();
        assert_eq!(fields.filename(), "DANFE_documento.pdf");
    }

    #[test]
    fn test_street_line() {
        let addr = Address {
            street: "RUA JACUI".to_string(),
            number: "8090".to_string(),
            ..Default::default()
        };
        assert_eq!(addr.street_line(), "RUA JACUI, 8090");

        let empty = Address::default();
        assert_eq!(empty.street_line(), "");
    }

    #[test]
    fn test_freight_label() {
        let t = Transport {
            mod_frete: "0".to_string(),
            ..Default::default()
        };
        assert_eq!(t.freight_label(), "0-EMITENTE");
        assert_eq!(Transport::default().freight_label(), "");
    }
}
