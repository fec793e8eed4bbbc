//! Field extraction over the NF-e schema.
//!
//! Every section is located once via [`accessor::descendant`] and its leaf
//! fields are read scoped to that section's element, never to the document
//! root. Issuer, recipient, and transporter all carry `xNome`, `CNPJ`,
//! `UF`, and `fone` leaves, so scoping is what keeps them apart.
//!
//! Extraction degrades gracefully: any absent section or leaf becomes an
//! empty string. The sole fatal condition is failing to locate `infNFe`.

use log::debug;
use roxmltree::{Document, Node};

use super::accessor::{self, attr, child, descendant, element_children, text};
use crate::error::{Error, Result};
use crate::model::{
    AdditionalInfo, Address, DanfeFields, IcmsDetail, IcmsRegime, Identification, LineItem, Party,
    Protocol, Totals, Transport,
};

/// Parse raw XML text and extract all DANFE fields.
///
/// Fails only when the input is not well-formed XML or no `infNFe` section
/// can be located anywhere in the tree.
pub fn extract_fields(xml: &str) -> Result<DanfeFields> {
    let doc = Document::parse(xml)?;
    extract_from_document(&doc)
}

/// Extract all DANFE fields from an already-parsed document.
pub fn extract_from_document(doc: &Document) -> Result<DanfeFields> {
    let root = doc.root_element();
    let inf_nfe = descendant(root, "infNFe")
        .ok_or_else(|| Error::Parse("no infNFe section found".to_string()))?;

    // protNFe lives outside infNFe (a sibling of NFe inside nfeProc), so it
    // is resolved from the document root.
    let protocol = extract_protocol(root);
    let access_key = extract_access_key(inf_nfe, root);

    Ok(DanfeFields {
        identification: extract_identification(inf_nfe),
        access_key,
        issuer: extract_party(inf_nfe, "emit", "enderEmit"),
        recipient: extract_party(inf_nfe, "dest", "enderDest"),
        totals: extract_totals(inf_nfe),
        transport: extract_transport(inf_nfe),
        protocol,
        additional: extract_additional(inf_nfe),
        items: extract_items(inf_nfe),
    })
}

/// The 44-digit key comes from the `Id` attribute (`"NFe" + key`), with the
/// protocol's `chNFe` as fallback for producers that omit the attribute.
fn extract_access_key(inf_nfe: Node, root: Node) -> String {
    let id = attr(inf_nfe, "Id");
    let digits: String = id.chars().filter(|c| c.is_ascii_digit()).collect();
    if !digits.is_empty() {
        return digits;
    }
    descendant(root, "chNFe")
        .map(accessor::own_text)
        .unwrap_or_default()
}

fn extract_identification(inf_nfe: Node) -> Identification {
    let Some(ide) = descendant(inf_nfe, "ide") else {
        debug!("ide section absent; identification fields default to empty");
        return Identification::default();
    };
    Identification {
        number: text(ide, "nNF"),
        series: text(ide, "serie"),
        nat_op: text(ide, "natOp"),
        issued_at: text(ide, "dhEmi"),
        exit_at: text(ide, "dhSaiEnt"),
        tp_nf: text(ide, "tpNF"),
    }
}

fn extract_party(inf_nfe: Node, section: &str, address_tag: &str) -> Party {
    let Some(node) = descendant(inf_nfe, section) else {
        debug!("{section} section absent; party fields default to empty");
        return Party::default();
    };
    let cnpj = match text(node, "CNPJ") {
        c if c.is_empty() => text(node, "CPF"),
        c => c,
    };
    Party {
        name: text(node, "xNome"),
        cnpj,
        ie: text(node, "IE"),
        address: extract_address(node, address_tag),
    }
}

fn extract_address(party: Node, address_tag: &str) -> Address {
    let Some(ender) = child(party, address_tag) else {
        return Address::default();
    };
    Address {
        street: text(ender, "xLgr"),
        number: text(ender, "nro"),
        district: text(ender, "xBairro"),
        city: text(ender, "xMun"),
        uf: text(ender, "UF"),
        cep: text(ender, "CEP"),
        phone: text(ender, "fone"),
    }
}

fn extract_totals(inf_nfe: Node) -> Totals {
    let icms_tot = descendant(inf_nfe, "total").and_then(|t| descendant(t, "ICMSTot"));
    let Some(tot) = icms_tot else {
        debug!("total/ICMSTot absent; totals default to empty");
        return Totals::default();
    };
    Totals {
        v_bc: text(tot, "vBC"),
        v_icms: text(tot, "vICMS"),
        v_bc_st: text(tot, "vBCST"),
        v_st: text(tot, "vST"),
        v_prod: text(tot, "vProd"),
        v_frete: text(tot, "vFrete"),
        v_seg: text(tot, "vSeg"),
        v_desc: text(tot, "vDesc"),
        v_outro: text(tot, "vOutro"),
        v_ipi: text(tot, "vIPI"),
        v_nf: text(tot, "vNF"),
    }
}

fn extract_transport(inf_nfe: Node) -> Transport {
    let Some(transp) = descendant(inf_nfe, "transp") else {
        debug!("transp section absent; transporter renders blank");
        return Transport::default();
    };
    let mut out = Transport {
        mod_frete: text(transp, "modFrete"),
        ..Default::default()
    };
    if let Some(carrier) = child(transp, "transporta") {
        let cnpj = match text(carrier, "CNPJ") {
            c if c.is_empty() => text(carrier, "CPF"),
            c => c,
        };
        out.name = text(carrier, "xNome");
        out.cnpj = cnpj;
        out.ie = text(carrier, "IE");
        out.address = text(carrier, "xEnder");
        out.city = text(carrier, "xMun");
        out.uf = text(carrier, "UF");
    }
    if let Some(vol) = child(transp, "vol") {
        out.volume_qty = text(vol, "qVol");
        out.volume_kind = text(vol, "esp");
        out.net_weight = text(vol, "pesoL");
        out.gross_weight = text(vol, "pesoB");
    }
    out
}

fn extract_protocol(root: Node) -> Protocol {
    let Some(prot) = descendant(root, "protNFe") else {
        debug!("protNFe absent; protocol fields render blank");
        return Protocol::default();
    };
    // nProt/dhRecbto sit inside infProt; descend rather than assume depth.
    Protocol {
        number: descendant(prot, "nProt")
            .map(accessor::own_text)
            .unwrap_or_default(),
        authorized_at: descendant(prot, "dhRecbto")
            .map(accessor::own_text)
            .unwrap_or_default(),
    }
}

fn extract_additional(inf_nfe: Node) -> AdditionalInfo {
    let Some(inf_adic) = descendant(inf_nfe, "infAdic") else {
        return AdditionalInfo::default();
    };
    AdditionalInfo {
        complementary: text(inf_adic, "infCpl"),
        fiscal: text(inf_adic, "infAdFisco"),
    }
}

fn extract_items(inf_nfe: Node) -> Vec<LineItem> {
    element_children(inf_nfe)
        .filter(|n| n.tag_name().name() == "det")
        .map(extract_item)
        .collect()
}

fn extract_item(det: Node) -> LineItem {
    let mut item = LineItem {
        icms: extract_icms(det),
        ..Default::default()
    };
    if let Some(prod) = child(det, "prod") {
        item.code = text(prod, "cProd");
        item.description = text(prod, "xProd");
        item.ncm = text(prod, "NCM");
        item.cfop = text(prod, "CFOP");
        item.unit = text(prod, "uCom");
        item.quantity = text(prod, "qCom");
        item.unit_value = text(prod, "vUnCom");
        item.total_value = text(prod, "vProd");
    }
    item
}

/// Locate the regime-specific ICMS group under `det/imposto/ICMS`.
///
/// The group's tag name encodes the regime and is classified rather than
/// taken positionally: the first child whose tag is a recognized regime
/// wins; when none is recognized the first element child is still read, its
/// tag preserved in [`IcmsRegime::Unknown`].
fn extract_icms(det: Node) -> IcmsDetail {
    let group = child(det, "imposto")
        .and_then(|imposto| child(imposto, "ICMS"))
        .and_then(|icms| {
            let children: Vec<Node> = element_children(icms).collect();
            children
                .iter()
                .find(|n| {
                    !matches!(
                        IcmsRegime::from_tag(n.tag_name().name()),
                        IcmsRegime::Unknown(_)
                    )
                })
                .or_else(|| children.first())
                .copied()
        });

    let Some(group) = group else {
        return IcmsDetail::default();
    };

    let regime = IcmsRegime::from_tag(group.tag_name().name());
    let cst = match text(group, "CST") {
        c if c.is_empty() => text(group, "CSOSN"),
        c => c,
    };
    IcmsDetail {
        regime,
        cst,
        v_bc: text(group, "vBC"),
        v_icms: text(group, "vICMS"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal(extra: &str) -> String {
        format!(
            r#"<NFe xmlns="http://www.portalfiscal.inf.br/nfe">
                 <infNFe Id="NFe31250517291576000158550120009513541348716910" versao="4.00">
                   <ide><nNF>951354</nNF><serie>12</serie></ide>
                   {extra}
                 </infNFe>
               </NFe>"#
        )
    }

    #[test]
    fn test_missing_inf_nfe_is_fatal() {
        let err = extract_fields("<root><other/></root>").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_malformed_xml_is_fatal() {
        assert!(matches!(
            extract_fields("not xml"),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn test_access_key_from_id_attribute() {
        let fields = extract_fields(&minimal("")).unwrap();
        assert_eq!(fields.access_key.len(), 44);
        assert!(fields.access_key.starts_with("31250517"));
    }

    #[test]
    fn test_access_key_falls_back_to_ch_nfe() {
        let xml = format!(
            r#"<nfeProc><NFe><infNFe><ide/></infNFe></NFe>
               <protNFe><infProt><chNFe>{}</chNFe><nProt>135250000001</nProt></infProt></protNFe>
               </nfeProc>"#,
            "4".repeat(44)
        );
        let fields = extract_fields(&xml).unwrap();
        assert_eq!(fields.access_key, "4".repeat(44));
        assert_eq!(fields.protocol.number, "135250000001");
    }

    #[test]
    fn test_sections_never_cross_assign() {
        let xml = minimal(
            r#"<emit><CNPJ>111</CNPJ><xNome>EMITENTE SA</xNome>
                 <enderEmit><UF>MG</UF></enderEmit></emit>
               <dest><CNPJ>222</CNPJ><xNome>DESTINATARIO LTDA</xNome>
                 <enderDest><UF>SP</UF></enderDest></dest>"#,
        );
        let fields = extract_fields(&xml).unwrap();
        assert_eq!(fields.issuer.name, "EMITENTE SA");
        assert_eq!(fields.issuer.cnpj, "111");
        assert_eq!(fields.issuer.address.uf, "MG");
        assert_eq!(fields.recipient.name, "DESTINATARIO LTDA");
        assert_eq!(fields.recipient.cnpj, "222");
        assert_eq!(fields.recipient.address.uf, "SP");
    }

    #[test]
    fn test_missing_transp_degrades() {
        let fields = extract_fields(&minimal("")).unwrap();
        assert_eq!(fields.transport.name, "");
        assert_eq!(fields.transport.volume_qty, "");
    }

    #[test]
    fn test_cpf_fallback_for_recipient() {
        let xml = minimal("<dest><CPF>12345678901</CPF><xNome>PESSOA</xNome></dest>");
        let fields = extract_fields(&xml).unwrap();
        assert_eq!(fields.recipient.cnpj, "12345678901");
    }

    #[test]
    fn test_item_icms_regime_union() {
        let xml = minimal(
            r#"<det nItem="1">
                 <prod><cProd>199648</cProd><xProd>DESCON 120ML</xProd>
                   <NCM>30049036</NCM><CFOP>5405</CFOP><uCom>UN</uCom>
                   <qCom>2.0000</qCom><vUnCom>14.0480</vUnCom><vProd>28.10</vProd></prod>
                 <imposto><ICMS><ICMS60><orig>0</orig><CST>60</CST></ICMS60></ICMS></imposto>
               </det>"#,
        );
        let fields = extract_fields(&xml).unwrap();
        assert_eq!(fields.items.len(), 1);
        let item = &fields.items[0];
        assert_eq!(item.code, "199648");
        assert_eq!(item.cfop, "5405");
        assert_eq!(item.icms.regime, IcmsRegime::Icms60);
        assert_eq!(item.icms.cst, "60");
        assert_eq!(item.icms.v_bc, "");
    }

    #[test]
    fn test_unknown_regime_still_reads_fields() {
        let xml = minimal(
            r#"<det nItem="1"><prod><cProd>1</cProd></prod>
                 <imposto><ICMS><ICMSPart><CST>10</CST><vBC>5.00</vBC><vICMS>0.90</vICMS></ICMSPart></ICMS></imposto>
               </det>"#,
        );
        let fields = extract_fields(&xml).unwrap();
        let icms = &fields.items[0].icms;
        assert_eq!(icms.regime, IcmsRegime::Unknown("ICMSPart".to_string()));
        assert_eq!(icms.v_bc, "5.00");
        assert_eq!(icms.v_icms, "0.90");
    }

    #[test]
    fn test_known_regime_preferred_over_unknown_sibling() {
        let xml = minimal(
            r#"<det nItem="1"><prod><cProd>1</cProd></prod>
                 <imposto><ICMS>
                   <ICMSExt><CST>99</CST></ICMSExt>
                   <ICMSSN102><CSOSN>102</CSOSN></ICMSSN102>
                 </ICMS></imposto>
               </det>"#,
        );
        let fields = extract_fields(&xml).unwrap();
        let icms = &fields.items[0].icms;
        assert!(icms.regime.uses_csosn());
        assert_eq!(icms.cst, "102");
    }

    #[test]
    fn test_item_order_preserved() {
        let xml = minimal(
            r#"<det nItem="1"><prod><cProd>A</cProd></prod></det>
               <det nItem="2"><prod><cProd>B</cProd></prod></det>
               <det nItem="3"><prod><cProd>C</cProd></prod></det>"#,
        );
        let fields = extract_fields(&xml).unwrap();
        let codes: Vec<&str> = fields.items.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_namespace_tolerance() {
        let plain = r#"<NFe><infNFe Id="NFe123"><ide><nNF>77</nNF></ide>
            <emit><xNome>X</xNome></emit></infNFe></NFe>"#;
        let prefixed = r#"<n:NFe xmlns:n="http://www.portalfiscal.inf.br/nfe">
            <n:infNFe Id="NFe123"><n:ide><n:nNF>77</n:nNF></n:ide>
            <n:emit><n:xNome>X</n:xNome></n:emit></n:infNFe></n:NFe>"#;
        let a = extract_fields(plain).unwrap();
        let b = extract_fields(prefixed).unwrap();
        assert_eq!(a.identification.number, "77");
        assert_eq!(a.identification.number, b.identification.number);
        assert_eq!(a.issuer.name, b.issuer.name);
    }
}
