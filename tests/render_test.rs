//! End-to-end rendering tests: XML in, PDF bytes out.

use danfe::{render_str, render_str_with_options, Danfe, RenderOptions};

const NFE_COMPLETA: &str = include_str!("fixtures/nfe_completa.xml");

/// Build an NF-e with `n` identical line items.
fn nfe_with_items(n: usize) -> String {
    let mut dets = String::new();
    for i in 1..=n {
        dets.push_str(&format!(
            r#"<det nItem="{i}">
                 <prod><cProd>P{i}</cProd><xProd>PRODUTO {i}</xProd>
                   <NCM>30049099</NCM><CFOP>5405</CFOP><uCom>UN</uCom>
                   <qCom>1.0000</qCom><vUnCom>10.00</vUnCom><vProd>10.00</vProd></prod>
                 <imposto><ICMS><ICMS60><CST>60</CST></ICMS60></ICMS></imposto>
               </det>"#
        ));
    }
    format!(
        r#"<NFe xmlns="http://www.portalfiscal.inf.br/nfe">
             <infNFe Id="NFe31250517291576000158550120009513541348716910" versao="4.00">
               <ide><nNF>555</nNF><serie>1</serie><natOp>VENDA</natOp></ide>
               <emit><xNome>EMITENTE SA</xNome><CNPJ>17291576000158</CNPJ></emit>
               <dest><xNome>DESTINATARIO LTDA</xNome></dest>
               {dets}
               <total><ICMSTot><vNF>{}.00</vNF></ICMSTot></total>
             </infNFe>
           </NFe>"#,
        n * 10
    )
}

#[test]
fn test_render_complete_document() {
    let rendered = render_str(NFE_COMPLETA).unwrap();
    assert_eq!(rendered.filename, "DANFE_951354.pdf");
    assert_eq!(rendered.pages, 1);
    assert!(rendered.bytes.starts_with(b"%PDF"));
    let tail = &rendered.bytes[rendered.bytes.len().saturating_sub(32)..];
    assert!(tail.windows(5).any(|w| w == b"%%EOF"));
}

#[test]
fn test_render_is_deterministic_in_size_order() {
    // More items means more drawing operations and a larger document.
    let small = render_str(&nfe_with_items(1)).unwrap();
    let large = render_str(&nfe_with_items(20)).unwrap();
    assert!(large.bytes.len() > small.bytes.len());
}

#[test]
fn test_overflow_paginates_by_default() {
    let rendered = render_str(&nfe_with_items(80)).unwrap();
    assert!(rendered.pages >= 2, "80 items must not fit on one page");
}

#[test]
fn test_overflow_truncates_when_requested() {
    let options = RenderOptions::new().single_page();
    let rendered = render_str_with_options(&nfe_with_items(80), &options).unwrap();
    assert_eq!(rendered.pages, 1);
}

#[test]
fn test_unauthorized_note_renders_blank_protocol() {
    // No protNFe envelope at all; the render must still succeed.
    let rendered = render_str(&nfe_with_items(2)).unwrap();
    assert!(rendered.bytes.starts_with(b"%PDF"));
}

#[test]
fn test_render_without_items() {
    let xml = r#"<NFe><infNFe Id="NFe31250517291576000158550120009513541348716910">
        <ide><nNF>42</nNF></ide><emit><xNome>E</xNome></emit></infNFe></NFe>"#;
    let rendered = render_str(xml).unwrap();
    assert_eq!(rendered.filename, "DANFE_42.pdf");
    assert_eq!(rendered.pages, 1);
}

#[test]
fn test_missing_inf_nfe_is_an_error() {
    assert!(render_str("<root><data/></root>").is_err());
}

#[test]
fn test_save_to_directory() {
    let dir = tempfile::tempdir().unwrap();
    let rendered = render_str(NFE_COMPLETA).unwrap();
    let path = rendered.save_to(dir.path()).unwrap();
    assert_eq!(path, dir.path().join("DANFE_951354.pdf"));
    let on_disk = std::fs::read(&path).unwrap();
    assert_eq!(on_disk, rendered.bytes);
}

#[test]
fn test_builder_pipeline() {
    let result = Danfe::new()
        .with_title("NF 951354")
        .parse_str(NFE_COMPLETA)
        .unwrap();
    assert_eq!(result.fields().items.len(), 8);

    let json = result.to_json(true).unwrap();
    assert!(json.contains("ORGAFARMA"));

    let rendered = result.to_pdf().unwrap();
    assert!(rendered.bytes.starts_with(b"%PDF"));
}
