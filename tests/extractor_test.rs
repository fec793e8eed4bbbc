//! Integration tests for field extraction against a complete authorized
//! NF-e document.

use danfe::{extract_fields, DocKind, IcmsRegime};

const NFE_COMPLETA: &str = include_str!("fixtures/nfe_completa.xml");

#[test]
fn test_detects_processed_envelope() {
    assert_eq!(danfe::detect_kind(NFE_COMPLETA), Some(DocKind::NfeProc));
    assert!(danfe::is_nfe_xml(NFE_COMPLETA));
}

#[test]
fn test_identification_section() {
    let fields = extract_fields(NFE_COMPLETA).unwrap();
    assert_eq!(fields.identification.number, "951354");
    assert_eq!(fields.identification.series, "12");
    assert_eq!(fields.identification.nat_op, "VENDA DE MERCADORIA");
    assert_eq!(fields.identification.issued_at, "2025-05-04T11:47:00-03:00");
    assert_eq!(fields.identification.tp_nf, "1");
}

#[test]
fn test_access_key_from_id() {
    let fields = extract_fields(NFE_COMPLETA).unwrap();
    assert_eq!(
        fields.access_key,
        "31250517291576000158550120009513541348716910"
    );
}

#[test]
fn test_issuer_and_recipient_scoped() {
    let fields = extract_fields(NFE_COMPLETA).unwrap();

    assert_eq!(
        fields.issuer.name,
        "ORGAFARMA PRODUTOS FARMACEUTICOS LTDA"
    );
    assert_eq!(fields.issuer.cnpj, "17291576000158");
    assert_eq!(fields.issuer.ie, "0621234567890");
    assert_eq!(fields.issuer.address.city, "BELO HORIZONTE");
    assert_eq!(fields.issuer.address.uf, "MG");
    assert_eq!(fields.issuer.address.cep, "31270010");

    assert_eq!(
        fields.recipient.name,
        "ALESSANDRO REZENDE SANTOS E CIA LTDA EPP"
    );
    assert_eq!(fields.recipient.cnpj, "05318502000101");
    assert_eq!(fields.recipient.address.city, "UBERABA");
    // Same leaf names in both sections; values must not bleed across.
    assert_ne!(fields.issuer.cnpj, fields.recipient.cnpj);
    assert_ne!(fields.issuer.address.phone, fields.recipient.address.phone);
}

#[test]
fn test_totals_section() {
    let fields = extract_fields(NFE_COMPLETA).unwrap();
    assert_eq!(fields.totals.v_prod, "825.23");
    assert_eq!(fields.totals.v_outro, "50.90");
    assert_eq!(fields.totals.v_nf, "876.13");
    assert_eq!(fields.totals.v_bc, "0.00");
}

#[test]
fn test_transport_section() {
    let fields = extract_fields(NFE_COMPLETA).unwrap();
    assert_eq!(fields.transport.name, "P H LOGISTICA LTDA ME");
    assert_eq!(fields.transport.cnpj, "20147617000170");
    assert_eq!(fields.transport.city, "BETIM");
    assert_eq!(fields.transport.mod_frete, "1");
    assert_eq!(fields.transport.volume_qty, "4");
    assert_eq!(fields.transport.volume_kind, "CAIXA");
    assert_eq!(fields.transport.net_weight, "18.500");
    assert_eq!(fields.transport.gross_weight, "19.800");
}

#[test]
fn test_protocol_section() {
    let fields = extract_fields(NFE_COMPLETA).unwrap();
    assert!(fields.protocol.is_present());
    assert_eq!(fields.protocol.number, "131250987654321");
    assert_eq!(fields.protocol.authorized_at, "2025-05-04T11:48:12-03:00");
}

#[test]
fn test_additional_information() {
    let fields = extract_fields(NFE_COMPLETA).unwrap();
    assert!(fields.additional.complementary.starts_with("PEDIDO 4587"));
    assert_eq!(fields.additional.fiscal, "");
}

#[test]
fn test_all_items_in_document_order() {
    let fields = extract_fields(NFE_COMPLETA).unwrap();
    assert_eq!(fields.items.len(), 8);

    let first = &fields.items[0];
    assert_eq!(first.code, "7898095530037");
    assert_eq!(first.description, "DIPIRONA SODICA 500MG C/30 COMPRIMIDOS");
    assert_eq!(first.ncm, "30049099");
    assert_eq!(first.cfop, "5405");
    assert_eq!(first.unit, "CX");
    assert_eq!(first.quantity, "10.0000");
    assert_eq!(first.total_value, "120.00");
    assert_eq!(first.icms.regime, IcmsRegime::Icms60);
    assert_eq!(first.icms.cst, "60");

    let last = &fields.items[7];
    assert_eq!(last.code, "7898095530105");
    assert_eq!(last.unit, "UN");
    assert_eq!(last.total_value, "95.00");
}

#[test]
fn test_filename_derived_from_number() {
    let fields = extract_fields(NFE_COMPLETA).unwrap();
    assert_eq!(fields.filename(), "DANFE_951354.pdf");
}
