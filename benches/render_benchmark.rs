//! Benchmarks for danfe extraction and rendering performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks use synthetic NF-e documents of varying item counts.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Creates a synthetic NF-e with the given number of line items.
fn create_test_nfe(item_count: usize) -> String {
    let mut dets = String::new();
    for i in 1..=item_count {
        dets.push_str(&format!(
            r#"<det nItem="{i}">
                 <prod><cProd>789809553{i:04}</cProd><xProd>PRODUTO DE TESTE {i}</xProd>
                   <NCM>30049099</NCM><CFOP>5405</CFOP><uCom>UN</uCom>
                   <qCom>3.0000</qCom><vUnCom>12.5000</vUnCom><vProd>37.50</vProd></prod>
                 <imposto><ICMS><ICMS60><orig>0</orig><CST>60</CST></ICMS60></ICMS></imposto>
               </det>"#
        ));
    }
    format!(
        r#"<nfeProc xmlns="http://www.portalfiscal.inf.br/nfe" versao="4.00">
             <NFe><infNFe Id="NFe31250517291576000158550120009513541348716910" versao="4.00">
               <ide><nNF>951354</nNF><serie>12</serie><natOp>VENDA</natOp>
                 <dhEmi>2025-05-04T11:47:00-03:00</dhEmi><tpNF>1</tpNF></ide>
               <emit><CNPJ>17291576000158</CNPJ><xNome>EMITENTE DE TESTE SA</xNome>
                 <enderEmit><xLgr>RUA A</xLgr><nro>1</nro><xMun>BELO HORIZONTE</xMun>
                   <UF>MG</UF><CEP>31270010</CEP></enderEmit><IE>0621234567890</IE></emit>
               <dest><CNPJ>05318502000101</CNPJ><xNome>DESTINATARIO DE TESTE LTDA</xNome>
                 <enderDest><xLgr>AV B</xLgr><nro>2</nro><xMun>UBERABA</xMun>
                   <UF>MG</UF><CEP>38010000</CEP></enderDest></dest>
               {dets}
               <total><ICMSTot><vProd>825.23</vProd><vNF>876.13</vNF></ICMSTot></total>
               <transp><modFrete>1</modFrete></transp>
             </infNFe></NFe>
             <protNFe><infProt><nProt>131250987654321</nProt>
               <dhRecbto>2025-05-04T11:48:12-03:00</dhRecbto></infProt></protNFe>
           </nfeProc>"#
    )
}

/// Benchmark NF-e detection.
fn bench_detection(c: &mut Criterion) {
    let nfe = create_test_nfe(1);
    let other = "<invoice><line/></invoice>";

    c.bench_function("detect_valid_nfe", |b| {
        b.iter(|| danfe::detect_kind(black_box(&nfe)));
    });

    c.bench_function("detect_non_nfe", |b| {
        b.iter(|| danfe::detect_kind(black_box(other)).is_none());
    });
}

/// Benchmark field extraction at various item counts.
fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extraction");

    for item_count in [1, 8, 50].iter() {
        let xml = create_test_nfe(*item_count);

        group.bench_function(format!("{}_items", item_count), |b| {
            b.iter(|| danfe::extract_fields(black_box(&xml)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark the full XML-to-PDF pipeline.
fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    group.sample_size(20);

    for item_count in [8, 50].iter() {
        let xml = create_test_nfe(*item_count);

        group.bench_function(format!("{}_items", item_count), |b| {
            b.iter(|| danfe::render_str(black_box(&xml)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark barcode encoding alone.
fn bench_barcode(c: &mut Criterion) {
    let key = "31250517291576000158550120009513541348716910";

    c.bench_function("barcode_encode", |b| {
        b.iter(|| danfe::render::encode_access_key(black_box(key)));
    });
}

criterion_group!(
    benches,
    bench_detection,
    bench_extraction,
    bench_render,
    bench_barcode,
);
criterion_main!(benches);
