//! DANFE assembly.
//!
//! Drives the layout primitives through the fixed section sequence
//! (header, parties, tax totals, transport, line items, additional-data
//! footer) against one [`DanfeFields`] record. Sections are emitted
//! strictly in order and exactly once per page; missing data renders as
//! empty boxes so the paper form keeps its legal geometry.

use std::fs;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use log::debug;
use printpdf::image_crate::DynamicImage;
use printpdf::{BuiltinFont, Mm, PdfDocument};

use super::barcode::encode_access_key;
use super::layout::{
    Canvas, Cursor, HAlign, CONTENT_WIDTH_MM, MARGIN_MM, PAGE_HEIGHT_MM, PAGE_WIDTH_MM,
};
use super::options::{OverflowPolicy, RenderOptions};
use crate::error::{Error, Result};
use crate::format;
use crate::model::{DanfeFields, LineItem};

/// Height of the three-box identification header.
const HEADER_TOP_H: f32 = 30.0;
/// Height of one labeled field row.
const BOX_ROW_H: f32 = 7.0;
/// Height reserved for a section header label.
const SECTION_HEADER_H: f32 = 5.0;
/// Height of the item table's column header row.
const ITEM_HEADER_H: f32 = 6.0;
/// Height of one item row.
const ITEM_ROW_H: f32 = 4.5;
/// Height of the fixed additional-information footer zone.
const FOOTER_H: f32 = 35.0;
/// Gap between the item table and the footer zone.
const FOOTER_GAP: f32 = 2.0;

/// Item table columns: label, fraction of the content width, alignment.
/// Numeric columns are right-aligned, text columns left.
const ITEM_COLUMNS: [(&str, f32, HAlign); 11] = [
    ("CODIGO", 0.08, HAlign::Left),
    ("DESCRICAO DO PRODUTO / SERVICO", 0.30, HAlign::Left),
    ("NCM/SH", 0.07, HAlign::Center),
    ("CST", 0.05, HAlign::Center),
    ("CFOP", 0.05, HAlign::Center),
    ("UN", 0.05, HAlign::Center),
    ("QUANT", 0.08, HAlign::Right),
    ("VLR UNIT", 0.09, HAlign::Right),
    ("VLR TOTAL", 0.09, HAlign::Right),
    ("BC ICMS", 0.07, HAlign::Right),
    ("VLR ICMS", 0.07, HAlign::Right),
];

/// The finished paged artifact: PDF bytes plus the derived download name.
///
/// Produced once per call and handed to the caller; never cached or
/// reused.
#[derive(Debug, Clone)]
pub struct RenderedDanfe {
    /// Derived download filename, e.g. `DANFE_951354.pdf`.
    pub filename: String,
    /// The serialized PDF.
    pub bytes: Vec<u8>,
    /// Number of pages emitted.
    pub pages: usize,
}

impl RenderedDanfe {
    /// Write the artifact into `dir` under its derived filename.
    pub fn save_to<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        let path = dir.as_ref().join(&self.filename);
        fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Render one DANFE from already-extracted fields.
pub fn render_danfe(fields: &DanfeFields, options: &RenderOptions) -> Result<RenderedDanfe> {
    DanfeRenderer::new(fields, options.clone()).render()
}

/// Single-use renderer: owns the page drawing for one document.
///
/// All state (PDF document, fonts, barcode raster) is created fresh per
/// call, so concurrent renders are fully independent.
pub struct DanfeRenderer<'a> {
    fields: &'a DanfeFields,
    options: RenderOptions,
}

impl<'a> DanfeRenderer<'a> {
    pub fn new(fields: &'a DanfeFields, options: RenderOptions) -> Self {
        Self { fields, options }
    }

    /// Produce the finished multi-section document.
    pub fn render(&self) -> Result<RenderedDanfe> {
        let (doc, page1, layer1) = PdfDocument::new(
            &self.options.title,
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "danfe",
        );
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| Error::Render(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| Error::Render(e.to_string()))?;

        // Barcode failure leaves the region blank; the render continues.
        let barcode = encode_access_key(&self.fields.access_key);

        let batches = self.batch_items();
        let page_total = batches.len();
        for (index, batch) in batches.iter().enumerate() {
            let layer = if index == 0 {
                doc.get_page(page1).get_layer(layer1)
            } else {
                let (page, layer) =
                    doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "danfe");
                doc.get_page(page).get_layer(layer)
            };
            let canvas = Canvas::new(layer, regular.clone(), bold.clone());
            self.draw_page(&canvas, batch, index + 1, page_total, barcode.as_ref());
        }

        let mut bytes = Vec::new();
        {
            let mut writer = BufWriter::new(io::Cursor::new(&mut bytes));
            doc.save(&mut writer)
                .map_err(|e| Error::Render(e.to_string()))?;
        }

        Ok(RenderedDanfe {
            filename: self.fields.filename(),
            bytes,
            pages: page_total,
        })
    }

    /// Vertical offset of the footer zone; everything above it is the
    /// sections plus the item table.
    fn footer_top() -> f32 {
        PAGE_HEIGHT_MM - MARGIN_MM - FOOTER_H
    }

    /// How many item rows fit between the item-table start and the footer.
    /// Every page repeats the full header, so capacity is constant.
    fn page_capacity() -> usize {
        let items_top = Cursor::top()
            .advance(HEADER_TOP_H + 2.0 * BOX_ROW_H) // header
            .advance(SECTION_HEADER_H + 3.0 * BOX_ROW_H) // parties
            .advance(SECTION_HEADER_H + 2.0 * BOX_ROW_H) // totals
            .advance(SECTION_HEADER_H + 2.0 * BOX_ROW_H) // transport
            .y();
        let rows_top = items_top + SECTION_HEADER_H + ITEM_HEADER_H;
        let available = Self::footer_top() - FOOTER_GAP - rows_top;
        (available / ITEM_ROW_H).floor().max(0.0) as usize
    }

    /// Split items into per-page batches according to the overflow policy.
    fn batch_items(&self) -> Vec<&'a [LineItem]> {
        let items = self.fields.items.as_slice();
        let capacity = Self::page_capacity().max(1);
        if items.is_empty() {
            return vec![items];
        }
        match self.options.overflow {
            OverflowPolicy::Truncate => {
                if items.len() > capacity {
                    debug!(
                        "single-page policy: dropping {} of {} item rows",
                        items.len() - capacity,
                        items.len()
                    );
                }
                vec![&items[..items.len().min(capacity)]]
            }
            OverflowPolicy::Paginate => items.chunks(capacity).collect(),
        }
    }

    /// Draw one complete page. The cursor is threaded by value through the
    /// fixed section sequence; no section is ever skipped.
    fn draw_page(
        &self,
        c: &Canvas,
        items: &[LineItem],
        page: usize,
        page_total: usize,
        barcode: Option<&DynamicImage>,
    ) {
        let cur = Cursor::top();
        let cur = self.draw_header(c, cur, page, page_total, barcode);
        let cur = self.draw_parties(c, cur);
        let cur = self.draw_totals(c, cur);
        let cur = self.draw_transport(c, cur);
        self.draw_items(c, cur, items);
        self.draw_footer(c);
    }

    fn draw_header(
        &self,
        c: &Canvas,
        cur: Cursor,
        page: usize,
        page_total: usize,
        barcode: Option<&DynamicImage>,
    ) -> Cursor {
        let f = self.fields;
        let y = cur.y();
        let x0 = MARGIN_MM;
        let issuer_w = CONTENT_WIDTH_MM * 0.40;
        let danfe_w = CONTENT_WIDTH_MM * 0.17;
        let key_w = CONTENT_WIDTH_MM - issuer_w - danfe_w;

        // Issuer identification block.
        c.rect(x0, y, issuer_w, HEADER_TOP_H);
        let name = format::truncate(
            &f.issuer.name,
            format::max_chars(issuer_w - 2.0, 8.0),
        );
        c.text_aligned(&name, 8.0, x0 + 1.0, issuer_w - 2.0, y + 8.0, HAlign::Center, true);
        let addr = &f.issuer.address;
        let lines = [
            addr.street_line(),
            match (addr.district.is_empty(), addr.cep.is_empty()) {
                (false, false) => format!("{} - CEP: {}", addr.district, addr.cep),
                (false, true) => addr.district.clone(),
                (true, false) => format!("CEP: {}", addr.cep),
                (true, true) => String::new(),
            },
            match (addr.city.is_empty(), addr.uf.is_empty()) {
                (false, false) => format!("{} - {}", addr.city, addr.uf),
                (false, true) => addr.city.clone(),
                (true, false) => addr.uf.clone(),
                (true, true) => String::new(),
            },
            if addr.phone.is_empty() {
                String::new()
            } else {
                format!("FONE: {}", addr.phone)
            },
        ];
        let max = format::max_chars(issuer_w - 2.0, 6.0);
        for (i, line) in lines.iter().enumerate() {
            let line = format::truncate(line, max);
            c.text_aligned(
                &line,
                6.0,
                x0 + 1.0,
                issuer_w - 2.0,
                y + 13.0 + i as f32 * 3.6,
                HAlign::Center,
                false,
            );
        }

        // DANFE title block.
        let x1 = x0 + issuer_w;
        c.rect(x1, y, danfe_w, HEADER_TOP_H);
        c.text_aligned("DANFE", 10.0, x1, danfe_w, y + 5.5, HAlign::Center, true);
        let subtitle = format::wrap(
            "DOCUMENTO AUXILIAR DA NOTA FISCAL ELETRONICA",
            format::max_chars(danfe_w - 2.0, 4.5),
        );
        for (i, line) in subtitle.iter().enumerate() {
            c.text_aligned(
                line,
                4.5,
                x1 + 1.0,
                danfe_w - 2.0,
                y + 8.5 + i as f32 * 2.2,
                HAlign::Center,
                false,
            );
        }
        c.text("0 - ENTRADA", 4.5, x1 + 2.0, y + 17.0, false);
        c.text("1 - SAIDA", 4.5, x1 + 2.0, y + 19.2, false);
        c.rect(x1 + danfe_w - 8.0, y + 15.5, 6.0, 5.0);
        c.text_aligned(
            &f.identification.tp_nf,
            7.0,
            x1 + danfe_w - 8.0,
            6.0,
            y + 19.4,
            HAlign::Center,
            true,
        );
        c.text_aligned(
            &format!("No. {}", f.identification.number),
            7.0,
            x1,
            danfe_w,
            y + 23.5,
            HAlign::Center,
            true,
        );
        c.text_aligned(
            &format!(
                "SERIE: {}   FOLHA {}/{}",
                f.identification.series, page, page_total
            ),
            6.0,
            x1,
            danfe_w,
            y + 27.5,
            HAlign::Center,
            false,
        );

        // Access key block: barcode region, grouped key, consultation note.
        let x2 = x1 + danfe_w;
        c.rect(x2, y, key_w, HEADER_TOP_H);
        if let Some(image) = barcode {
            c.image(image, x2 + 4.0, y + 1.5, key_w - 8.0, 12.0);
        }
        c.draw_box(
            x2 + 1.0,
            y + 15.0,
            key_w - 2.0,
            BOX_ROW_H,
            "CHAVE DE ACESSO",
            &format::group_access_key(&f.access_key),
            HAlign::Center,
        );
        c.text_aligned(
            "Consulta de autenticidade no portal nacional da NF-e",
            4.5,
            x2 + 1.0,
            key_w - 2.0,
            y + 25.0,
            HAlign::Center,
            false,
        );
        c.text_aligned(
            "www.nfe.fazenda.gov.br/portal ou no site da Sefaz autorizadora",
            4.5,
            x2 + 1.0,
            key_w - 2.0,
            y + 27.4,
            HAlign::Center,
            false,
        );

        // Nature of operation / authorization protocol row.
        let cur = cur.advance(HEADER_TOP_H);
        let protocol = if f.protocol.is_present() {
            format!(
                "{} - {} {}",
                f.protocol.number,
                format::date(&f.protocol.authorized_at),
                format::time(&f.protocol.authorized_at)
            )
            .trim()
            .to_string()
        } else {
            String::new()
        };
        self.draw_row(
            c,
            cur,
            &[
                ("NATUREZA DA OPERACAO", f.identification.nat_op.clone(), 0.62, HAlign::Left),
                ("PROTOCOLO DE AUTORIZACAO DE USO", protocol, 0.38, HAlign::Center),
            ],
        );

        // Issuer registration row.
        let cur = cur.advance(BOX_ROW_H);
        self.draw_row(
            c,
            cur,
            &[
                ("INSCRICAO ESTADUAL", f.issuer.ie.clone(), 0.34, HAlign::Left),
                ("INSC. ESTADUAL DO SUBST. TRIBUTARIO", String::new(), 0.33, HAlign::Left),
                ("CNPJ", f.issuer.cnpj.clone(), 0.33, HAlign::Left),
            ],
        );
        cur.advance(BOX_ROW_H)
    }

    fn draw_parties(&self, c: &Canvas, cur: Cursor) -> Cursor {
        let f = self.fields;
        c.section_header(cur.y(), "DESTINATARIO / REMETENTE");
        let cur = cur.advance(SECTION_HEADER_H);

        self.draw_row(
            c,
            cur,
            &[
                ("NOME / RAZAO SOCIAL", f.recipient.name.clone(), 0.55, HAlign::Left),
                ("CNPJ / CPF", f.recipient.cnpj.clone(), 0.25, HAlign::Left),
                (
                    "DATA DA EMISSAO",
                    format::date(&f.identification.issued_at),
                    0.20,
                    HAlign::Center,
                ),
            ],
        );
        let cur = cur.advance(BOX_ROW_H);

        let addr = &f.recipient.address;
        self.draw_row(
            c,
            cur,
            &[
                ("ENDERECO", addr.street_line(), 0.45, HAlign::Left),
                ("BAIRRO / DISTRITO", addr.district.clone(), 0.25, HAlign::Left),
                ("CEP", addr.cep.clone(), 0.10, HAlign::Center),
                (
                    "DATA SAIDA / ENTRADA",
                    format::date(&f.identification.exit_at),
                    0.20,
                    HAlign::Center,
                ),
            ],
        );
        let cur = cur.advance(BOX_ROW_H);

        self.draw_row(
            c,
            cur,
            &[
                ("MUNICIPIO", addr.city.clone(), 0.35, HAlign::Left),
                ("FONE / FAX", addr.phone.clone(), 0.15, HAlign::Left),
                ("UF", addr.uf.clone(), 0.05, HAlign::Center),
                ("INSCRICAO ESTADUAL", f.recipient.ie.clone(), 0.25, HAlign::Left),
                (
                    "HORA DE SAIDA",
                    format::time(&f.identification.exit_at),
                    0.20,
                    HAlign::Center,
                ),
            ],
        );
        cur.advance(BOX_ROW_H)
    }

    fn draw_totals(&self, c: &Canvas, cur: Cursor) -> Cursor {
        let t = &self.fields.totals;
        c.section_header(cur.y(), "CALCULO DO IMPOSTO");
        let cur = cur.advance(SECTION_HEADER_H);

        self.draw_row(
            c,
            cur,
            &[
                ("BASE DE CALCULO DO ICMS", format::money(&t.v_bc), 0.20, HAlign::Right),
                ("VALOR DO ICMS", format::money(&t.v_icms), 0.20, HAlign::Right),
                ("BASE DE CALCULO DO ICMS ST", format::money(&t.v_bc_st), 0.20, HAlign::Right),
                ("VALOR DO ICMS ST", format::money(&t.v_st), 0.20, HAlign::Right),
                ("VALOR TOTAL DOS PRODUTOS", format::money(&t.v_prod), 0.20, HAlign::Right),
            ],
        );
        let cur = cur.advance(BOX_ROW_H);

        self.draw_row(
            c,
            cur,
            &[
                ("VALOR DO FRETE", format::money(&t.v_frete), 0.17, HAlign::Right),
                ("VALOR DO SEGURO", format::money(&t.v_seg), 0.17, HAlign::Right),
                ("DESCONTO", format::money(&t.v_desc), 0.16, HAlign::Right),
                ("OUTRAS DESPESAS", format::money(&t.v_outro), 0.17, HAlign::Right),
                ("VALOR DO IPI", format::money(&t.v_ipi), 0.16, HAlign::Right),
                ("VALOR TOTAL DA NOTA", format::money(&t.v_nf), 0.17, HAlign::Right),
            ],
        );
        cur.advance(BOX_ROW_H)
    }

    fn draw_transport(&self, c: &Canvas, cur: Cursor) -> Cursor {
        let t = &self.fields.transport;
        c.section_header(cur.y(), "TRANSPORTADOR / VOLUMES TRANSPORTADOS");
        let cur = cur.advance(SECTION_HEADER_H);

        self.draw_row(
            c,
            cur,
            &[
                ("RAZAO SOCIAL", t.name.clone(), 0.45, HAlign::Left),
                ("FRETE POR CONTA", t.freight_label(), 0.20, HAlign::Center),
                ("CNPJ / CPF", t.cnpj.clone(), 0.35, HAlign::Left),
            ],
        );
        let cur = cur.advance(BOX_ROW_H);

        self.draw_row(
            c,
            cur,
            &[
                ("ENDERECO", t.address.clone(), 0.35, HAlign::Left),
                ("MUNICIPIO", t.city.clone(), 0.20, HAlign::Left),
                ("UF", t.uf.clone(), 0.05, HAlign::Center),
                ("INSCRICAO ESTADUAL", t.ie.clone(), 0.12, HAlign::Left),
                ("QTDE", t.volume_qty.clone(), 0.07, HAlign::Right),
                ("ESPECIE", t.volume_kind.clone(), 0.07, HAlign::Left),
                ("PESO LIQUIDO", format::quantity(&t.net_weight), 0.07, HAlign::Right),
                ("PESO BRUTO", format::quantity(&t.gross_weight), 0.07, HAlign::Right),
            ],
        );
        cur.advance(BOX_ROW_H)
    }

    /// Item grid: one fixed header row, then one row per item. The table
    /// frame always extends to the footer zone so short documents keep the
    /// full-form look.
    fn draw_items(&self, c: &Canvas, cur: Cursor, items: &[LineItem]) {
        c.section_header(cur.y(), "DADOS DOS PRODUTOS / SERVICOS");
        let table_top = cur.advance(SECTION_HEADER_H).y();
        let table_bottom = Self::footer_top() - FOOTER_GAP;

        c.rect(MARGIN_MM, table_top, CONTENT_WIDTH_MM, table_bottom - table_top);
        c.hline(MARGIN_MM, MARGIN_MM + CONTENT_WIDTH_MM, table_top + ITEM_HEADER_H);

        // Column separators and header labels.
        let mut x = MARGIN_MM;
        for (label, fraction, _) in ITEM_COLUMNS {
            let w = CONTENT_WIDTH_MM * fraction;
            if x > MARGIN_MM {
                c.vline(x, table_top, table_bottom);
            }
            let label = format::truncate(label, format::max_chars(w - 1.0, 4.5));
            c.text_aligned(
                &label,
                4.5,
                x + 0.5,
                w - 1.0,
                table_top + 3.8,
                HAlign::Center,
                true,
            );
            x += w;
        }

        for (row, item) in items.iter().enumerate() {
            let baseline = table_top + ITEM_HEADER_H + (row as f32 + 1.0) * ITEM_ROW_H - 1.2;
            let cells = [
                item.code.clone(),
                item.description.clone(),
                item.ncm.clone(),
                item.icms.cst.clone(),
                item.cfop.clone(),
                item.unit.clone(),
                format::quantity(&item.quantity),
                format::money(&item.unit_value),
                format::money(&item.total_value),
                format::money(&item.icms.v_bc),
                format::money(&item.icms.v_icms),
            ];
            let mut x = MARGIN_MM;
            for ((_, fraction, align), value) in ITEM_COLUMNS.iter().zip(cells.iter()) {
                let w = CONTENT_WIDTH_MM * fraction;
                let value = format::truncate(value, format::max_chars(w - 1.0, 5.0));
                c.text_aligned(&value, 5.0, x + 0.5, w - 1.0, baseline, *align, false);
                x += w;
            }
        }
    }

    /// Fixed-position additional-information footer. Free text wraps into
    /// the box; content beyond the box height is clipped.
    fn draw_footer(&self, c: &Canvas) {
        let a = &self.fields.additional;
        let y = Self::footer_top();
        c.section_header(y, "DADOS ADICIONAIS");
        let box_top = y + SECTION_HEADER_H;
        let box_h = FOOTER_H - SECTION_HEADER_H;
        let info_w = CONTENT_WIDTH_MM * 0.65;
        let fisco_w = CONTENT_WIDTH_MM - info_w;

        c.rect(MARGIN_MM, box_top, info_w, box_h);
        c.text(
            "INFORMACOES COMPLEMENTARES",
            4.5,
            MARGIN_MM + 0.8,
            box_top + 2.4,
            false,
        );
        let text = match (a.fiscal.is_empty(), a.complementary.is_empty()) {
            (false, false) => format!("{} {}", a.fiscal, a.complementary),
            (false, true) => a.fiscal.clone(),
            (true, false) => a.complementary.clone(),
            (true, true) => String::new(),
        };
        let line_h = 2.4;
        let max_lines = ((box_h - 4.5) / line_h).floor() as usize;
        let lines = format::wrap(&text, format::max_chars(info_w - 1.6, 5.0));
        for (i, line) in lines.iter().take(max_lines).enumerate() {
            c.text(line, 5.0, MARGIN_MM + 0.8, box_top + 5.2 + i as f32 * line_h, false);
        }

        c.rect(MARGIN_MM + info_w, box_top, fisco_w, box_h);
        c.text(
            "RESERVADO AO FISCO",
            4.5,
            MARGIN_MM + info_w + 0.8,
            box_top + 2.4,
            false,
        );
    }

    /// Draw one row of labeled boxes spanning the content width. Fractions
    /// are proportions of the usable width and should sum to 1.
    fn draw_row(&self, c: &Canvas, cur: Cursor, boxes: &[(&str, String, f32, HAlign)]) {
        let mut x = MARGIN_MM;
        for (label, value, fraction, align) in boxes {
            let w = CONTENT_WIDTH_MM * fraction;
            c.draw_box(x, cur.y(), w, BOX_ROW_H, label, value, *align);
            x += w;
        }
    }
}
