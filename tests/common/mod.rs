// Fixtures compartidas: arma un XLSX mínimo en memoria.
#![allow(dead_code)]

use std::io::{Cursor, Write};

use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

/// Una hoja: nombre y filas absolutas desde la fila 0. `""` = celda ausente.
pub type HojaFixture<'a> = (&'a str, Vec<Vec<&'a str>>);

fn col_letra(mut j: usize) -> String {
    let mut s = Vec::new();
    loop {
        s.push(b'A' + (j % 26) as u8);
        if j < 26 {
            break;
        }
        j = j / 26 - 1;
    }
    s.reverse();
    String::from_utf8(s).unwrap()
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn hoja_xml(filas: &[Vec<&str>]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (i, fila) in filas.iter().enumerate() {
        if fila.iter().all(|c| c.is_empty()) {
            continue;
        }
        xml.push_str(&format!(r#"<row r="{}">"#, i + 1));
        for (j, celda) in fila.iter().enumerate() {
            if celda.is_empty() {
                continue;
            }
            let r = format!("{}{}", col_letra(j), i + 1);
            if celda.parse::<f64>().is_ok() {
                xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, r, celda));
            } else {
                xml.push_str(&format!(r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#, r, escape(celda)));
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

/// Bytes de un XLSX con las hojas dadas, en orden.
pub fn xlsx(hojas: &[HojaFixture]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut tipos = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    );
    let mut sheets = String::new();
    let mut rels = String::new();
    for (i, (nombre, _)) in hojas.iter().enumerate() {
        let n = i + 1;
        tipos.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            n
        ));
        sheets.push_str(&format!(r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#, escape(nombre), n, n));
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            n, n
        ));
    }
    tipos.push_str("</Types>");

    let archivos: Vec<(String, String)> = [
        ("[Content_Types].xml".to_string(), tipos),
        (
            "_rels/.rels".to_string(),
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#.to_string(),
        ),
        (
            "xl/workbook.xml".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>{}</sheets></workbook>"#,
                sheets
            ),
        ),
        (
            "xl/_rels/workbook.xml.rels".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
                rels
            ),
        ),
    ]
    .into_iter()
    .chain(
        hojas
            .iter()
            .enumerate()
            .map(|(i, (_, filas))| (format!("xl/worksheets/sheet{}.xml", i + 1), hoja_xml(filas))),
    )
    .collect();

    for (ruta, contenido) in archivos {
        zip.start_file(ruta, opts).unwrap();
        zip.write_all(contenido.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// Planilla de ejemplo: dos abas con nombres de columna distintos para los
/// mismos campos y una aba vacía. Encabezado en la fila 2.
pub fn planilha_entregas() -> Vec<u8> {
    xlsx(&[
        (
            "2024",
            vec![
                vec!["CONTROLE DE ENTREGAS"],
                vec![],
                vec!["UNIDADE DE DESTINO", "QUANTIDADE ENTREGUE NA UNIDADE", "VALOR TOTAL", "N° DA OF"],
                vec!["A", "10", "1000", "OF-1"],
                vec!["B", "5", "500", "OF-2"],
                vec![],
            ],
        ),
        (
            "2025",
            vec![
                vec!["CONTROLE DE ENTREGAS 2025"],
                vec![],
                vec!["UNIDADES DE DESTINO", "QTD ENTREGUE NA UNIDADE", "VALOR TOTAL", "Nº OF"],
                vec!["A", "3", "300", "OF-9"],
            ],
        ),
        ("Rascunho", vec![]),
    ])
}

/// Escribe la planilla en un archivo temporal `.xlsx`.
pub fn planilha_en_disco(bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut f = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
    f.write_all(bytes).unwrap();
    f.flush().unwrap();
    f
}
