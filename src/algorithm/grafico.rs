//! Gráfico de barras agrupadas por UNIDADE(S) DE DESTINO.
//!
//! Dos métricas por destino: VALOR TOTAL y QUANTIDADE ENTREGUE NA UNIDADE.
//! Las columnas se buscan con `find_col`; si falta alguna el gráfico se
//! omite con un mensaje y el resto de la respuesta sigue igual.

use std::collections::BTreeMap;

use plotters::prelude::*;
use serde::Serialize;

use crate::error::ChartError;
use crate::excel::mapeo::find_col;
use crate::models::Tabla;

pub const ALVOS_DESTINO: &[&str] = &["UNIDADE DE DESTINO", "UNIDADES DE DESTINO"];

pub const ALVOS_VALOR: &[&str] = &[
    "VALOR TOTAL", "VALOR", "VALOR TOTAL (R$)", "TOTAL (R$)", "VALOR PREVISTO",
    "VALOR DA OF", "VALOR GLOBAL",
];

pub const ALVOS_QUANTIDADE: &[&str] = &[
    "QUANTIDADE ENTREGUE NA UNIDADE", "QTD ENTREGUE NA UNIDADE", "QUANT. ENTREGUE NA UNIDADE",
    "QUANT ENTREGUE NA UNIDADE", "QUANT", "QTD",
];

const AZUL: RGBColor = RGBColor(0x2E, 0x86, 0xDE);
const VERMELHO: RGBColor = RGBColor(0xE7, 0x4C, 0x3C);

/// Una barra doble del gráfico. `destino = None` agrupa las celdas vacías.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilaGrafico {
    pub destino: Option<String>,
    pub valor_total: f64,
    pub quantidade: f64,
    pub rotulo_valor: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DadosGrafico {
    pub coluna_destino: String,
    pub coluna_valor: String,
    pub coluna_quantidade: String,
    pub filas: Vec<FilaGrafico>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tipo", rename_all = "snake_case")]
pub enum Grafico {
    Dados(DadosGrafico),
    /// No hay columna de destino: mensaje informativo.
    SemDestino { info: String },
    /// Falta valor y/o cantidad.
    ColunasFaltantes { warning: String, faltantes: Vec<String> },
}

/// Convierte texto en número al estilo brasileño ("R$ 1.234,56" → 1234.56).
/// Cualquier cosa no interpretable vale 0.
pub fn to_number(v: Option<&str>) -> f64 {
    let Some(v) = v else { return 0.0 };
    let x = v
        .trim()
        .replace("R$", "")
        .replace(' ', "")
        .replace('.', "")
        .replace(',', ".");
    match x.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => 0.0,
    }
}

/// "R$ 1.234,56"
pub fn formatar_brl(v: f64) -> String {
    let fixed = format!("{:.2}", v.abs());
    let (inteiro, dec) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut agrupado = String::new();
    for (i, ch) in inteiro.chars().enumerate() {
        if i > 0 && (inteiro.len() - i) % 3 == 0 {
            agrupado.push('.');
        }
        agrupado.push(ch);
    }
    let sinal = if v < 0.0 { "-" } else { "" };
    format!("R$ {}{},{}", sinal, agrupado, dec)
}

/// Agrupa por destino y suma ambas métricas, ordenado por valor desc.
pub fn agregar(tabla: &Tabla) -> Grafico {
    let Some(dest) = find_col(&tabla.columnas, ALVOS_DESTINO) else {
        return Grafico::SemDestino {
            info: "Não encontrei a coluna 'UNIDADE(S) DE DESTINO' para montar o gráfico.".to_string(),
        };
    };
    let col_valor = find_col(&tabla.columnas, ALVOS_VALOR);
    let col_unid = find_col(&tabla.columnas, ALVOS_QUANTIDADE);

    let (col_valor, col_unid) = match (col_valor, col_unid) {
        (Some(v), Some(u)) => (v, u),
        (v, u) => {
            let mut faltantes = Vec::new();
            if v.is_none() {
                faltantes.push("VALOR TOTAL".to_string());
            }
            if u.is_none() {
                faltantes.push("QUANTIDADE ENTREGUE NA UNIDADE".to_string());
            }
            return Grafico::ColunasFaltantes {
                warning: format!("Não encontrei as colunas: {}", faltantes.join(", ")),
                faltantes,
            };
        }
    };

    let destinos = tabla.column_values(&dest);
    let valores = tabla.column_values(&col_valor);
    let quantidades = tabla.column_values(&col_unid);

    // BTreeMap ordena None primero; se reordena después por valor
    let mut grupos: BTreeMap<Option<&str>, (f64, f64)> = BTreeMap::new();
    for i in 0..tabla.len() {
        let acc = grupos.entry(destinos[i]).or_insert((0.0, 0.0));
        acc.0 += to_number(valores[i]);
        acc.1 += to_number(quantidades[i]);
    }

    // el grupo sin destino va al final
    let mut filas: Vec<FilaGrafico> = grupos
        .iter()
        .filter(|(k, _)| k.is_some())
        .chain(grupos.iter().filter(|(k, _)| k.is_none()))
        .map(|(k, (v, q))| FilaGrafico {
            destino: k.map(str::to_string),
            valor_total: *v,
            quantidade: *q,
            rotulo_valor: formatar_brl(*v),
        })
        .collect();
    filas.sort_by(|a, b| b.valor_total.total_cmp(&a.valor_total));

    Grafico::Dados(DadosGrafico {
        coluna_destino: dest,
        coluna_valor: col_valor,
        coluna_quantidade: col_unid,
        filas,
    })
}

fn render_err<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Render(e.to_string())
}

/// Dibuja las barras agrupadas como SVG.
pub fn render_svg(dados: &DadosGrafico) -> Result<String, ChartError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (1200, 560)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let n = dados.filas.len().max(1);
        let max_y = dados
            .filas
            .iter()
            .map(|f| f.valor_total.max(f.quantidade))
            .fold(0.0_f64, f64::max);
        let topo = if max_y > 0.0 { max_y * 1.15 } else { 1.0 };

        let nombres: Vec<String> = dados
            .filas
            .iter()
            .map(|f| f.destino.clone().unwrap_or_else(|| "(vazio)".to_string()))
            .collect();
        let rotulo_x = |x: &f64| -> String {
            let r = x.round();
            if (x - r).abs() > 0.01 || r < 0.0 {
                return String::new();
            }
            nombres.get(r as usize).cloned().unwrap_or_default()
        };

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("Entregas por {} - VALOR e QUANTIDADES", dados.coluna_destino),
                ("sans-serif", 22),
            )
            .margin(10)
            .x_label_area_size(60)
            .y_label_area_size(90)
            .build_cartesian_2d(-0.5_f64..(n as f64 - 0.5), 0.0_f64..topo)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&rotulo_x)
            .x_desc(dados.coluna_destino.as_str())
            .y_desc("Valores / Quantidades")
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(dados.filas.iter().enumerate().map(|(i, f)| {
                let x = i as f64;
                Rectangle::new([(x - 0.4, 0.0), (x, f.valor_total)], AZUL.filled())
            }))
            .map_err(render_err)?
            .label("VALOR TOTAL")
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], AZUL.filled()));

        chart
            .draw_series(dados.filas.iter().enumerate().map(|(i, f)| {
                let x = i as f64;
                Rectangle::new([(x, 0.0), (x + 0.4, f.quantidade)], VERMELHO.filled())
            }))
            .map_err(render_err)?
            .label("QUANTIDADE ENTREGUE NA UNIDADE")
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], VERMELHO.filled()));

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
    }
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_number() {
        assert_eq!(to_number(Some("R$ 1.234,56")), 1234.56);
        assert_eq!(to_number(Some(" 10 ")), 10.0);
        assert_eq!(to_number(Some("abc")), 0.0);
        assert_eq!(to_number(None), 0.0);
    }

    #[test]
    fn test_formatar_brl() {
        assert_eq!(formatar_brl(1234.56), "R$ 1.234,56");
        assert_eq!(formatar_brl(0.0), "R$ 0,00");
        assert_eq!(formatar_brl(1_000_000.0), "R$ 1.000.000,00");
    }

    #[test]
    fn agrega_y_ordena_por_valor() {
        let t = Tabla::from_str_rows(
            &["UNIDADE DE DESTINO", "VALOR TOTAL", "QUANTIDADE ENTREGUE NA UNIDADE"],
            &[
                &["A", "100,00", "1"],
                &["B", "1.000,00", "2"],
                &["A", "50", "x"],
                &["", "5", "1"],
            ],
        );
        let Grafico::Dados(d) = agregar(&t) else { panic!("esperaba datos") };
        let destinos: Vec<Option<&str>> = d.filas.iter().map(|f| f.destino.as_deref()).collect();
        assert_eq!(destinos, vec![Some("B"), Some("A"), None]);
        assert_eq!(d.filas[1].valor_total, 150.0);
        assert_eq!(d.filas[1].quantidade, 1.0);
    }

    #[test]
    fn sin_columnas_se_omite() {
        let t = Tabla::from_str_rows(&["FORNECEDOR"], &[&["ACME"]]);
        assert!(matches!(agregar(&t), Grafico::SemDestino { .. }));

        let t = Tabla::from_str_rows(&["UNIDADE DE DESTINO", "QTD"], &[&["A", "1"]]);
        match agregar(&t) {
            Grafico::ColunasFaltantes { faltantes, .. } => assert_eq!(faltantes, vec!["VALOR TOTAL"]),
            other => panic!("inesperado: {:?}", other),
        }
    }

    #[test]
    fn svg_generado() {
        let t = Tabla::from_str_rows(
            &["UNIDADE DE DESTINO", "VALOR", "QTD"],
            &[&["A", "10", "1"], &["B", "5", "2"]],
        );
        let Grafico::Dados(d) = agregar(&t) else { panic!("esperaba datos") };
        let svg = render_svg(&d).unwrap();
        assert!(svg.contains("<svg"));
    }
}
