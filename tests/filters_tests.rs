mod common;

use entregas::algorithm::filters::{aplicar_filtros, OPCAO_NENHUM, OPCAO_TODOS};
use entregas::algorithm::grafico::{agregar, Grafico};
use entregas::algorithm::{ejecutar_consulta, ordenar_colunas, CadeiaFiltros, EtapaFiltro};
use entregas::excel::export::{exportar_csv, leer_csv};
use entregas::excel::fusion::SelecaoAbas;
use entregas::excel::{parse_workbook, Carga};
use entregas::models::Tabla;

fn carga() -> Carga {
    Carga::new(parse_workbook(common::planilha_entregas(), 2).expect("fixture"))
}

fn cadeia(pasos: &[(&str, Option<&str>)]) -> CadeiaFiltros {
    CadeiaFiltros::desde_selecoes(pasos.iter().map(|(c, v)| EtapaFiltro::new(*c, *v)).collect())
}

#[test]
fn test_filtro_por_destino_en_una_aba() {
    let c = carga();
    let r = ejecutar_consulta(
        &c,
        &SelecaoAbas(vec!["2024".into()]),
        &cadeia(&[("UNIDADE DE DESTINO", Some("A"))]),
    )
    .unwrap();

    assert_eq!(r.abas, vec!["2024"]);
    let t = &r.filtro.tabla;
    assert_eq!(t.len(), 1);
    assert_eq!(t.cell(0, "QUANTIDADE ENTREGUE NA UNIDADE"), Some("10"));
    assert_eq!(r.filtro.etapas[0].valores_disponiveis, vec!["A", "B"]);
}

#[test]
fn test_campos_canonicos_unifican_abas() {
    let c = carga();
    let r = ejecutar_consulta(&c, &SelecaoAbas::todas(), &cadeia(&[("UNIDADE DE DESTINO", Some("A"))])).unwrap();
    let t = &r.filtro.tabla;
    assert_eq!(t.len(), 2);

    let abas: Vec<Option<&str>> = t.column_values("ABA");
    assert_eq!(abas, vec![Some("2024"), Some("2025")]);
    // la fila de 2025 recibió los valores copiados desde sus columnas reales
    assert_eq!(t.cell(1, "QUANTIDADE ENTREGUE NA UNIDADE"), Some("3"));
    assert_eq!(t.cell(1, "N° DA OF"), Some("OF-9"));
    // las columnas originales siguen ahí
    assert_eq!(t.cell(1, "QTD ENTREGUE NA UNIDADE"), Some("3"));
}

#[test]
fn test_abas_desconocidas_usan_todas() {
    let c = carga();
    let r = ejecutar_consulta(&c, &SelecaoAbas(vec!["1999".into()]), &CadeiaFiltros::new()).unwrap();
    assert_eq!(r.abas, vec!["2024", "2025"]);
    assert_eq!(r.filtro.tabla.len(), 3);
}

#[test]
fn test_todos_y_nenhum() {
    let c = carga();
    let r = ejecutar_consulta(
        &c,
        &SelecaoAbas::default(),
        &cadeia(&[
            ("UNIDADE DE DESTINO", Some(OPCAO_TODOS)),
            (OPCAO_NENHUM, None),
            ("N° DA OF", Some("OF-2")),
        ]),
    )
    .unwrap();
    // (Todos) no restringe y (Nenhum) corta la cadena antes del 3º filtro
    assert_eq!(r.filtro.tabla.len(), 3);
    assert!(r.filtro.etapas[2].coluna.is_none());
}

#[test]
fn test_etapas_no_repiten_columnas() {
    let c = carga();
    let r = ejecutar_consulta(
        &c,
        &SelecaoAbas::todas(),
        &cadeia(&[("UNIDADE DE DESTINO", Some("A")), ("N° DA OF", None)]),
    )
    .unwrap();
    let e = &r.filtro.etapas;
    assert!(!e[1].colunas_disponiveis.contains(&"UNIDADE DE DESTINO".to_string()));
    assert!(!e[2].colunas_disponiveis.contains(&"N° DA OF".to_string()));
    assert!(!e[2].colunas_disponiveis.contains(&"UNIDADE DE DESTINO".to_string()));
    // los valores del 2º paso salen de la tabla ya filtrada por el 1º
    assert_eq!(e[1].valores_disponiveis, vec!["OF-1", "OF-9"]);
}

#[test]
fn test_limpar_vuelve_al_estado_inicial() {
    let c = carga();
    let mut cadeia = cadeia(&[("UNIDADE DE DESTINO", Some("B")), ("N° DA OF", Some("OF-2"))]);
    let filtrada = ejecutar_consulta(&c, &SelecaoAbas::todas(), &cadeia).unwrap();
    assert_eq!(filtrada.filtro.tabla.len(), 1);

    cadeia.limpar();
    assert_eq!(cadeia, CadeiaFiltros::default());
    let r = ejecutar_consulta(&c, &SelecaoAbas::todas(), &cadeia).unwrap();
    assert_eq!(r.filtro.tabla.len(), 3);
    assert!(r.filtro.etapas.iter().all(|e| e.valor.is_none()));
}

#[test]
fn test_sin_columnas_de_filtro_devuelve_aviso() {
    let t = Tabla::from_str_rows(&["FORNECEDOR"], &[&["ACME"]]);
    let r = aplicar_filtros(&t, &CadeiaFiltros::new()).unwrap();
    assert!(r.aviso.is_some());
    assert_eq!(r.tabla, t);
    assert!(r.etapas.is_empty());
}

#[test]
fn test_grid_y_export() {
    let c = carga();
    let r = ejecutar_consulta(&c, &SelecaoAbas::todas(), &CadeiaFiltros::new()).unwrap();
    let t = &r.filtro.tabla;

    let cols = ordenar_colunas(t);
    assert_eq!(&cols[..3], &["DESCRIÇÃO DO ITEM RESUMIDA", "UNIDADES DE DESTINO", "UNIDADE DE DESTINO"]);
    assert!(!cols.contains(&"ABA".to_string()));

    let csv = exportar_csv(t).unwrap();
    let leida = leer_csv(&csv).unwrap();
    assert_eq!(&leida, t);
}

#[test]
fn test_grafico_sobre_tabla_filtrada() {
    let c = carga();
    let r = ejecutar_consulta(&c, &SelecaoAbas::todas(), &CadeiaFiltros::new()).unwrap();
    let Grafico::Dados(d) = agregar(&r.filtro.tabla) else {
        panic!("se esperaban datos del gráfico");
    };
    assert_eq!(d.coluna_destino, "UNIDADE DE DESTINO");
    let a = &d.filas[0];
    assert_eq!(a.destino.as_deref(), Some("A"));
    assert_eq!(a.valor_total, 1300.0);
    assert_eq!(a.quantidade, 13.0);
    assert_eq!(a.rotulo_valor, "R$ 1.300,00");
}

#[test]
fn test_valor_vacio_no_restringe() {
    let c = carga();
    let cadeia = cadeia(&[("UNIDADE DE DESTINO", Some("")), ("N° DA OF", Some("  "))]);
    assert!(cadeia.etapas.iter().all(|e| e.valor.is_none()));

    let r = ejecutar_consulta(&c, &SelecaoAbas::todas(), &cadeia).unwrap();
    assert_eq!(r.filtro.tabla.len(), 3);
}
