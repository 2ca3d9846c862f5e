use calamine::Data;
use unicode_normalization::UnicodeNormalization;

/// Convierte un `Data` de calamine a texto. Celdas vacías o con error → `None`.
///
/// Todo se trata como texto: los floats enteros se escriben sin decimales
/// (10.0 → "10") para que coincidan con lo que el usuario ve en la planilla.
pub fn cell_to_text(c: &Data) -> Option<String> {
    let s = match c {
        Data::String(s) => s.clone(),
        Data::Float(f) => {
            if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                format!("{}", f)
            }
        }
        Data::Int(i) => format!("{}", i),
        Data::Bool(b) => if *b { "True".to_string() } else { "False".to_string() },
        Data::Empty => return None,
        Data::Error(_) => return None,
        Data::DateTime(s) => s.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    };
    if s.is_empty() { None } else { Some(s) }
}

/// Normaliza un nombre para matching robusto: sin espacios en los extremos,
/// minúsculas y sin acentos ("Descrição" == "descricao").
///
/// Los caracteres que no tienen descomposición ASCII se descartan
/// ("n° da of" → "n da of"). Es idempotente.
pub fn normalize_name(s: &str) -> String {
    let ascii: String = s
        .trim()
        .nfkd()
        .filter(|c| c.is_ascii())
        .collect();
    ascii.to_ascii_lowercase().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name_acentos() {
        assert_eq!(normalize_name("  Descrição do Item "), "descricao do item");
        assert_eq!(normalize_name("Nº DA OF"), "no da of");
        assert_eq!(normalize_name("N° DA OF"), "n da of");
    }

    #[test]
    fn test_normalize_name_idempotente() {
        for s in ["UNIDADES DE DESTINO", "a\u{a8}", "QUANT. ENTREGUE", " ℌola ", "Previsão"] {
            let once = normalize_name(s);
            assert_eq!(normalize_name(&once), once, "no idempotente para {:?}", s);
        }
    }

    #[test]
    fn test_cell_to_text() {
        assert_eq!(cell_to_text(&Data::Float(10.0)), Some("10".to_string()));
        assert_eq!(cell_to_text(&Data::Float(2.5)), Some("2.5".to_string()));
        assert_eq!(cell_to_text(&Data::Int(7)), Some("7".to_string()));
        assert_eq!(cell_to_text(&Data::Empty), None);
        assert_eq!(cell_to_text(&Data::String(String::new())), None);
        assert_eq!(cell_to_text(&Data::Bool(true)), Some("True".to_string()));
    }
}
