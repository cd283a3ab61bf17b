// Header matching for the CSV inputs. The rosters come from hand-maintained
// spreadsheets, so the headers carry accents, spacing and casing that vary
// from one export to the next.

/// Reduces a header to its canonical form: accents folded, everything but
/// ASCII letters and digits dropped, lowercased.
///
/// `"Faixa Etária"`, `"faixa_etaria"` and `"FAIXA ETARIA"` all reduce to
/// `"faixaetaria"`.
pub fn canonical_header(raw: &str) -> String {
    raw.chars()
        .map(fold_accent)
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' | 'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' | 'Ú' | 'Ù' | 'Û' | 'Ü' => 'u',
        'ç' | 'Ç' => 'c',
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::canonical_header;

    #[test]
    fn folds_accents_case_and_punctuation() {
        assert_eq!(canonical_header("Faixa Etária"), "faixaetaria");
        assert_eq!(canonical_header("faixa_etaria"), "faixaetaria");
        assert_eq!(canonical_header("FAIXA ETARIA"), "faixaetaria");
        assert_eq!(canonical_header("Município"), "municipio");
        assert_eq!(canonical_header("Endereço"), "endereco");
        assert_eq!(canonical_header("Quantidade CIPTEA"), "quantidadeciptea");
        assert_eq!(canonical_header(" nome "), "nome");
    }

    #[test]
    fn distinct_headers_stay_distinct() {
        assert_ne!(canonical_header("tipo"), canonical_header("tipo_deficiencia"));
        assert_ne!(canonical_header("faixa"), canonical_header("faixa_etaria"));
    }
}
