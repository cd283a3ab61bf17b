// Primitives for reading the CSV files of the panel.

use std::fs::File;

use csv::Reader;

use crate::panel::{io_common::canonical_header, *};

// Engine fields a roster header may resolve to.
const INSTITUTION_FIELDS: &[&str] = &[
    FIELD_MUNICIPALITY,
    FIELD_NAME,
    FIELD_REGION,
    FIELD_KIND,
    FIELD_ADDRESS,
    FIELD_PHONE,
    FIELD_EMAIL,
    FIELD_CIPTEA,
    FIELD_CIPF,
    FIELD_PASSE_LIVRE,
];

const DEMOGRAPHIC_FIELDS: &[&str] = &[
    FIELD_BRACKET,
    FIELD_BRACKET_ALT,
    FIELD_CATEGORY,
    FIELD_QUANTITY,
    FIELD_MUNICIPALITY,
];

pub fn read_institution_rows(path: &String, cfs: &FileSource) -> BPanelResult<Vec<RawRow>> {
    let mut reader = open_reader(path, cfs)?;
    institution_rows_from_reader(&mut reader, path)
}

pub fn read_demographic_rows(path: &String, cfs: &FileSource) -> BPanelResult<Vec<RawRow>> {
    let mut reader = open_reader(path, cfs)?;
    demographic_rows_from_reader(&mut reader, cfs, path)
}

pub fn institution_rows_from_reader<R: std::io::Read>(
    reader: &mut Reader<R>,
    path: &String,
) -> BPanelResult<Vec<RawRow>> {
    let keys = header_keys(reader, INSTITUTION_FIELDS)?;
    require_column(&keys, FIELD_MUNICIPALITY, path)?;
    collect_rows(reader, &keys)
}

pub fn demographic_rows_from_reader<R: std::io::Read>(
    reader: &mut Reader<R>,
    cfs: &FileSource,
    path: &String,
) -> BPanelResult<Vec<RawRow>> {
    let mut keys = header_keys(reader, DEMOGRAPHIC_FIELDS)?;
    apply_override(&mut keys, &cfs.bracket_column, FIELD_BRACKET, path)?;
    apply_override(&mut keys, &cfs.category_column, FIELD_CATEGORY, path)?;
    apply_override(&mut keys, &cfs.quantity_column, FIELD_QUANTITY, path)?;
    let has_bracket = keys
        .iter()
        .any(|key| key == FIELD_BRACKET || key == FIELD_BRACKET_ALT);
    if !has_bracket {
        return Err(Box::new(PanelError::MissingColumn {
            name: FIELD_BRACKET.to_string(),
            path: path.clone(),
        }));
    }
    require_column(&keys, FIELD_QUANTITY, path)?;
    collect_rows(reader, &keys)
}

fn open_reader(path: &String, cfs: &FileSource) -> BPanelResult<Reader<File>> {
    let delimiter = cfs.delimiter_byte()?;
    let reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .context(OpeningCsvSnafu { path: path.clone() })?;
    Ok(reader)
}

// Maps every header to an engine field when its canonical form matches one,
// and to the trimmed header itself otherwise.
fn header_keys<R: std::io::Read>(
    reader: &mut Reader<R>,
    known: &[&str],
) -> BPanelResult<Vec<String>> {
    let headers = reader
        .headers()
        .context(CsvLineParseSnafu { lineno: 1usize })?;
    let keys = headers
        .iter()
        .map(|raw| {
            let canonical = canonical_header(raw);
            known
                .iter()
                .copied()
                .find(|field| canonical_header(field) == canonical)
                .map(|field| field.to_string())
                .unwrap_or_else(|| raw.trim().to_string())
        })
        .collect();
    Ok(keys)
}

fn require_column(keys: &[String], name: &str, path: &String) -> BPanelResult<()> {
    if keys.iter().any(|key| key == name) {
        Ok(())
    } else {
        Err(Box::new(PanelError::MissingColumn {
            name: name.to_string(),
            path: path.clone(),
        }))
    }
}

fn apply_override(
    keys: &mut [String],
    header: &Option<String>,
    target: &str,
    path: &String,
) -> BPanelResult<()> {
    let name = match header {
        Some(name) => name,
        None => return Ok(()),
    };
    let canonical = canonical_header(name);
    match keys
        .iter()
        .position(|key| canonical_header(key) == canonical)
    {
        Some(idx) => {
            keys[idx] = target.to_string();
            Ok(())
        }
        None => Err(Box::new(PanelError::MissingColumn {
            name: name.clone(),
            path: path.clone(),
        })),
    }
}

fn collect_rows<R: std::io::Read>(
    reader: &mut Reader<R>,
    keys: &[String],
) -> BPanelResult<Vec<RawRow>> {
    let mut res: Vec<RawRow> = Vec::new();
    for (idx, line_r) in reader.records().enumerate() {
        // Records start on line 2, below the header row.
        let lineno = idx + 2;
        debug!("{:?} {:?}", lineno, line_r);
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        let mut row = RawRow::new();
        for (key, value) in keys.iter().zip(line.iter()) {
            if key.is_empty() {
                continue;
            }
            row.insert(key.clone(), value.to_string());
        }
        res.push(row);
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader_from(data: &str) -> Reader<&[u8]> {
        csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(data.as_bytes())
    }

    #[test]
    fn institution_headers_are_canonicalized() {
        let data = "Município,Nome,Região,Tipo,Quantidade CIPTEA\nPalmas,Centro A,Norte,CIPTEA,12\n";
        let mut reader = reader_from(data);
        let rows = institution_rows_from_reader(&mut reader, &"inline".to_string()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][FIELD_MUNICIPALITY], "Palmas");
        assert_eq!(rows[0][FIELD_NAME], "Centro A");
        assert_eq!(rows[0][FIELD_REGION], "Norte");
        assert_eq!(rows[0][FIELD_KIND], "CIPTEA");
        assert_eq!(rows[0][FIELD_CIPTEA], "12");
    }

    #[test]
    fn institution_roster_requires_a_municipality_column() {
        let data = "Nome,Tipo\nCentro A,CIPTEA\n";
        let mut reader = reader_from(data);
        let err = institution_rows_from_reader(&mut reader, &"inline".to_string()).unwrap_err();
        match *err {
            PanelError::MissingColumn { ref name, .. } => assert_eq!(name, FIELD_MUNICIPALITY),
            ref other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn demographic_columns_can_be_overridden() {
        let data = "Idade,Deficiência,Qtd\n13-17,Auditiva,4\n";
        let mut reader = reader_from(data);
        let source = FileSource {
            bracket_column: Some("Idade".to_string()),
            category_column: Some("Deficiência".to_string()),
            quantity_column: Some("Qtd".to_string()),
            ..FileSource::from_path("inline".to_string())
        };
        let rows =
            demographic_rows_from_reader(&mut reader, &source, &"inline".to_string()).unwrap();
        assert_eq!(rows[0][FIELD_BRACKET], "13-17");
        assert_eq!(rows[0][FIELD_CATEGORY], "Auditiva");
        assert_eq!(rows[0][FIELD_QUANTITY], "4");
    }

    #[test]
    fn demographic_override_must_name_an_existing_column() {
        let data = "faixa_etaria,quantidade\n0-12,3\n";
        let mut reader = reader_from(data);
        let source = FileSource {
            category_column: Some("Coluna X".to_string()),
            ..FileSource::from_path("inline".to_string())
        };
        let err =
            demographic_rows_from_reader(&mut reader, &source, &"inline".to_string()).unwrap_err();
        match *err {
            PanelError::MissingColumn { ref name, .. } => assert_eq!(name, "Coluna X"),
            ref other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn demographic_declarations_require_an_age_column() {
        let data = "tipo_deficiencia,quantidade\nAuditiva,3\n";
        let mut reader = reader_from(data);
        let source = FileSource::from_path("inline".to_string());
        let err =
            demographic_rows_from_reader(&mut reader, &source, &"inline".to_string()).unwrap_err();
        match *err {
            PanelError::MissingColumn { ref name, .. } => assert_eq!(name, FIELD_BRACKET),
            ref other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn demographic_alternate_bracket_header() {
        let data = "faixa,quantidade\n60+,2\n";
        let mut reader = reader_from(data);
        let source = FileSource::from_path("inline".to_string());
        let rows =
            demographic_rows_from_reader(&mut reader, &source, &"inline".to_string()).unwrap();
        assert_eq!(rows[0][FIELD_BRACKET_ALT], "60+");
        assert_eq!(rows[0][FIELD_QUANTITY], "2");
    }

    #[test]
    fn short_rows_are_tolerated() {
        let data = "municipio,nome,tipo\nMiracema\nPalmas,Centro A,CIPTEA\n";
        let mut reader = reader_from(data);
        let rows = institution_rows_from_reader(&mut reader, &"inline".to_string()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][FIELD_MUNICIPALITY], "Miracema");
        assert_eq!(rows[0].get(FIELD_NAME), None);
        assert_eq!(rows[1][FIELD_KIND], "CIPTEA");
    }
}
