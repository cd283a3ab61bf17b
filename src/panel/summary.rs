// Assembles the summary JSON consumed by the dashboard rendering layer.
//
// All the quantities are serialized as strings: the rendering layer treats
// them as display text and the reference summaries are diffed as text.

use std::fs;
use std::path::PathBuf;

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::panel::*;

pub fn build_summary_js(
    config: &PanelConfig,
    institutions: &InstitutionSummary,
    tally: &DemographicTally,
) -> JSValue {
    let c = OutputConfig {
        panel: config.output_settings.panel_name.clone(),
        date: config.output_settings.panel_date.clone(),
        jurisdiction: config.output_settings.jurisdiction.clone(),
    };
    json!({
        "config": c,
        "municipalities": municipalities_to_json(institutions),
        "demographics": demographics_to_json(tally),
        "credentials": credentials_to_json(&institutions.totals),
        "regions": counts_to_json(institutions.regions.iter().map(|(k, v)| (k, *v))),
    })
}

fn municipalities_to_json(summary: &InstitutionSummary) -> JSValue {
    let mut statuses: JSMap<String, JSValue> = JSMap::new();
    for (municipality, status) in summary.statuses.iter() {
        statuses.insert(municipality.clone(), json!(status));
    }

    let mut institutions: JSMap<String, JSValue> = JSMap::new();
    for (municipality, list) in summary.institutions.iter() {
        let records: Vec<JSValue> = list.iter().map(institution_to_json).collect();
        institutions.insert(municipality.clone(), json!(records));
    }

    json!({
        "status": statuses,
        "institutions": institutions,
        "totals": counts_to_json(summary.municipal_totals.iter().map(|(k, v)| (k, *v))),
    })
}

fn institution_to_json(institution: &Institution) -> JSValue {
    json!({
        "name": institution.name,
        "region": institution.region,
        "kind": institution.kind,
        "address": institution.address,
        "phone": institution.phone,
        "email": institution.email,
        "ciptea": institution.ciptea.to_string(),
        "cipf": institution.cipf.to_string(),
        "passeLivre": institution.passe_livre.to_string(),
    })
}

fn demographics_to_json(tally: &DemographicTally) -> JSValue {
    let brackets: Vec<&String> = tally.totals.iter().map(|(label, _)| label).collect();

    let mut categories: JSMap<String, JSValue> = JSMap::new();
    for category in tally.categories.iter() {
        categories.insert(
            category.name.clone(),
            counts_to_json(category.tally.iter().map(|(k, v)| (k, *v))),
        );
    }

    json!({
        "brackets": brackets,
        "totals": counts_to_json(tally.totals.iter().map(|(k, v)| (k, *v))),
        "categories": categories,
        "total": tally.total.to_string(),
        "unassigned": tally.unassigned.to_string(),
        "skipped": tally.skipped.len(),
    })
}

fn credentials_to_json(totals: &CredentialTotals) -> JSValue {
    json!({
        "ciptea": totals.ciptea.to_string(),
        "cipf": totals.cipf.to_string(),
        "passeLivre": totals.passe_livre.to_string(),
        "combined": totals.combined().to_string(),
    })
}

fn counts_to_json<K: AsRef<str>>(counts: impl Iterator<Item = (K, u64)>) -> JSValue {
    let mut map: JSMap<String, JSValue> = JSMap::new();
    for (label, count) in counts {
        map.insert(label.as_ref().to_string(), json!(count.to_string()));
    }
    json!(map)
}

pub fn write_summary(
    out: Option<&String>,
    output_directory: &Option<String>,
    summary_js: &JSValue,
) -> BPanelResult<()> {
    let pretty_js = serde_json::to_string_pretty(summary_js).context(ParsingJsonSnafu {})?;
    let target = match (out, output_directory) {
        (Some(path), _) => path.clone(),
        (None, Some(dir)) => {
            let p: PathBuf = [dir.as_str(), "summary.json"].iter().collect();
            p.as_path().display().to_string()
        }
        (None, None) => "stdout".to_string(),
    };
    if target.is_empty() || target == "stdout" {
        println!("summary:{}", pretty_js);
        return Ok(());
    }
    fs::write(&target, pretty_js).context(WritingSummarySnafu {
        path: target.clone(),
    })?;
    info!("Summary written to {}", target);
    Ok(())
}

pub fn check_reference(reference_path: &String, summary_js: &JSValue) -> BPanelResult<()> {
    let reference_js = read_summary(reference_path)?;
    let pretty_js_ref = serde_json::to_string_pretty(&reference_js).context(ParsingJsonSnafu {})?;
    let pretty_js = serde_json::to_string_pretty(summary_js).context(ParsingJsonSnafu {})?;
    if pretty_js_ref != pretty_js {
        warn!("Found differences with the reference summary");
        print_diff(pretty_js_ref.as_str(), pretty_js.as_str(), "\n");
        return Err(Box::new(PanelError::SummaryMismatch {}));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use age_tally::{run_demographic_tally, run_institution_summary, TallyRules};

    fn sample_summary() -> JSValue {
        let mut institution = RawRow::new();
        institution.insert(FIELD_MUNICIPALITY.to_string(), "Palmas".to_string());
        institution.insert(FIELD_NAME.to_string(), "Centro A".to_string());
        institution.insert(FIELD_KIND.to_string(), "CIPTEA".to_string());
        institution.insert(FIELD_REGION.to_string(), "Norte".to_string());
        institution.insert(FIELD_CIPTEA.to_string(), "3".to_string());
        let institutions = run_institution_summary(&[institution]);

        let mut record = RawRow::new();
        record.insert(FIELD_BRACKET.to_string(), "13-17".to_string());
        record.insert(FIELD_CATEGORY.to_string(), "Auditiva".to_string());
        record.insert(FIELD_QUANTITY.to_string(), "4".to_string());
        let tally = run_demographic_tally(&[record], &TallyRules::standard()).unwrap();

        let config = PanelConfig {
            output_settings: OutputSettings::default_settings(),
            data_sources: DataSources {
                institutions: FileSource::from_path("instituicoes.csv".to_string()),
                demographics: None,
            },
            brackets: None,
            discover_brackets: None,
            categories: None,
        };
        build_summary_js(&config, &institutions, &tally)
    }

    #[test]
    fn quantities_are_serialized_as_strings() {
        let js = sample_summary();
        assert_eq!(js["credentials"]["ciptea"], json!("3"));
        assert_eq!(js["credentials"]["combined"], json!("3"));
        assert_eq!(js["demographics"]["totals"]["13-17"], json!("4"));
        assert_eq!(js["demographics"]["total"], json!("4"));
        assert_eq!(js["municipalities"]["totals"]["Palmas"], json!("3"));
        let institution = &js["municipalities"]["institutions"]["Palmas"][0];
        assert_eq!(institution["ciptea"], json!("3"));
        assert_eq!(institution["passeLivre"], json!("0"));
    }

    #[test]
    fn brackets_keep_their_reporting_order() {
        let js = sample_summary();
        assert_eq!(js["demographics"]["brackets"], json!(["0-12", "13-17", "18-59", "60+"]));
    }

    #[test]
    fn statuses_and_regions_are_present() {
        let js = sample_summary();
        assert_eq!(js["municipalities"]["status"]["Palmas"], json!("CIPTEA"));
        assert_eq!(js["regions"]["Norte"], json!("3"));
        assert_eq!(js["demographics"]["skipped"], json!(0));
        assert_eq!(js["config"]["panel"], json!("Painel de Credenciamento"));
        assert_eq!(js["config"]["date"], JSValue::Null);
    }
}
