use log::{debug, info, warn};

use age_tally::*;
use snafu::{prelude::*, ErrorCompat, Snafu};

use std::path::{Path, PathBuf};

use crate::args::Args;
use crate::panel::config_reader::*;
use crate::panel::summary::*;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod summary;

#[derive(Debug, Snafu)]
pub enum PanelError {
    #[snafu(display("Error opening file {path}"))]
    OpeningCsv { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Missing column {name} in file {path}"))]
    MissingColumn { name: String, path: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display(""))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display(""))]
    BracketConfig { source: TallyErrors },
    #[snafu(display(""))]
    MissingParentDir {},
    #[snafu(display("Difference detected between assembled summary and reference summary"))]
    SummaryMismatch {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type PanelResult<T> = Result<T, PanelError>;
pub type BPanelResult<T> = Result<T, Box<PanelError>>;

pub fn run_panel(args: &Args) -> BPanelResult<()> {
    let config = match &args.config {
        Some(path) => read_config(path)?,
        None => default_config(args)?,
    };
    let config = apply_overrides(config, args);
    info!("config: {:?}", config);

    let rules = assemble_rules(&config)?;
    debug!("run_panel: rules: {:?}", rules);

    // Data paths are relative to the configuration file.
    let root = match &args.config {
        Some(path) => Path::new(path.as_str())
            .parent()
            .context(MissingParentDirSnafu {})?
            .as_os_str()
            .to_str()
            .unwrap()
            .to_string(),
        None => String::new(),
    };

    let institution_path = resolve_path(&root, &config.data_sources.institutions.file_path);
    let institution_rows =
        io_csv::read_institution_rows(&institution_path, &config.data_sources.institutions)?;

    // The demographic declarations are a best-effort input: a panel without
    // them still carries the map and the credential totals.
    let demographic_rows = match &config.data_sources.demographics {
        Some(source) => {
            let path = resolve_path(&root, &source.file_path);
            match io_csv::read_demographic_rows(&path, source) {
                Result::Ok(rows) => rows,
                Result::Err(e) => {
                    warn!(
                        "Could not read the demographic declarations from {:?}: {}",
                        path, e
                    );
                    Vec::new()
                }
            }
        }
        None => Vec::new(),
    };

    let institution_summary = run_institution_summary(&institution_rows);
    let demographic_tally =
        run_demographic_tally(&demographic_rows, &rules).context(BracketConfigSnafu {})?;
    report_skipped(&demographic_tally);

    let summary_js = build_summary_js(&config, &institution_summary, &demographic_tally);
    write_summary(
        args.out.as_ref(),
        &config.output_settings.output_directory,
        &summary_js,
    )?;

    // The reference summary, if provided for comparison
    if let Some(reference) = &args.reference {
        check_reference(reference, &summary_js)?;
    }

    Ok(())
}

fn default_config(args: &Args) -> PanelResult<PanelConfig> {
    let institutions = match &args.institutions {
        Some(path) => FileSource::from_path(path.clone()),
        None => {
            whatever!("No panel configuration and no institution roster provided. Use --config or --institutions")
        }
    };
    let demographics = args.demographics.clone().map(FileSource::from_path);
    Ok(PanelConfig {
        output_settings: OutputSettings::default_settings(),
        data_sources: DataSources {
            institutions,
            demographics,
        },
        brackets: None,
        discover_brackets: None,
        categories: None,
    })
}

fn apply_overrides(config: PanelConfig, args: &Args) -> PanelConfig {
    let mut config = config;
    if let Some(path) = &args.institutions {
        config.data_sources.institutions.file_path = path.clone();
    }
    if let Some(path) = &args.demographics {
        match config.data_sources.demographics.as_mut() {
            Some(source) => source.file_path = path.clone(),
            None => config.data_sources.demographics = Some(FileSource::from_path(path.clone())),
        }
    }
    if args.delimiter.is_some() {
        config.data_sources.institutions._delimiter = args.delimiter.clone();
        if let Some(source) = config.data_sources.demographics.as_mut() {
            source._delimiter = args.delimiter.clone();
        }
    }
    if args.discover_brackets {
        config.discover_brackets = Some(true);
    }
    config
}

fn assemble_rules(config: &PanelConfig) -> PanelResult<TallyRules> {
    let bracket_scheme = match (&config.brackets, config.discover_brackets.unwrap_or(false)) {
        (Some(_), true) => {
            whatever!("The options brackets and discoverBrackets cannot be used together")
        }
        (Some(defs), false) => {
            BracketScheme::Fixed(defs.iter().map(|def| def.to_bracket()).collect())
        }
        (None, true) => BracketScheme::Discover,
        (None, false) => BracketScheme::Fixed(AgeBracket::standard()),
    };
    let category_scheme = match &config.categories {
        Some(list) => CategoryScheme::Fixed(list.clone()),
        None => CategoryScheme::Discover,
    };
    Ok(TallyRules {
        bracket_scheme,
        category_scheme,
    })
}

fn resolve_path(root: &String, file_path: &String) -> String {
    let p: PathBuf = [root.clone(), file_path.clone()].iter().collect();
    p.as_path().display().to_string()
}

fn report_skipped(tally: &DemographicTally) {
    for skipped in tally.skipped.iter() {
        warn!(
            "Skipped demographic record: bracket {:?} category {:?} quantity {:?} ({:?})",
            skipped.bracket, skipped.category, skipped.quantity, skipped.reason
        );
    }
}

fn run_panel_test(test_name: &str, config_lpath: &str, summary_lpath: &str) {
    let test_dir = option_env!("CREDMAP_TEST_DIR").unwrap_or("tests/fixtures");
    info!("Running test {}", test_name);
    let args = Args {
        config: Some(format!("{}/{}/{}", test_dir, test_name, config_lpath)),
        reference: Some(format!("{}/{}/{}", test_dir, test_name, summary_lpath)),
        out: Some("stdout".to_string()),
        institutions: None,
        demographics: None,
        delimiter: None,
        discover_brackets: false,
        verbose: false,
    };
    let res = run_panel(&args);
    if let Err(e) = res {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured {}", e);
        if let Some(bt) = ErrorCompat::backtrace(e.as_ref()) {
            eprintln!("trace: {}", bt);
        } else {
            eprintln!("No trace found");
        }
        panic!("test {} failed", test_name);
    }
}

pub fn test_wrapper(test_name: &str) {
    run_panel_test(
        test_name,
        format!("{}_config.json", test_name).as_str(),
        format!("{}_expected_summary.json", test_name).as_str(),
    )
}
