use clap::Parser;

/// This is a tabulation program for municipal accreditation panels.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The file describing the panel to assemble. (Only JSON panel descriptions are currently supported)
    /// For more information about the file format, read the documentation of the age_tally crate.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference file containing an already assembled summary in JSON format. If provided, credmap will
    /// check that the assembled output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the panel will be written in JSON format to the given
    /// location. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) The CSV roster of accredited institutions. Setting this option overrides the path that may be
    /// specified with the --config option.
    #[clap(short, long, value_parser)]
    pub institutions: Option<String>,

    /// (file path) The CSV demographic declarations. Setting this option overrides the path that may be
    /// specified with the --config option.
    #[clap(short, long, value_parser)]
    pub demographics: Option<String>,

    /// (single character, default ',') The field delimiter of the CSV inputs.
    #[clap(long, value_parser)]
    pub delimiter: Option<String>,

    /// If passed as an argument, the reporting brackets will be discovered from the age labels present in the data
    /// instead of using the standard list.
    #[clap(long, takes_value = false)]
    pub discover_brackets: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
