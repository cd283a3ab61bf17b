use crate::panel::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

use std::fs;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "panelName")]
    pub panel_name: String,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "panelDate")]
    pub panel_date: Option<String>,
    #[serde(rename = "jurisdiction")]
    pub jurisdiction: Option<String>,
}

impl OutputSettings {
    pub fn default_settings() -> OutputSettings {
        OutputSettings {
            panel_name: "Painel de Credenciamento".to_string(),
            output_directory: None,
            panel_date: None,
            jurisdiction: None,
        }
    }
}

// The header of the assembled summary, as it appears under the "config" key.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub panel: String,
    pub date: Option<String>,
    pub jurisdiction: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "delimiter")]
    pub _delimiter: Option<String>,
    #[serde(rename = "bracketColumn")]
    pub bracket_column: Option<String>,
    #[serde(rename = "categoryColumn")]
    pub category_column: Option<String>,
    #[serde(rename = "quantityColumn")]
    pub quantity_column: Option<String>,
}

impl FileSource {
    pub fn from_path(path: String) -> FileSource {
        FileSource {
            file_path: path,
            _delimiter: None,
            bracket_column: None,
            category_column: None,
            quantity_column: None,
        }
    }

    pub fn delimiter_byte(&self) -> PanelResult<u8> {
        match &self._delimiter {
            None => Ok(b','),
            Some(s) if s.as_bytes().len() == 1 => Ok(s.as_bytes()[0]),
            Some(s) => whatever!("The delimiter must be a single character: {:?}", s),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DataSources {
    pub institutions: FileSource,
    pub demographics: Option<FileSource>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct BracketDef {
    pub label: Option<String>,
    pub start: u32,
    pub end: Option<u32>,
}

impl BracketDef {
    pub fn to_bracket(&self) -> AgeBracket {
        let label = match (&self.label, self.end) {
            (Some(label), _) => label.clone(),
            (None, Some(end)) => format!("{}-{}", self.start, end),
            (None, None) => format!("{}+", self.start),
        };
        match self.end {
            Some(end) => AgeBracket::closed(label.as_str(), self.start, end),
            None => AgeBracket::open(label.as_str(), self.start),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "dataSources")]
    pub data_sources: DataSources,
    pub brackets: Option<Vec<BracketDef>>,
    #[serde(rename = "discoverBrackets")]
    pub discover_brackets: Option<bool>,
    pub categories: Option<Vec<String>>,
}

pub fn read_config(path: &String) -> BPanelResult<PanelConfig> {
    let contents =
        fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path: path.clone() })?;
    let config: PanelConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

pub fn read_summary(path: &String) -> BPanelResult<JSValue> {
    let contents =
        fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path: path.clone() })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}
