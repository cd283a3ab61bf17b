// ********* Input data structures ***********

use std::collections::HashMap;
use std::error::Error;
use std::fmt::Display;

/// One raw input record: a mapping from field name to the text found in that
/// field. Records come from uncontrolled sources (spreadsheet exports for the
/// most part), so any field may be missing, blank or malformed.
///
/// In most cases, it is enough to use the higher-level builder API.
pub type RawRow = HashMap<String, String>;

/// Field holding the age range of a demographic record.
pub const FIELD_BRACKET: &str = "faixa_etaria";
/// Alternate spelling for the age range field. Accepted everywhere the
/// primary spelling is.
pub const FIELD_BRACKET_ALT: &str = "faixa";
/// Field holding the category (disability type) of a demographic record.
pub const FIELD_CATEGORY: &str = "tipo_deficiencia";
/// Field holding the quantity of a demographic record.
pub const FIELD_QUANTITY: &str = "quantidade";

// Fields of one institution record.
pub const FIELD_MUNICIPALITY: &str = "municipio";
pub const FIELD_NAME: &str = "nome";
pub const FIELD_REGION: &str = "regiao";
pub const FIELD_KIND: &str = "tipo";
pub const FIELD_ADDRESS: &str = "endereco";
pub const FIELD_PHONE: &str = "telefone";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_CIPTEA: &str = "quantidade_ciptea";
pub const FIELD_CIPF: &str = "quantidade_cipf";
pub const FIELD_PASSE_LIVRE: &str = "quantidade_passe_livre";

/// Category under which records with a blank category field are tallied.
pub const UNSPECIFIED_CATEGORY: &str = "Outra";

/// Status of a municipality with no accreditation. The rendering layer
/// matches this exact string when shading the map, do not change it.
pub const STATUS_NONE: &str = "Nenhum";

/// Separator between accreditation kinds in a municipality status.
pub const STATUS_CONNECTOR: &str = " e ";

/// Region labels (lower case) meaning the region was not informed. Records
/// carrying one of these are excluded from the per-region rollup but still
/// count in the global totals.
pub const NOT_INFORMED_REGIONS: [&str; 4] = [
    "não informada",
    "nao informada",
    "não informado",
    "nao informado",
];

/// The age interval written in one record, with the bounds kept exactly as
/// they appear in the label.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum AgeRange {
    /// An inclusive interval, `"13-17"`. A label with `end < start` is kept
    /// as written and allocates nothing.
    Closed { start: u32, end: u32 },
    /// An interval with no upper bound, `"60+"`.
    Open { start: u32 },
}

/// One reporting bracket: a label and an inclusive age interval. An `end` of
/// `None` makes the bracket open-ended at the top.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct AgeBracket {
    pub label: String,
    pub start: u32,
    pub end: Option<u32>,
}

impl AgeBracket {
    pub fn closed(label: &str, start: u32, end: u32) -> AgeBracket {
        AgeBracket {
            label: label.to_string(),
            start,
            end: Some(end),
        }
    }

    pub fn open(label: &str, start: u32) -> AgeBracket {
        AgeBracket {
            label: label.to_string(),
            start,
            end: None,
        }
    }

    /// Whether `age` falls inside this bracket.
    pub fn contains(&self, age: u32) -> bool {
        age >= self.start && self.end.map_or(true, |end| age <= end)
    }

    /// The standard reporting brackets of the accreditation panel.
    pub fn standard() -> Vec<AgeBracket> {
        vec![
            AgeBracket::closed("0-12", 0, 12),
            AgeBracket::closed("13-17", 13, 17),
            AgeBracket::closed("18-59", 18, 59),
            AgeBracket::open("60+", 60),
        ]
    }
}

// ******** Output data structures *********

/// The split of one record's quantity across the reporting brackets.
///
/// `shares` is aligned positionally with the bracket list that produced it.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Allocation {
    pub shares: Vec<u64>,
    /// Quantity that could not be matched to any bracket.
    pub unassigned: u64,
}

/// Why a demographic record was left out of the tally.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum SkipReason {
    /// The age label did not parse as `"a-b"` or `"a+"`.
    UnparseableBracket,
    /// The category is not in the configured category list.
    UnknownCategory,
}

/// A record dropped from the tally, with the raw fields that caused the
/// drop so the source file can be fixed.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SkippedRow {
    pub bracket: String,
    pub category: String,
    pub quantity: u64,
    pub reason: SkipReason,
}

/// Per-bracket totals for one category.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CategoryTally {
    pub name: String,
    /// One entry per reporting bracket, in bracket order, zero-defaulted.
    pub tally: Vec<(String, u64)>,
}

/// The aggregate produced by one demographic pass.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DemographicTally {
    /// Grand total per bracket, in bracket order.
    pub totals: Vec<(String, u64)>,
    /// Per-category breakdown, sorted by category name.
    pub categories: Vec<CategoryTally>,
    /// Total quantity assigned to brackets.
    pub total: u64,
    /// Quantity dropped because its range matched no bracket.
    pub unassigned: u64,
    /// Records left out of the tally, in input order.
    pub skipped: Vec<SkippedRow>,
}

/// One accredited institution, as registered for a municipality.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Institution {
    pub name: String,
    pub region: String,
    pub kind: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub ciptea: u64,
    pub cipf: u64,
    pub passe_livre: u64,
}

impl Institution {
    /// The combined credential count of this institution.
    pub fn combined(&self) -> u64 {
        self.ciptea + self.cipf + self.passe_livre
    }
}

/// Global totals of the three credential kinds.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct CredentialTotals {
    pub ciptea: u64,
    pub cipf: u64,
    pub passe_livre: u64,
}

impl CredentialTotals {
    pub fn combined(&self) -> u64 {
        self.ciptea + self.cipf + self.passe_livre
    }
}

/// The aggregate produced by one institution pass.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct InstitutionSummary {
    /// Municipality -> accreditation status label.
    pub statuses: HashMap<String, String>,
    /// Municipality -> its institutions, in input order.
    pub institutions: HashMap<String, Vec<Institution>>,
    /// Municipality -> combined credential count. Only municipalities with
    /// at least one institution appear here.
    pub municipal_totals: HashMap<String, u64>,
    pub totals: CredentialTotals,
    /// Region -> combined credential count, sorted by region name.
    pub regions: Vec<(String, u64)>,
}

/// Errors that prevent a tally from completing.
///
/// Malformed records never raise: they are skipped or defaulted and reported
/// through [`DemographicTally::skipped`]. Only an unusable bracket
/// configuration is fatal.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum TallyErrors {
    NoBrackets,
    OverlappingBrackets(String, String),
    UnorderedBrackets(String, String),
}

impl Error for TallyErrors {}

impl Display for TallyErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TallyErrors::NoBrackets => write!(f, "the bracket list is empty"),
            TallyErrors::OverlappingBrackets(a, b) => {
                write!(f, "brackets {:?} and {:?} overlap", a, b)
            }
            TallyErrors::UnorderedBrackets(a, b) => {
                write!(f, "bracket {:?} starts after bracket {:?}", a, b)
            }
        }
    }
}

// ********* Configuration **********

/// How the reporting brackets are obtained.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum BracketScheme {
    /// A fixed, ordered list supplied ahead of the pass.
    Fixed(Vec<AgeBracket>),
    /// Brackets are discovered from the distinct parseable labels found in
    /// the records and ordered by their bounds.
    Discover,
}

/// How the category set is obtained.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum CategoryScheme {
    /// Only the listed categories are admitted. Records carrying any other
    /// non-blank category are skipped.
    Fixed(Vec<String>),
    /// Every non-blank category value found in the records is admitted.
    Discover,
}

/// The rules governing one tally pass.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TallyRules {
    pub bracket_scheme: BracketScheme,
    pub category_scheme: CategoryScheme,
}

impl TallyRules {
    /// The panel's standard rules: the four fixed reporting brackets,
    /// categories discovered from the records.
    pub fn standard() -> TallyRules {
        TallyRules {
            bracket_scheme: BracketScheme::Fixed(AgeBracket::standard()),
            category_scheme: CategoryScheme::Discover,
        }
    }
}
