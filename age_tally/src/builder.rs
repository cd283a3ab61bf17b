pub use crate::config::*;

use crate::{check_brackets, run_demographic_tally};

/// A builder for assembling demographic records by hand.
///
/// Use it to feed the tally from another program instead of a file.
///
/// ```
/// pub use age_tally::builder::TallyBuilder;
/// pub use age_tally::TallyRules;
/// # use age_tally::TallyErrors;
///
/// let mut builder = TallyBuilder::new(&TallyRules::standard())?;
///
/// builder.add_record("13-17", "Auditiva", 4);
/// builder.add_record("60+", "", 2);
///
/// let tally = builder.tally()?;
/// assert_eq!(tally.total, 6);
///
/// # Ok::<(), TallyErrors>(())
/// ```
pub struct TallyBuilder {
    pub(crate) _rules: TallyRules,
    pub(crate) _rows: Vec<RawRow>,
}

impl TallyBuilder {
    /// A fixed bracket list is validated right away, so that a bad list
    /// surfaces at construction time rather than at the end.
    pub fn new(rules: &TallyRules) -> Result<TallyBuilder, TallyErrors> {
        if let BracketScheme::Fixed(brackets) = &rules.bracket_scheme {
            check_brackets(brackets)?;
        }
        Ok(TallyBuilder {
            _rules: rules.clone(),
            _rows: Vec::new(),
        })
    }

    /// Adds one record with the given age label, category and quantity.
    ///
    /// It is the simplest use case for most cases.
    pub fn add_record(&mut self, bracket: &str, category: &str, quantity: u64) {
        let mut row = RawRow::new();
        row.insert(FIELD_BRACKET.to_string(), bracket.to_string());
        row.insert(FIELD_CATEGORY.to_string(), category.to_string());
        row.insert(FIELD_QUANTITY.to_string(), quantity.to_string());
        self._rows.push(row);
    }

    /// Adds an already assembled raw record, as read from a file.
    pub fn add_raw_row(&mut self, row: RawRow) {
        self._rows.push(row);
    }

    /// Runs the tally over the accumulated records.
    pub fn tally(&self) -> Result<DemographicTally, TallyErrors> {
        run_demographic_tally(&self._rows, &self._rules)
    }
}
