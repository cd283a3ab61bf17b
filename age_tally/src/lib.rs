pub mod builder;
mod config;
pub mod manual;
pub mod quick_start;

use log::{debug, info, warn};

use std::{
    collections::{HashMap, HashSet},
    ops::{Add, AddAssign},
};

pub use crate::config::*;

// **** Private structures ****

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
struct CategoryId(u32);

#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash)]
struct Count(u64);

impl Count {
    const ZERO: Count = Count(0);
}

impl std::iter::Sum for Count {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Count(iter.map(|c| c.0).sum())
    }
}

impl AddAssign for Count {
    fn add_assign(&mut self, rhs: Count) {
        self.0 += rhs.0;
    }
}

impl Add for Count {
    type Output = Count;
    fn add(self: Count, rhs: Count) -> Count {
        Count(self.0 + rhs.0)
    }
}

// Trimmed field lookup. The sources are uncontrolled spreadsheet exports, so
// a missing field reads as blank rather than being an error.
fn field<'a>(row: &'a RawRow, key: &str) -> &'a str {
    row.get(key).map(|s| s.trim()).unwrap_or("")
}

// The age label of a record, accepting the alternate field spelling.
fn bracket_label(row: &RawRow) -> &str {
    let label = field(row, FIELD_BRACKET);
    if label.is_empty() {
        field(row, FIELD_BRACKET_ALT)
    } else {
        label
    }
}

/// Parses free text as a base-10 integer count: surrounding whitespace is
/// ignored, negative values are clamped to zero and anything that does not
/// parse yields `fallback`.
pub fn to_non_negative_int(raw: &str, fallback: u64) -> u64 {
    match raw.trim().parse::<i64>() {
        Ok(value) if value < 0 => 0,
        Ok(value) => value as u64,
        Err(_) => fallback,
    }
}

/// Parses an age label into its interval.
///
/// Two shapes are recognized once internal whitespace is removed: `"a-b"`
/// (closed, bounds taken literally even when reversed) and `"a+"`
/// (open-ended). Anything else yields `None` and the caller drops the
/// record rather than guessing.
pub fn parse_age_range(label: &str) -> Option<AgeRange> {
    let compact: String = label.chars().filter(|c| !c.is_whitespace()).collect();
    if let Some(start_s) = compact.strip_suffix('+') {
        let start = start_s.parse::<u32>().ok()?;
        return Some(AgeRange::Open { start });
    }
    let (start_s, end_s) = compact.split_once('-')?;
    let start = start_s.parse::<u32>().ok()?;
    let end = end_s.parse::<u32>().ok()?;
    Some(AgeRange::Closed { start, end })
}

// Length of the intersection between an inclusive year range and a bracket.
fn overlap_len(start: u32, end: u32, bracket: &AgeBracket) -> u64 {
    let lo = start.max(bracket.start);
    let hi = match bracket.end {
        Some(bracket_end) => end.min(bracket_end),
        None => end,
    };
    if hi < lo {
        0
    } else {
        (hi - lo + 1) as u64
    }
}

/// Splits `quantity` across `brackets` in proportion to the year overlap
/// between `range` and each bracket, conserving the exact integer total.
///
/// The rules, in order:
/// * an open-ended range is never divided: it goes whole to the first
///   bracket containing its start, or to `unassigned` if none does;
/// * a closed range with `end < start` allocates nothing;
/// * a closed range overlapping no bracket at all goes to `unassigned`;
/// * otherwise each bracket receives `quantity * overlap / span` rounded
///   half-up, and the residual rounding error is folded into the bracket
///   with the largest raw share (the first one on ties). Corrected shares
///   are floored at zero.
pub fn allocate(range: &AgeRange, quantity: u64, brackets: &[AgeBracket]) -> Allocation {
    let mut shares = vec![0u64; brackets.len()];
    if quantity == 0 {
        return Allocation {
            shares,
            unassigned: 0,
        };
    }
    let (start, end) = match *range {
        AgeRange::Open { start } => {
            match brackets.iter().position(|b| b.contains(start)) {
                Some(idx) => {
                    shares[idx] = quantity;
                    return Allocation {
                        shares,
                        unassigned: 0,
                    };
                }
                None => {
                    return Allocation {
                        shares,
                        unassigned: quantity,
                    };
                }
            }
        }
        AgeRange::Closed { start, end } => (start, end),
    };
    if end < start {
        return Allocation {
            shares,
            unassigned: quantity,
        };
    }
    let overlaps: Vec<u64> = brackets
        .iter()
        .map(|bracket| overlap_len(start, end, bracket))
        .collect();
    if overlaps.iter().all(|&len| len == 0) {
        return Allocation {
            shares,
            unassigned: quantity,
        };
    }
    let span = (end - start + 1) as f64;
    let raw: Vec<f64> = overlaps
        .iter()
        .map(|&len| quantity as f64 * len as f64 / span)
        .collect();
    let mut rounded: Vec<i64> = raw.iter().map(|share| share.round() as i64).collect();
    let diff = quantity as i64 - rounded.iter().sum::<i64>();
    if diff != 0 {
        // The rounding error goes to the bracket with the largest raw
        // share, keeping the first one on ties.
        let mut largest = 0;
        for (idx, share) in raw.iter().enumerate() {
            if *share > raw[largest] {
                largest = idx;
            }
        }
        rounded[largest] += diff;
    }
    for (slot, value) in shares.iter_mut().zip(rounded) {
        *slot = value.max(0) as u64;
    }
    Allocation {
        shares,
        unassigned: 0,
    }
}

// The brackets must form an ordered partition: ascending starts, no two
// brackets sharing a year.
pub(crate) fn check_brackets(brackets: &[AgeBracket]) -> Result<(), TallyErrors> {
    if brackets.is_empty() {
        return Err(TallyErrors::NoBrackets);
    }
    for pair in brackets.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if next.start < prev.start {
            return Err(TallyErrors::UnorderedBrackets(
                prev.label.clone(),
                next.label.clone(),
            ));
        }
        match prev.end {
            Some(prev_end) if next.start > prev_end => {}
            _ => {
                return Err(TallyErrors::OverlappingBrackets(
                    prev.label.clone(),
                    next.label.clone(),
                ));
            }
        }
    }
    Ok(())
}

// Discovers the bracket list from the distinct parseable labels in the
// records, ordered by bounds with open-ended brackets last. Labels with the
// same bounds collapse onto the first spelling seen. Reversed labels cannot
// form a bracket and are left out. Falls back to the standard brackets when
// no label qualifies.
fn discover_brackets(rows: &[RawRow]) -> Vec<AgeBracket> {
    let mut seen: Vec<AgeBracket> = Vec::new();
    for row in rows {
        let label = bracket_label(row);
        if label.is_empty() {
            continue;
        }
        let bracket = match parse_age_range(label) {
            Some(AgeRange::Closed { start, end }) if end >= start => {
                AgeBracket::closed(label, start, end)
            }
            Some(AgeRange::Open { start }) => AgeBracket::open(label, start),
            _ => continue,
        };
        let duplicate = seen
            .iter()
            .any(|b| b.start == bracket.start && b.end == bracket.end);
        if !duplicate {
            seen.push(bracket);
        }
    }
    if seen.is_empty() {
        return AgeBracket::standard();
    }
    seen.sort_by_key(|b| (b.start, b.end.is_none(), b.end));
    seen
}

fn intern_category(
    name: &str,
    ids: &mut HashMap<String, CategoryId>,
    names: &mut Vec<String>,
) -> CategoryId {
    if let Some(id) = ids.get(name) {
        return *id;
    }
    let id = CategoryId(names.len() as u32);
    ids.insert(name.to_string(), id);
    names.push(name.to_string());
    id
}

/// Runs the demographic tally with the given rules over the given records.
///
/// Records that cannot be tallied are skipped and reported through the
/// result, never raised. The output is independent of the record order,
/// except for the order of the skipped-record report.
///
/// Arguments:
/// * `rows` the raw records to process
/// * `rules` the bracket and category schemes that govern this pass
pub fn run_demographic_tally(
    rows: &[RawRow],
    rules: &TallyRules,
) -> Result<DemographicTally, TallyErrors> {
    info!("Processing {:?} demographic records", rows.len());

    let brackets: Vec<AgeBracket> = match &rules.bracket_scheme {
        BracketScheme::Fixed(list) => list.clone(),
        BracketScheme::Discover => discover_brackets(rows),
    };
    check_brackets(&brackets)?;
    for (idx, bracket) in brackets.iter().enumerate() {
        match bracket.end {
            Some(end) => info!(
                "Bracket {}: {} [{}..{}]",
                idx + 1,
                bracket.label,
                bracket.start,
                end
            ),
            None => info!("Bracket {}: {} [{}..]", idx + 1, bracket.label, bracket.start),
        }
    }

    // A fixed category list is interned up front so that every configured
    // category shows up in the output, even with no matching record.
    let mut category_ids: HashMap<String, CategoryId> = HashMap::new();
    let mut category_names: Vec<String> = Vec::new();
    let fixed_categories = match &rules.category_scheme {
        CategoryScheme::Fixed(list) => {
            for name in list {
                intern_category(name.trim(), &mut category_ids, &mut category_names);
            }
            true
        }
        CategoryScheme::Discover => false,
    };

    let mut totals: Vec<Count> = vec![Count::ZERO; brackets.len()];
    let mut by_category: HashMap<CategoryId, Vec<Count>> = HashMap::new();
    let mut skipped: Vec<SkippedRow> = Vec::new();
    let mut unassigned = Count::ZERO;

    for row in rows {
        let label = bracket_label(row);
        let quantity = to_non_negative_int(field(row, FIELD_QUANTITY), 0);
        if quantity == 0 {
            continue;
        }
        let category_raw = field(row, FIELD_CATEGORY);
        let category = if category_raw.is_empty() {
            UNSPECIFIED_CATEGORY
        } else {
            category_raw
        };
        if fixed_categories && !category_raw.is_empty() && !category_ids.contains_key(category) {
            debug!(
                "run_demographic_tally: unlisted category {:?}, skipping record",
                category
            );
            skipped.push(SkippedRow {
                bracket: label.to_string(),
                category: category.to_string(),
                quantity,
                reason: SkipReason::UnknownCategory,
            });
            continue;
        }
        let range = match parse_age_range(label) {
            Some(range) => range,
            None => {
                debug!(
                    "run_demographic_tally: unparseable age label {:?}, skipping record",
                    label
                );
                skipped.push(SkippedRow {
                    bracket: label.to_string(),
                    category: category.to_string(),
                    quantity,
                    reason: SkipReason::UnparseableBracket,
                });
                continue;
            }
        };
        let allocation = allocate(&range, quantity, &brackets);
        unassigned += Count(allocation.unassigned);
        let category_id = intern_category(category, &mut category_ids, &mut category_names);
        let per_bracket = by_category
            .entry(category_id)
            .or_insert_with(|| vec![Count::ZERO; brackets.len()]);
        for (idx, share) in allocation.shares.iter().enumerate() {
            totals[idx] += Count(*share);
            per_bracket[idx] += Count(*share);
        }
    }

    if unassigned > Count::ZERO {
        warn!(
            "run_demographic_tally: {:?} unit(s) of quantity matched no bracket",
            unassigned.0
        );
    }
    if !skipped.is_empty() {
        warn!("run_demographic_tally: {:?} record(s) skipped", skipped.len());
    }

    let labels: Vec<String> = brackets.iter().map(|b| b.label.clone()).collect();
    let totals_out: Vec<(String, u64)> = labels
        .iter()
        .cloned()
        .zip(totals.iter().map(|c| c.0))
        .collect();
    let total = totals.iter().cloned().sum::<Count>().0;

    let mut categories: Vec<CategoryTally> = Vec::new();
    for (idx, name) in category_names.iter().enumerate() {
        let counts = by_category.get(&CategoryId(idx as u32));
        let tally: Vec<(String, u64)> = labels
            .iter()
            .enumerate()
            .map(|(bidx, label)| {
                (
                    label.clone(),
                    counts.map_or(0, |per_bracket| per_bracket[bidx].0),
                )
            })
            .collect();
        categories.push(CategoryTally {
            name: name.clone(),
            tally,
        });
    }
    categories.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(DemographicTally {
        totals: totals_out,
        categories,
        total,
        unassigned: unassigned.0,
        skipped,
    })
}

/// Groups institution records by municipality and rolls the credential
/// counts up globally and per region.
///
/// A record naming a municipality but no institution marks the municipality
/// on the map without accreditation. Records without a municipality are
/// ignored.
pub fn run_institution_summary(rows: &[RawRow]) -> InstitutionSummary {
    info!("Processing {:?} institution records", rows.len());

    let mut institutions: HashMap<String, Vec<Institution>> = HashMap::new();
    let mut all_municipalities: HashSet<String> = HashSet::new();

    for row in rows {
        let municipality = field(row, FIELD_MUNICIPALITY);
        if municipality.is_empty() {
            continue;
        }
        all_municipalities.insert(municipality.to_string());

        let name = field(row, FIELD_NAME);
        if name.is_empty() {
            continue;
        }
        let institution = Institution {
            name: name.to_string(),
            region: field(row, FIELD_REGION).to_string(),
            kind: field(row, FIELD_KIND).to_string(),
            address: field(row, FIELD_ADDRESS).to_string(),
            phone: field(row, FIELD_PHONE).to_string(),
            email: field(row, FIELD_EMAIL).to_string(),
            ciptea: to_non_negative_int(field(row, FIELD_CIPTEA), 0),
            cipf: to_non_negative_int(field(row, FIELD_CIPF), 0),
            passe_livre: to_non_negative_int(field(row, FIELD_PASSE_LIVRE), 0),
        };
        institutions
            .entry(municipality.to_string())
            .or_default()
            .push(institution);
    }

    let mut statuses: HashMap<String, String> = HashMap::new();
    for municipality in all_municipalities.iter() {
        let status = match institutions.get(municipality) {
            Some(list) => {
                let mut kinds: Vec<&str> = list
                    .iter()
                    .map(|inst| inst.kind.as_str())
                    .filter(|kind| !kind.is_empty())
                    .collect();
                kinds.sort_unstable();
                kinds.dedup();
                if kinds.is_empty() {
                    STATUS_NONE.to_string()
                } else {
                    kinds.join(STATUS_CONNECTOR)
                }
            }
            None => STATUS_NONE.to_string(),
        };
        statuses.insert(municipality.clone(), status);
    }

    let mut totals = CredentialTotals {
        ciptea: 0,
        cipf: 0,
        passe_livre: 0,
    };
    let mut municipal_totals: HashMap<String, u64> = HashMap::new();
    let mut regions_map: HashMap<String, u64> = HashMap::new();

    for (municipality, list) in institutions.iter() {
        for institution in list.iter() {
            totals.ciptea += institution.ciptea;
            totals.cipf += institution.cipf;
            totals.passe_livre += institution.passe_livre;
            *municipal_totals.entry(municipality.clone()).or_insert(0) +=
                institution.combined();

            let region = institution.region.as_str();
            if region.is_empty() {
                continue;
            }
            let lowered = region.to_lowercase();
            if NOT_INFORMED_REGIONS.contains(&lowered.as_str()) {
                debug!(
                    "run_institution_summary: region not informed for {:?}, kept out of the region rollup",
                    institution.name
                );
                continue;
            }
            *regions_map.entry(region.to_string()).or_insert(0) += institution.combined();
        }
    }
    let mut regions: Vec<(String, u64)> = regions_map.into_iter().collect();
    regions.sort_by(|a, b| a.0.cmp(&b.0));

    InstitutionSummary {
        statuses,
        institutions,
        municipal_totals,
        totals,
        regions,
    }
}
