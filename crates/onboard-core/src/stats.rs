//! Demographic statistics over a reconciled roster.
//!
//! Everything here is a pure function of the roster. Statistics whose source
//! column was not collected by the survey version in use come out as zero or
//! empty, never as an error.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{AgeBracket, Capabilities, RescueRecord};

/// One row of an ordered breakdown table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct BreakdownRow {
    pub label: String,
    pub count: usize,
    /// Share of the table's denominator, 0–100
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct Stats {
    pub total: usize,
    pub males: usize,
    pub females: usize,
    pub minors: usize,
    pub minors_male: usize,
    pub minors_female: usize,
    pub pregnant: usize,
    pub pregnant_women: usize,
    pub pregnant_minors: usize,
    pub unaccompanied_minors: usize,
    pub unaccompanied_minors_male: usize,
    pub unaccompanied_minors_female: usize,
    pub unaccompanied_pregnant_minors: usize,
    pub unaccompanied_women: usize,
    pub unaccompanied_pregnant_women: usize,
    pub single_or_pregnant_women: usize,
    pub disabled: usize,
    pub disabled_male: usize,
    pub disabled_female: usize,
    /// Age brackets in youngest-first order, over everyone with a known bracket
    pub age_group_counts: Vec<BreakdownRow>,
    /// Minor age brackets among unaccompanied minors
    pub uac_age_group_counts: Vec<BreakdownRow>,
    /// Nationalities, most frequent first
    pub country_counts: Vec<BreakdownRow>,
    pub capabilities: Capabilities,
}

/// Compute every demographic statistic for a roster.
pub fn aggregate(roster: &[RescueRecord]) -> Stats {
    let caps = Capabilities::detect(roster);
    let count = |pred: &dyn Fn(&RescueRecord) -> bool| roster.iter().filter(|&r| pred(r)).count();

    // Without an age column nobody can be classified as a minor
    let minor = |r: &RescueRecord| caps.age && r.is_minor();
    let unaccompanied_minor = |r: &RescueRecord| caps.age && r.is_unaccompanied_minor();

    let unaccompanied_minors: Vec<&RescueRecord> =
        roster.iter().filter(|&r| unaccompanied_minor(r)).collect();

    Stats {
        total: roster.len(),
        males: count(&|r| r.is_male()),
        females: count(&|r| r.is_female()),
        minors: count(&|r| minor(r)),
        minors_male: count(&|r| minor(r) && r.is_male()),
        minors_female: count(&|r| minor(r) && r.is_female()),
        pregnant: count(&|r| r.is_pregnant()),
        pregnant_women: count(&|r| r.is_adult() && r.is_pregnant()),
        pregnant_minors: count(&|r| minor(r) && r.is_pregnant()),
        unaccompanied_minors: unaccompanied_minors.len(),
        unaccompanied_minors_male: unaccompanied_minors.iter().filter(|r| r.is_male()).count(),
        unaccompanied_minors_female: unaccompanied_minors.iter().filter(|r| r.is_female()).count(),
        unaccompanied_pregnant_minors: unaccompanied_minors
            .iter()
            .filter(|r| r.is_female() && r.is_pregnant())
            .count(),
        unaccompanied_women: count(&|r| r.is_unaccompanied_woman()),
        unaccompanied_pregnant_women: count(&|r| r.is_unaccompanied_woman() && r.is_pregnant()),
        single_or_pregnant_women: single_or_pregnant_women(roster, &caps),
        disabled: count(&|r| r.is_disabled()),
        disabled_male: count(&|r| r.is_disabled() && r.is_male()),
        disabled_female: count(&|r| r.is_disabled() && r.is_female()),
        age_group_counts: age_breakdown(roster.iter(), &AgeBracket::ALL),
        uac_age_group_counts: age_breakdown(unaccompanied_minors.iter().copied(), &AgeBracket::MINORS),
        country_counts: country_breakdown(roster),
        capabilities: caps,
    }
}

/// Number of records per rescue, keyed by rescue number
pub fn count_by_rescue(roster: &[RescueRecord]) -> BTreeMap<u32, usize> {
    let mut counts = BTreeMap::new();
    for record in roster {
        *counts.entry(record.rescue_number).or_insert(0) += 1;
    }
    counts
}

/// Women needing protection follow-up: anyone pregnant, women travelling
/// alone or only with children, and girls whose companion is not an adult.
/// The companion questions are conditional, so a roster may lack them
/// entirely; records without an answer simply fail that clause.
fn single_or_pregnant_women(roster: &[RescueRecord], caps: &Capabilities) -> usize {
    if !(caps.pregnant || caps.gender) {
        return 0;
    }

    roster
        .iter()
        .filter(|r| {
            r.is_pregnant()
                || (r.is_female() && r.travels_alone())
                || (r.is_female() && r.is_accompanied() && r.accompanied_by_child())
                || (r.is_minor() && r.is_female() && r.companion_not_adult())
        })
        .count()
}

/// Count records per bracket, restricted to `brackets` and listed in that
/// order. Percentages are over the brackets actually present.
fn age_breakdown<'a>(
    records: impl Iterator<Item = &'a RescueRecord>,
    brackets: &[AgeBracket],
) -> Vec<BreakdownRow> {
    let mut counts: BTreeMap<AgeBracket, usize> = BTreeMap::new();
    for age in records.filter_map(|r| r.age) {
        if brackets.contains(&age) {
            *counts.entry(age).or_insert(0) += 1;
        }
    }

    let rows = brackets
        .iter()
        .filter_map(|b| counts.get(b).map(|&n| (b.label().to_string(), n)))
        .collect();
    breakdown(rows)
}

/// Nationalities by descending count; ties keep first-seen order.
fn country_breakdown(roster: &[RescueRecord]) -> Vec<BreakdownRow> {
    let mut rows: Vec<(String, usize)> = Vec::new();
    for country in roster.iter().filter_map(|r| r.country.as_deref()) {
        let label = country.replace('_', " ");
        match rows.iter_mut().find(|(l, _)| *l == label) {
            Some((_, n)) => *n += 1,
            None => rows.push((label, 1)),
        }
    }

    // sort_by is stable
    rows.sort_by(|a, b| b.1.cmp(&a.1));
    breakdown(rows)
}

fn breakdown(rows: Vec<(String, usize)>) -> Vec<BreakdownRow> {
    let total: usize = rows.iter().map(|(_, n)| n).sum();
    rows.into_iter()
        .map(|(label, count)| BreakdownRow {
            label,
            count,
            percent: percent(count, total),
        })
        .collect()
}

pub(crate) fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}
