//! Partition flat sample records into per-problem groups.
//!
//! Grouping is a single deterministic pass: problems appear in first-seen
//! order and members keep their input order, so the same input always yields
//! the same groups.

use indexmap::IndexMap;
use indexmap::map::Values;
use tracing::debug;

use crate::data::SampleRecord;
use crate::key::KeyDeriver;
use crate::types::ProblemId;

/// All generations of one problem.
#[derive(Clone, Debug, PartialEq)]
pub struct ProblemGroup {
    /// Canonical problem id (post key derivation).
    pub problem_id: ProblemId,
    /// Member records in input order. Never empty.
    pub members: Vec<SampleRecord>,
    /// Generation index per member, aligned with `members`.
    indices: Vec<Option<u32>>,
}

impl ProblemGroup {
    fn new(problem_id: ProblemId) -> Self {
        Self {
            problem_id,
            members: Vec::new(),
            indices: Vec::new(),
        }
    }

    fn push(&mut self, record: SampleRecord, index: Option<u32>) {
        self.members.push(record);
        self.indices.push(index);
    }

    /// Number of generations recorded for this problem.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false for groups built by [`group_records`].
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members whose verdict reports `pass`.
    pub fn passed_count(&self) -> usize {
        self.members
            .iter()
            .filter(|record| record.verdict.pass)
            .count()
    }

    /// Members ordered by generation index.
    ///
    /// Indexed members come first in ascending index order, unindexed members
    /// follow; the sort is stable so equal keys keep input order.
    pub fn canonical_members(&self) -> Vec<&SampleRecord> {
        let mut order: Vec<usize> = (0..self.members.len()).collect();
        order.sort_by_key(|&pos| match self.indices[pos] {
            Some(index) => (false, index),
            None => (true, 0),
        });
        order.into_iter().map(|pos| &self.members[pos]).collect()
    }
}

/// Problem groups keyed by canonical problem id, in first-seen order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProblemGroups {
    groups: IndexMap<ProblemId, ProblemGroup>,
}

impl ProblemGroups {
    /// Number of distinct problems.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// True when no records were grouped.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of records across all groups.
    pub fn sample_count(&self) -> usize {
        self.groups.values().map(ProblemGroup::len).sum()
    }

    /// Look up one problem.
    pub fn get(&self, problem_id: &str) -> Option<&ProblemGroup> {
        self.groups.get(problem_id)
    }

    /// Iterate groups in first-seen order.
    pub fn iter(&self) -> Values<'_, ProblemId, ProblemGroup> {
        self.groups.values()
    }

    /// Flat view over every member record, group by group.
    pub fn records(&self) -> impl Iterator<Item = &SampleRecord> {
        self.groups.values().flat_map(|group| group.members.iter())
    }
}

impl<'a> IntoIterator for &'a ProblemGroups {
    type Item = &'a ProblemGroup;
    type IntoIter = Values<'a, ProblemId, ProblemGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Group `records` by the problem identity `keys` derives for each one.
///
/// Every record lands in exactly one group; an empty input yields no groups.
pub fn group_records<I>(records: I, keys: &KeyDeriver) -> ProblemGroups
where
    I: IntoIterator<Item = SampleRecord>,
{
    let mut groups: IndexMap<ProblemId, ProblemGroup> = IndexMap::new();
    let mut total = 0usize;
    for record in records {
        let problem_id = keys.key_for(&record);
        let index = keys.index_for(&record);
        groups
            .entry(problem_id.clone())
            .or_insert_with(|| ProblemGroup::new(problem_id))
            .push(record, index);
        total += 1;
    }
    debug!(
        records = total,
        problems = groups.len(),
        marker = keys.marker(),
        "grouped sample records"
    );
    ProblemGroups { groups }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Verdict;

    fn sample(id: &str, pass: bool) -> SampleRecord {
        SampleRecord::new(id, format!("code for {id}"), Verdict::new(pass, pass))
    }

    #[test]
    fn group_records_partitions_by_base_id() {
        let records = vec![
            sample("p1_g0", true),
            sample("p2_g0", false),
            sample("p1_g1", false),
            sample("solo", true),
        ];
        let groups = group_records(records, &KeyDeriver::default());
        assert_eq!(groups.len(), 3);
        assert_eq!(groups.sample_count(), 4);
        let ids: Vec<&str> = groups.iter().map(|g| g.problem_id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2", "solo"]);
        let p1 = groups.get("p1").expect("p1");
        assert_eq!(p1.len(), 2);
        assert_eq!(p1.passed_count(), 1);
        assert_eq!(p1.members[0].sample_id, "p1_g0");
        assert_eq!(p1.members[1].sample_id, "p1_g1");
    }

    #[test]
    fn group_records_on_empty_input_is_empty() {
        let groups = group_records(Vec::new(), &KeyDeriver::default());
        assert!(groups.is_empty());
        assert_eq!(groups.sample_count(), 0);
        assert_eq!(groups.records().count(), 0);
    }

    #[test]
    fn canonical_members_sorts_by_generation_index() {
        let records = vec![
            sample("p1_g10", false),
            sample("p1_g2", false),
            sample("p1_g0", false),
        ];
        let groups = group_records(records, &KeyDeriver::default());
        let order: Vec<&str> = groups
            .get("p1")
            .expect("p1")
            .canonical_members()
            .into_iter()
            .map(|record| record.sample_id.as_str())
            .collect();
        assert_eq!(order, vec!["p1_g0", "p1_g2", "p1_g10"]);
    }

    #[test]
    fn canonical_members_keeps_input_order_without_indices() {
        let records = vec![
            sample("dup", false).with_problem_id("first"),
            sample("dup", true).with_problem_id("second"),
        ];
        let groups = group_records(records, &KeyDeriver::default());
        let group = groups.get("dup").expect("dup");
        let order: Vec<&str> = group
            .canonical_members()
            .into_iter()
            .map(|record| record.problem_id.as_str())
            .collect();
        assert_eq!(order, vec!["first", "second"]);
    }
}
