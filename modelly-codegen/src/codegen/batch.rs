//! Chunking of bulk operations under a per-statement parameter budget

use serde::{Deserialize, Serialize};

/// Maximum parameters per generated statement (SQL Server allows 2100)
pub const DEFAULT_PARAM_BUDGET: usize = 1000;

/// Per-row parameter count assumed by supplied-connection bulk inserts/updates
/// under [`BudgetPolicy::Compatible`]
pub const TRANSACTIONAL_PARAMS_DIVISOR: usize = 4;

/// Contiguous, half-open range of input items sent in one statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchRange {
    pub start: usize,
    pub len: usize,
}

impl BatchRange {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

impl std::fmt::Display for BatchRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end())
    }
}

/// Ordered chunk ranges for one bulk call
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BatchPlan {
    pub ranges: Vec<BatchRange>,
}

impl BatchPlan {
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BatchRange> {
        self.ranges.iter()
    }
}

/// Largest chunk that keeps `len * params_per_item` within the budget, never below 1
pub fn max_chunk_len(params_per_item: usize, param_budget: usize) -> usize {
    if params_per_item == 0 {
        return param_budget.max(1);
    }
    (param_budget / params_per_item).max(1)
}

/// Split `item_count` items into ranges of at most `param_budget / params_per_item`
pub fn plan(item_count: usize, params_per_item: usize, param_budget: usize) -> BatchPlan {
    if item_count == 0 {
        return BatchPlan::default();
    }

    let max = max_chunk_len(params_per_item, param_budget);
    if item_count <= max {
        return BatchPlan {
            ranges: vec![BatchRange {
                start: 0,
                len: item_count,
            }],
        };
    }

    let full = item_count / max;
    let mut ranges: Vec<BatchRange> = (0..full)
        .map(|i| BatchRange {
            start: i * max,
            len: max,
        })
        .collect();

    let remainder = item_count - full * max;
    if remainder > 0 {
        ranges.push(BatchRange {
            start: full * max,
            len: remainder,
        });
    }

    BatchPlan { ranges }
}

/// Bulk operations that are split into chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BulkOperation {
    GetMultiple,
    InsertMultiple,
    UpdateMultiple,
    DeleteMultiple,
}

impl BulkOperation {
    pub const ALL: [BulkOperation; 4] = [
        BulkOperation::GetMultiple,
        BulkOperation::InsertMultiple,
        BulkOperation::UpdateMultiple,
        BulkOperation::DeleteMultiple,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BulkOperation::GetMultiple => "GetMultiple",
            BulkOperation::InsertMultiple => "InsertMultiple",
            BulkOperation::UpdateMultiple => "UpdateMultiple",
            BulkOperation::DeleteMultiple => "DeleteMultiple",
        }
    }
}

impl std::fmt::Display for BulkOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who owns the connection and transaction of a generated data-access method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionVariant {
    /// Opens its own connection and commits its own transaction
    Ambient,
    /// Receives connection + transaction from the caller and never commits
    Supplied,
}

/// How per-row parameter counts are derived for chunk sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPolicy {
    /// Ambient insert/update divide by the table's total column count, supplied-connection
    /// insert/update by [`TRANSACTIONAL_PARAMS_DIVISOR`]
    #[default]
    Compatible,
    /// Divide by the parameters actually bound per row, for every variant
    Exact,
}

impl std::str::FromStr for BudgetPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compatible" => Ok(BudgetPolicy::Compatible),
            "exact" => Ok(BudgetPolicy::Exact),
            other => Err(format!(
                "unknown budget policy `{}` (expected `compatible` or `exact`)",
                other
            )),
        }
    }
}

/// Column counts of one table that drive chunk sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnCounts {
    /// Columns written by INSERT / UPDATE
    pub non_key: usize,
    /// Every declared column; equals `non_key` when the key is assumed
    pub total: usize,
}

impl ColumnCounts {
    pub fn new(non_key: usize, total: usize) -> Self {
        Self {
            non_key,
            total: total.max(non_key),
        }
    }
}

/// Sizes every bulk operation of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamBudget {
    pub budget: usize,
    pub transactional_divisor: usize,
    pub policy: BudgetPolicy,
}

impl Default for ParamBudget {
    fn default() -> Self {
        Self {
            budget: DEFAULT_PARAM_BUDGET,
            transactional_divisor: TRANSACTIONAL_PARAMS_DIVISOR,
            policy: BudgetPolicy::Compatible,
        }
    }
}

impl ParamBudget {
    /// Parameters bound per row for one statement of `op`
    pub fn bound_params(op: BulkOperation, columns: ColumnCounts) -> usize {
        match op {
            BulkOperation::GetMultiple | BulkOperation::DeleteMultiple => 1,
            BulkOperation::InsertMultiple => columns.non_key,
            BulkOperation::UpdateMultiple => columns.non_key + 1,
        }
    }

    /// Per-row divisor used for chunk sizing under the configured policy
    pub fn params_per_item(
        &self,
        op: BulkOperation,
        variant: ConnectionVariant,
        columns: ColumnCounts,
    ) -> usize {
        match (self.policy, op, variant) {
            (_, BulkOperation::GetMultiple | BulkOperation::DeleteMultiple, _) => 1,
            (BudgetPolicy::Exact, _, _) => Self::bound_params(op, columns),
            (BudgetPolicy::Compatible, _, ConnectionVariant::Ambient) => columns.total,
            (BudgetPolicy::Compatible, _, ConnectionVariant::Supplied) => {
                self.transactional_divisor
            }
        }
    }

    /// Items per statement for `op` in `variant`
    pub fn chunk_size(
        &self,
        op: BulkOperation,
        variant: ConnectionVariant,
        columns: ColumnCounts,
    ) -> usize {
        max_chunk_len(self.params_per_item(op, variant, columns), self.budget)
    }

    /// Parameters a full chunk actually binds, when that exceeds the budget
    pub fn overflow(
        &self,
        op: BulkOperation,
        variant: ConnectionVariant,
        columns: ColumnCounts,
    ) -> Option<usize> {
        let bound = self.chunk_size(op, variant, columns) * Self::bound_params(op, columns);
        (bound > self.budget).then_some(bound)
    }

    /// Plan `item_count` items of `op`
    pub fn plan(
        &self,
        op: BulkOperation,
        variant: ConnectionVariant,
        columns: ColumnCounts,
        item_count: usize,
    ) -> BatchPlan {
        plan(
            item_count,
            self.params_per_item(op, variant, columns),
            self.budget,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_covers(plan: &BatchPlan, item_count: usize) {
        let mut next = 0;
        for range in plan.iter() {
            assert!(range.len > 0, "zero-length range in {:?}", plan);
            assert_eq!(range.start, next, "gap or overlap in {:?}", plan);
            next = range.end();
        }
        assert_eq!(next, item_count);
    }

    #[test]
    fn test_plan_with_remainder() {
        let plan = plan(2500, 1, 1000);
        assert_eq!(
            plan.ranges,
            vec![
                BatchRange { start: 0, len: 1000 },
                BatchRange { start: 1000, len: 1000 },
                BatchRange { start: 2000, len: 500 },
            ]
        );
    }

    #[test]
    fn test_plan_exact_multiple_has_no_trailing_range() {
        let plan = plan(2000, 1, 1000);
        assert_eq!(
            plan.ranges,
            vec![
                BatchRange { start: 0, len: 1000 },
                BatchRange { start: 1000, len: 1000 },
            ]
        );
    }

    #[test]
    fn test_plan_empty() {
        assert!(plan(0, 1, 1000).is_empty());
        assert!(plan(0, 5000, 1).is_empty());
    }

    #[test]
    fn test_plan_single_range() {
        let plan = plan(10, 3, 1000);
        assert_eq!(plan.ranges, vec![BatchRange { start: 0, len: 10 }]);
    }

    #[test]
    fn test_plan_clamps_when_row_exceeds_budget() {
        let plan = plan(3, 50, 10);
        assert_eq!(plan.len(), 3);
        assert!(plan.iter().all(|r| r.len == 1));
    }

    #[test]
    fn test_plan_invariants() {
        for budget in [1, 2, 7, 100, 1000] {
            for per_item in [0, 1, 3, 4, 9, 250, 2000] {
                for count in [0, 1, 5, 99, 100, 101, 1234, 2500] {
                    let plan = plan(count, per_item, budget);
                    assert_covers(&plan, count);
                    if per_item > 0 && per_item <= budget {
                        for range in plan.iter() {
                            assert!(range.len * per_item <= budget);
                        }
                    }
                }
            }
        }
    }

    /// Id key plus `non_key` other columns
    fn keyed(non_key: usize) -> ColumnCounts {
        ColumnCounts::new(non_key, non_key + 1)
    }

    #[test]
    fn test_compatible_policy() {
        let budget = ParamBudget::default();
        let ambient = ConnectionVariant::Ambient;
        let supplied = ConnectionVariant::Supplied;

        // Ambient divides by every column, key included
        assert_eq!(budget.chunk_size(BulkOperation::InsertMultiple, ambient, keyed(2)), 333);
        assert_eq!(budget.chunk_size(BulkOperation::UpdateMultiple, ambient, keyed(2)), 333);
        assert_eq!(budget.chunk_size(BulkOperation::UpdateMultiple, ambient, keyed(6)), 142);
        assert_eq!(budget.chunk_size(BulkOperation::InsertMultiple, supplied, keyed(2)), 250);
        assert_eq!(budget.chunk_size(BulkOperation::UpdateMultiple, supplied, keyed(9)), 250);
        assert_eq!(budget.chunk_size(BulkOperation::GetMultiple, supplied, keyed(9)), 1000);
        assert_eq!(budget.chunk_size(BulkOperation::DeleteMultiple, ambient, keyed(9)), 1000);
    }

    #[test]
    fn test_compatible_ambient_fits_budget_with_real_key() {
        let budget = ParamBudget::default();
        for non_key in 1..40 {
            for op in BulkOperation::ALL {
                assert_eq!(
                    budget.overflow(op, ConnectionVariant::Ambient, keyed(non_key)),
                    None,
                    "{} with {} non-key column(s)",
                    op,
                    non_key
                );
            }
        }
    }

    #[test]
    fn test_column_counts_total_never_below_non_key() {
        assert_eq!(ColumnCounts::new(3, 0), ColumnCounts { non_key: 3, total: 3 });
        assert_eq!(ColumnCounts::new(3, 4).total, 4);
    }

    #[test]
    fn test_compatible_transactional_insert_ranges() {
        let budget = ParamBudget::default();
        let plan = budget.plan(
            BulkOperation::InsertMultiple,
            ConnectionVariant::Supplied,
            keyed(2),
            600,
        );
        assert_eq!(
            plan.ranges,
            vec![
                BatchRange { start: 0, len: 250 },
                BatchRange { start: 250, len: 250 },
                BatchRange { start: 500, len: 100 },
            ]
        );
    }

    #[test]
    fn test_compatible_policy_reports_overflow() {
        let budget = ParamBudget::default();
        // 250 rows * 9 params
        assert_eq!(
            budget.overflow(
                BulkOperation::InsertMultiple,
                ConnectionVariant::Supplied,
                keyed(9)
            ),
            Some(2250)
        );
        // Assumed key: 333 rows * (3 + 1) params
        assert_eq!(
            budget.overflow(
                BulkOperation::UpdateMultiple,
                ConnectionVariant::Ambient,
                ColumnCounts::new(3, 3)
            ),
            Some(1332)
        );
        assert_eq!(
            budget.overflow(
                BulkOperation::InsertMultiple,
                ConnectionVariant::Ambient,
                ColumnCounts::new(3, 3)
            ),
            None
        );
    }

    #[test]
    fn test_exact_policy_never_exceeds_budget() {
        let budget = ParamBudget {
            policy: BudgetPolicy::Exact,
            ..ParamBudget::default()
        };
        for non_key in 1..40 {
            for op in BulkOperation::ALL {
                for variant in [ConnectionVariant::Ambient, ConnectionVariant::Supplied] {
                    for columns in [keyed(non_key), ColumnCounts::new(non_key, non_key)] {
                        assert_eq!(budget.overflow(op, variant, columns), None);
                    }
                }
            }
        }
        assert_eq!(
            budget.chunk_size(
                BulkOperation::UpdateMultiple,
                ConnectionVariant::Supplied,
                keyed(3)
            ),
            250
        );
    }

    #[test]
    fn test_budget_policy_from_str() {
        assert_eq!("Exact".parse::<BudgetPolicy>(), Ok(BudgetPolicy::Exact));
        assert_eq!(
            "compatible".parse::<BudgetPolicy>(),
            Ok(BudgetPolicy::Compatible)
        );
        assert!("strict".parse::<BudgetPolicy>().is_err());
    }
}
