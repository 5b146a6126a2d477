use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::errors::{GradeSystemError, Result};
use crate::models::rankings::entities::TieBreak;

/// 参与排名的一条记录
#[derive(Debug, Clone, PartialEq)]
pub struct RankInput {
    pub evaluation_id: i64,
    pub student_id: i64,
    /// 未能关联到班级时为 None，此时不参与班级排名
    pub class_id: Option<i64>,
    pub total_score: f64,
}

/// 排名结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankAssignment {
    pub evaluation_id: i64,
    pub class_rank: Option<i32>,
    pub grade_rank: i32,
}

/// 总分降序；同分按学号升序，保证结果确定
fn compare(a: &RankInput, b: &RankInput) -> Ordering {
    b.total_score
        .total_cmp(&a.total_score)
        .then_with(|| a.student_id.cmp(&b.student_id))
        .then_with(|| a.evaluation_id.cmp(&b.evaluation_id))
}

fn to_rank(position: usize) -> Result<i32> {
    i32::try_from(position + 1)
        .map_err(|_| GradeSystemError::computation_precondition("排名人数超出范围"))
}

/// 为一个已排序分区内的记录依次计算名次
fn ranks_for(sorted: &[&RankInput], tie_break: TieBreak) -> Result<Vec<i32>> {
    let mut ranks: Vec<i32> = Vec::with_capacity(sorted.len());
    for (position, input) in sorted.iter().enumerate() {
        let rank = match (tie_break, position) {
            (TieBreak::Shared, p) if p > 0 => {
                let previous = sorted[p - 1];
                if previous.total_score.total_cmp(&input.total_score) == Ordering::Equal {
                    ranks[p - 1]
                } else {
                    to_rank(p)?
                }
            }
            _ => to_rank(position)?,
        };
        ranks.push(rank);
    }
    Ok(ranks)
}

/// 计算同一学年学期内所有记录的年级排名与班级排名
///
/// 返回结果按年级排名顺序排列。空集合返回空结果。
pub fn assign_ranks(cohort: &[RankInput], tie_break: TieBreak) -> Result<Vec<RankAssignment>> {
    if let Some(bad) = cohort.iter().find(|r| !r.total_score.is_finite()) {
        return Err(GradeSystemError::computation_precondition(format!(
            "学号 {} 的综测总分不是有效数值，无法排名",
            bad.student_id
        )));
    }

    let mut sorted: Vec<&RankInput> = cohort.iter().collect();
    sorted.sort_by(|a, b| compare(a, b));

    let grade_ranks = ranks_for(&sorted, tie_break)?;

    // 按班级分区（保持全局排序后的相对顺序）
    let mut partitions: BTreeMap<i64, Vec<&RankInput>> = BTreeMap::new();
    for input in sorted.iter().copied() {
        if let Some(class_id) = input.class_id {
            partitions.entry(class_id).or_default().push(input);
        }
    }

    let mut class_ranks: BTreeMap<i64, i32> = BTreeMap::new();
    for members in partitions.values() {
        let ranks = ranks_for(members, tie_break)?;
        for (member, rank) in members.iter().zip(ranks) {
            class_ranks.insert(member.evaluation_id, rank);
        }
    }

    Ok(sorted
        .iter()
        .zip(grade_ranks)
        .map(|(input, grade_rank)| RankAssignment {
            evaluation_id: input.evaluation_id,
            class_rank: class_ranks.get(&input.evaluation_id).copied(),
            grade_rank,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(evaluation_id: i64, student_id: i64, class_id: Option<i64>, total: f64) -> RankInput {
        RankInput {
            evaluation_id,
            student_id,
            class_id,
            total_score: total,
        }
    }

    fn rank_of(result: &[RankAssignment], evaluation_id: i64) -> &RankAssignment {
        result
            .iter()
            .find(|r| r.evaluation_id == evaluation_id)
            .unwrap()
    }

    #[test]
    fn test_empty_cohort_is_noop() {
        let result = assign_ranks(&[], TieBreak::StudentId).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_tie_broken_by_lower_student_id() {
        // 学号 100 与 200 同为 90 分，学号 150 为 75 分
        let cohort = vec![
            input(1, 100, Some(1), 90.0),
            input(2, 150, Some(1), 75.0),
            input(3, 200, Some(1), 90.0),
        ];
        let result = assign_ranks(&cohort, TieBreak::StudentId).unwrap();
        assert_eq!(rank_of(&result, 1).grade_rank, 1);
        assert_eq!(rank_of(&result, 2).grade_rank, 3);
        assert_eq!(rank_of(&result, 3).grade_rank, 2);
        assert_eq!(rank_of(&result, 3).class_rank, Some(2));
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let cohort = vec![
            input(3, 200, Some(1), 90.0),
            input(2, 150, Some(1), 75.0),
            input(1, 100, Some(1), 90.0),
        ];
        let result = assign_ranks(&cohort, TieBreak::StudentId).unwrap();
        assert_eq!(rank_of(&result, 1).grade_rank, 1);
        assert_eq!(rank_of(&result, 3).grade_rank, 2);
        assert_eq!(rank_of(&result, 2).grade_rank, 3);
    }

    #[test]
    fn test_shared_tie_break_skips_next_rank() {
        let cohort = vec![
            input(1, 100, Some(1), 90.0),
            input(2, 150, Some(1), 75.0),
            input(3, 200, Some(1), 90.0),
        ];
        let result = assign_ranks(&cohort, TieBreak::Shared).unwrap();
        assert_eq!(rank_of(&result, 1).grade_rank, 1);
        assert_eq!(rank_of(&result, 3).grade_rank, 1);
        assert_eq!(rank_of(&result, 2).grade_rank, 3);
    }

    #[test]
    fn test_ranks_form_contiguous_permutation() {
        let cohort: Vec<RankInput> = (0..25)
            .map(|i| input(i, 1000 + i, Some(i % 3), ((i * 7) % 11) as f64))
            .collect();
        let result = assign_ranks(&cohort, TieBreak::StudentId).unwrap();

        let mut grade: Vec<i32> = result.iter().map(|r| r.grade_rank).collect();
        grade.sort();
        assert_eq!(grade, (1..=25).collect::<Vec<i32>>());

        for class_id in 0..3 {
            let mut ranks: Vec<i32> = cohort
                .iter()
                .filter(|c| c.class_id == Some(class_id))
                .map(|c| rank_of(&result, c.evaluation_id).class_rank.unwrap())
                .collect();
            ranks.sort();
            let n = ranks.len() as i32;
            assert_eq!(ranks, (1..=n).collect::<Vec<i32>>());
        }
    }

    #[test]
    fn test_idempotent() {
        let cohort = vec![
            input(1, 10, Some(1), 80.5),
            input(2, 11, Some(2), 92.0),
            input(3, 12, None, 80.5),
            input(4, 13, Some(1), 60.0),
        ];
        let first = assign_ranks(&cohort, TieBreak::StudentId).unwrap();
        let second = assign_ranks(&cohort, TieBreak::StudentId).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unresolved_class_gets_grade_rank_only() {
        let cohort = vec![
            input(1, 10, None, 99.0),
            input(2, 11, Some(5), 50.0),
        ];
        let result = assign_ranks(&cohort, TieBreak::StudentId).unwrap();
        assert_eq!(rank_of(&result, 1).grade_rank, 1);
        assert_eq!(rank_of(&result, 1).class_rank, None);
        assert_eq!(rank_of(&result, 2).grade_rank, 2);
        assert_eq!(rank_of(&result, 2).class_rank, Some(1));
    }

    #[test]
    fn test_class_ranks_independent_per_class() {
        let cohort = vec![
            input(1, 10, Some(1), 70.0),
            input(2, 11, Some(2), 60.0),
            input(3, 12, Some(1), 90.0),
            input(4, 13, Some(2), 95.0),
        ];
        let result = assign_ranks(&cohort, TieBreak::StudentId).unwrap();
        assert_eq!(rank_of(&result, 3).class_rank, Some(1));
        assert_eq!(rank_of(&result, 1).class_rank, Some(2));
        assert_eq!(rank_of(&result, 4).class_rank, Some(1));
        assert_eq!(rank_of(&result, 2).class_rank, Some(2));
        assert_eq!(rank_of(&result, 4).grade_rank, 1);
    }

    #[test]
    fn test_non_finite_total_is_precondition_failure() {
        let cohort = vec![input(1, 10, None, f64::NAN)];
        let err = assign_ranks(&cohort, TieBreak::StudentId).unwrap_err();
        assert_eq!(err.code(), "E014");
    }
}
