//! 综合测评计算核心
//!
//! 纯函数模块，不访问数据库：
//! - `policy`: 权重与加分类别规则（来自配置）
//! - `calculator`: 原始分项 + 加分明细 → 创新总分、社会服务总分、综测总分
//! - `ranking`: 同一学年学期内的班级排名与年级排名
//!
//! 由存储层在事务中调用。

pub mod calculator;
pub mod policy;
pub mod ranking;

pub use calculator::{ComputedScores, compute_scores, validate_key};
pub use policy::{BonusBucket, EvaluationPolicy};
pub use ranking::{RankAssignment, RankInput, assign_ranks};
