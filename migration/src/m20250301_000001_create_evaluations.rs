use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ==================== 综合测评表 ====================
        manager
            .create_table(
                Table::create()
                    .table(ComprehensiveEvaluations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ComprehensiveEvaluations::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ComprehensiveEvaluations::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ComprehensiveEvaluations::AcademicYear)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ComprehensiveEvaluations::Semester)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ComprehensiveEvaluations::PhysicalScore).double().null())
                    .col(ColumnDef::new(ComprehensiveEvaluations::MoralScore).double().null())
                    .col(ColumnDef::new(ComprehensiveEvaluations::Gpa).double().null())
                    .col(ColumnDef::new(ComprehensiveEvaluations::AcademicScore).double().null())
                    .col(
                        ColumnDef::new(ComprehensiveEvaluations::InnovationBasicScore)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ComprehensiveEvaluations::InnovationBonusScore)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ComprehensiveEvaluations::StudentWorkScore)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ComprehensiveEvaluations::SocialServiceScore)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ComprehensiveEvaluations::SocialRewardScore)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ComprehensiveEvaluations::CulturalSportsScore)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ComprehensiveEvaluations::InnovationTotalScore)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(ComprehensiveEvaluations::SocialTotalScore)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(ComprehensiveEvaluations::TotalScore)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(ComprehensiveEvaluations::ClassRank).integer().null())
                    .col(ColumnDef::new(ComprehensiveEvaluations::GradeRank).integer().null())
                    .col(
                        ColumnDef::new(ComprehensiveEvaluations::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ComprehensiveEvaluations::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                ComprehensiveEvaluations::Table,
                                ComprehensiveEvaluations::StudentId,
                            )
                            .to(Students::Table, Students::StudentId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 加分明细表 ====================
        manager
            .create_table(
                Table::create()
                    .table(BonusDetails::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BonusDetails::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BonusDetails::EvaluationId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BonusDetails::Category).string().not_null())
                    .col(ColumnDef::new(BonusDetails::ItemName).string().not_null())
                    .col(ColumnDef::new(BonusDetails::Score).double().not_null())
                    .col(ColumnDef::new(BonusDetails::Description).text().null())
                    .col(
                        ColumnDef::new(BonusDetails::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(BonusDetails::Table, BonusDetails::EvaluationId)
                            .to(
                                ComprehensiveEvaluations::Table,
                                ComprehensiveEvaluations::Id,
                            )
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一学生同一学年学期只允许一条综测记录
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uk_evaluations_student_term")
                    .table(ComprehensiveEvaluations::Table)
                    .col(ComprehensiveEvaluations::StudentId)
                    .col(ComprehensiveEvaluations::AcademicYear)
                    .col(ComprehensiveEvaluations::Semester)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_evaluations_cohort")
                    .table(ComprehensiveEvaluations::Table)
                    .col(ComprehensiveEvaluations::AcademicYear)
                    .col(ComprehensiveEvaluations::Semester)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_bonus_details_evaluation_id")
                    .table(BonusDetails::Table)
                    .col(BonusDetails::EvaluationId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BonusDetails::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ComprehensiveEvaluations::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Students {
    #[sea_orm(iden = "students")]
    Table,
    StudentId,
}

#[derive(DeriveIden)]
enum ComprehensiveEvaluations {
    #[sea_orm(iden = "comprehensive_evaluations")]
    Table,
    Id,
    StudentId,
    AcademicYear,
    Semester,
    PhysicalScore,
    MoralScore,
    Gpa,
    AcademicScore,
    InnovationBasicScore,
    InnovationBonusScore,
    StudentWorkScore,
    SocialServiceScore,
    SocialRewardScore,
    CulturalSportsScore,
    InnovationTotalScore,
    SocialTotalScore,
    TotalScore,
    ClassRank,
    GradeRank,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum BonusDetails {
    #[sea_orm(iden = "bonus_details")]
    Table,
    Id,
    EvaluationId,
    Category,
    ItemName,
    Score,
    Description,
    CreatedAt,
}
