//! Column names of the academic-records dataset and the standard preprocessing chain for it.
//!
//! The loader that produces the table is external; these constants are the contract with it.

use crate::pipeline::{Pipeline, Stage};
use crate::processing::{
    AttendanceDeficiency, DifficultyFlag, DropColumns, EmptyGradePolicy, FillWith, GradeAverage,
    NormalizeGrade,
};
use crate::resample::{Rebalance, SamplerKind};
use crate::types::Value;

/// Student name; not a feature.
pub const NOME: &str = "NOME";

/// Failure count, subject DE.
pub const REPROVACOES_DE: &str = "REPROVACOES_DE";
/// Failure count, subject EM.
pub const REPROVACOES_EM: &str = "REPROVACOES_EM";
/// Failure count, subject MF.
pub const REPROVACOES_MF: &str = "REPROVACOES_MF";
/// Failure count, subject GO.
pub const REPROVACOES_GO: &str = "REPROVACOES_GO";

/// Grade, subject DE. Normalized to 0..=10.
pub const NOTA_DE: &str = "NOTA_DE";
/// Grade, subject EM. Normalized to 0..=10.
pub const NOTA_EM: &str = "NOTA_EM";
/// Grade, subject MF. Normalized to 0..=10.
pub const NOTA_MF: &str = "NOTA_MF";
/// Grade, subject GO. Normalized to 0..=10.
pub const NOTA_GO: &str = "NOTA_GO";

/// English (`INGLES`) column.
pub const INGLES: &str = "INGLES";
/// Online assignment count.
pub const TAREFAS_ONLINE: &str = "TAREFAS_ONLINE";
/// Expected attendance hours.
pub const H_AULA_PRES: &str = "H_AULA_PRES";
/// Absence count.
pub const FALTAS: &str = "FALTAS";

/// Classification target.
pub const PERFIL: &str = "PERFIL";

/// Derived: attendance deficiency flag.
pub const FALTOSO: &str = "FALTOSO";
/// Derived: grade average.
pub const MEDIA_GERAL: &str = "MEDIA_GERAL";
/// Derived: difficulty flag.
pub const DIFICULDADE: &str = "DIFICULDADE";

/// Failure counts per subject.
pub const FAILURE_COLUMNS: [&str; 4] = [REPROVACOES_DE, REPROVACOES_EM, REPROVACOES_MF, REPROVACOES_GO];

/// Grades per subject.
pub const GRADE_COLUMNS: [&str; 4] = [NOTA_DE, NOTA_EM, NOTA_MF, NOTA_GO];

/// Columns derived by [`standard_pipeline`].
pub const DERIVED_COLUMNS: [&str; 3] = [FALTOSO, MEDIA_GERAL, DIFICULDADE];

/// Features handed to the oversampler and the trainer: the raw counts and grades followed by
/// [`DERIVED_COLUMNS`]. Boolean features are encoded as 0/1.
pub fn default_features() -> Vec<String> {
    FAILURE_COLUMNS
        .into_iter()
        .chain(GRADE_COLUMNS)
        .chain([INGLES, H_AULA_PRES, TAREFAS_ONLINE, FALTAS])
        .chain(DERIVED_COLUMNS)
        .map(str::to_string)
        .collect()
}

/// The usual chain for this dataset: drop the name, zero-fill counts, derive the attendance and
/// grade features, normalize every grade with `policy`, flag difficulty, then rebalance
/// `PERFIL` with SMOTE.
pub fn standard_pipeline(policy: EmptyGradePolicy, seed: Option<u64>) -> Pipeline {
    let mut stages = vec![Stage::DropColumns(DropColumns::new([NOME]).ignore_missing())];

    for column in FAILURE_COLUMNS
        .into_iter()
        .chain([INGLES, TAREFAS_ONLINE, H_AULA_PRES, FALTAS])
    {
        stages.push(Stage::FillWith(FillWith::value(column, Value::Int64(0))));
    }

    stages.push(Stage::AttendanceDeficiency(AttendanceDeficiency::default()));
    stages.push(Stage::GradeAverage(GradeAverage::default()));
    for column in GRADE_COLUMNS {
        stages.push(Stage::NormalizeGrade(NormalizeGrade::new(column, policy)));
    }
    stages.push(Stage::DifficultyFlag(DifficultyFlag::default()));

    let mut rebalance = Rebalance::new(default_features(), SamplerKind::default());
    rebalance.seed = seed;
    stages.push(Stage::Rebalance(rebalance));

    Pipeline::new(stages).with_target(PERFIL)
}
