use proptest::prelude::*;

use profile_features::processing::{
    grade_average, normalize_grade, DifficultyFlag, DropColumns, EmptyGradePolicy, FillStrategy,
    FillWith, GradeAverage, Transform,
};
use profile_features::resample::{Rebalance, SamplerKind};
use profile_features::types::{DataType, Field, Schema, Table, Value};

const GRADES: [&str; 4] = ["NOTA_DE", "NOTA_EM", "NOTA_MF", "NOTA_GO"];

fn grade() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        Just(None),
        Just(Some(0.0)),
        Just(Some(f64::NAN)),
        (0.1f64..15.0).prop_map(Some),
    ]
}

fn to_value(g: Option<f64>) -> Value {
    g.map_or(Value::Null, Value::Float64)
}

fn grade_rows() -> impl Strategy<Value = Vec<[Option<f64>; 4]>> {
    prop::collection::vec([grade(), grade(), grade(), grade()], 1..20)
}

fn grades_table(rows: &[[Option<f64>; 4]]) -> Table {
    let schema = Schema::new(
        GRADES
            .iter()
            .map(|g| Field::new(*g, DataType::Float64))
            .collect(),
    );
    Table::new(
        schema,
        rows.iter()
            .map(|r| r.iter().map(|g| to_value(*g)).collect())
            .collect(),
    )
}

fn fill_strategy() -> impl Strategy<Value = FillStrategy> {
    prop_oneof![
        (0.0f64..10.0).prop_map(|v| FillStrategy::Value(Value::Float64(v))),
        Just(FillStrategy::Mean),
        Just(FillStrategy::Median),
        Just(FillStrategy::MostFrequent),
    ]
}

proptest! {
    #[test]
    fn drop_columns_keeps_the_rest_in_order(
        rows in grade_rows(),
        mask in prop::array::uniform4(any::<bool>()),
    ) {
        let table = grades_table(&rows);
        let dropped: Vec<&str> = GRADES.iter().zip(mask).filter(|(_, m)| *m).map(|(g, _)| *g).collect();
        let out = DropColumns::new(dropped.clone()).apply(&table).unwrap();

        let expected: Vec<&str> = GRADES.iter().copied().filter(|g| !dropped.contains(g)).collect();
        prop_assert_eq!(out.schema.field_names().collect::<Vec<_>>(), expected);
        prop_assert_eq!(out.row_count(), table.row_count());
        prop_assert!(out.rows.iter().all(|r| r.len() == out.column_count()));
    }

    #[test]
    fn fill_leaves_no_missing_values(rows in grade_rows(), fill in fill_strategy(), col in 0usize..4) {
        let table = grades_table(&rows);
        let column = GRADES[col];
        let all_missing = table.column(column).unwrap().iter().all(|v| v.is_missing());
        let out = FillWith::new(column, fill.clone()).apply(&table).unwrap();

        let values = out.column(column).unwrap();
        if all_missing && !matches!(fill, FillStrategy::Value(_)) {
            // No statistic to fill with; the column is left as is.
            prop_assert!(values.iter().all(|v| v.is_missing()));
        } else {
            prop_assert!(values.iter().all(|v| !v.is_missing()));
        }
    }

    #[test]
    fn grade_average_counts_only_positive_grades(row in [grade(), grade(), grade(), grade()]) {
        let avg = grade_average(&row.map(|g| g.filter(|v| !v.is_nan())));
        prop_assert!(avg >= 0.0);
        if row.iter().all(|g| g.is_none_or(|v| v.is_nan() || v <= 0.0)) {
            prop_assert_eq!(avg, 0.0);
        } else {
            prop_assert!(avg > 0.0);
        }
    }

    #[test]
    fn normalized_grades_stay_in_range(
        g in grade(),
        avg in 0.0f64..15.0,
        pass_fail in any::<bool>(),
    ) {
        let policy = if pass_fail { EmptyGradePolicy::PassFail } else { EmptyGradePolicy::RowAverage };
        let g = g.filter(|v| !v.is_nan());
        let out = normalize_grade(g, avg, policy);
        prop_assert!((0.0..=10.0).contains(&out));
        if let Some(v) = g.filter(|v| *v > 0.0 && *v <= 10.0) {
            prop_assert_eq!(out, v);
        }
    }

    #[test]
    fn difficulty_flag_marks_zero_averages(rows in grade_rows()) {
        let table = grades_table(&rows);
        let averaged = GradeAverage::default().apply(&table).unwrap();
        let out = DifficultyFlag::default().apply(&averaged).unwrap();

        for (avg, flag) in out
            .column("MEDIA_GERAL")
            .unwrap()
            .into_iter()
            .zip(out.column("DIFICULDADE").unwrap())
        {
            prop_assert_eq!(flag, &Value::Bool(avg.as_f64() == Some(0.0)));
        }
    }

    #[test]
    fn rebalance_never_loses_rows(
        labels in prop::collection::vec(0usize..3, 2..30),
        seed in any::<u64>(),
        smote in any::<bool>(),
    ) {
        let distinct = {
            let mut l = labels.clone();
            l.sort_unstable();
            l.dedup();
            l.len()
        };
        let smallest = (0..3)
            .map(|c| labels.iter().filter(|l| **l == c).count())
            .filter(|n| *n > 0)
            .min()
            .unwrap_or(0);
        prop_assume!(distinct >= 2 && smallest >= 2);

        let schema = Schema::new(vec![
            Field::new("x", DataType::Float64),
            Field::new("y", DataType::Int64),
            Field::new("PERFIL", DataType::Utf8),
        ]);
        let rows = labels
            .iter()
            .enumerate()
            .map(|(i, l)| vec![
                Value::Float64(i as f64 * 0.5),
                Value::Int64(*l as i64),
                Value::Utf8(format!("P{l}")),
            ])
            .collect();
        let table = Table::new(schema, rows);

        let sampler = if smote { SamplerKind::default() } else { SamplerKind::Random };
        let out = Rebalance::new(vec!["x".to_string(), "y".to_string()], sampler)
            .with_seed(seed)
            .apply(&table, "PERFIL")
            .unwrap();

        prop_assert!(out.row_count() >= table.row_count());
        let targets = out.column("PERFIL").unwrap();
        prop_assert!(targets.iter().all(|v| !v.is_missing()));

        let counts: Vec<usize> = (0..3)
            .map(|c| targets.iter().filter(|v| ***v == Value::Utf8(format!("P{c}"))).count())
            .filter(|n| *n > 0)
            .collect();
        prop_assert!(counts.windows(2).all(|w| w[0] == w[1]));

        // Originals come first and are unchanged.
        for (orig, kept) in table.rows.iter().zip(&out.rows) {
            prop_assert_eq!(&orig[0], &kept[0]);
            prop_assert_eq!(&orig[2], &kept[2]);
        }
    }
}
