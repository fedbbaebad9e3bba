use criterion::{criterion_group, criterion_main, Criterion};

use scoreline::data::{build_design_table, read_history, HistoryColumns};
use scoreline::linear::glm::{build_regression_spec, FitConfig, FittedModel};

/// A double round-robin between `teams` teams, with scores derived from the team ordinals.
fn synthetic_history(teams: usize) -> String {
    let mut csv = String::from("season,date,home_team,away_team,home_goals,away_goals\n");
    for home in 0..teams {
        for away in 0..teams {
            if home != away {
                let home_goals = (home * 7 + away * 3) % 4;
                let away_goals = (home * 5 + away * 11) % 3;
                csv.push_str(&format!(
                    "2023,2023-08-05,Team {home},Team {away},{home_goals},{away_goals}\n"
                ));
            }
        }
    }
    csv
}

fn criterion_benchmark(c: &mut Criterion) {
    let csv = synthetic_history(18);
    let history = read_history(csv.as_bytes(), &HistoryColumns::default()).unwrap();
    let table = build_design_table(&history.records, &history.teams).unwrap();
    let spec = build_regression_spec(&history.teams);
    let config = FitConfig::default();

    // sanity check
    let model = FittedModel::fit(spec.clone(), &table, &config).unwrap();
    assert_eq!(2 * history.teams.len(), model.rank);

    c.bench_function("cri_fit_18_teams", |b| {
        b.iter(|| FittedModel::fit(spec.clone(), &table, &config).unwrap());
    });

    c.bench_function("cri_design_table_18_teams", |b| {
        b.iter(|| build_design_table(&history.records, &history.teams).unwrap());
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
