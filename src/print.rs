//! Console tables.

use stanza::style::{HAlign, Header, MinWidth, Separator, Styles};
use stanza::table::{Cell, Col, Row, Table};

use crate::model::ModelSummary;
use crate::predict::PredictionResult;
use crate::ranking::{RankedTeam, TeamComparison, TeamProfile};

fn percent(prob: f64) -> String {
    format!("{:.1}%", prob * 100.0)
}

fn right(content: String) -> Cell {
    Cell::new(Styles::default().with(HAlign::Right), content.into())
}

/// The scoregrid in percent, home goals down the side and away goals across the top.
pub fn tabulate_scoregrid(prediction: &PredictionResult) -> Table {
    let scoregrid = &prediction.scoregrid;
    let mut table = Table::default()
        .with_cols({
            let mut cols = vec![Col::new(
                Styles::default()
                    .with(Separator(true))
                    .with(MinWidth(12))
                    .with(HAlign::Centred),
            )];
            for _ in 0..scoregrid.cols() {
                cols.push(Col::new(
                    Styles::default().with(MinWidth(7)).with(HAlign::Right),
                ));
            }
            cols
        })
        .with_row({
            let mut header_cells = vec![format!(
                "{} \\ {}",
                prediction.home_team.name, prediction.away_team.name
            )
            .into()];
            for away_goals in 0..scoregrid.cols() {
                header_cells.push(format!("{away_goals}").into());
            }
            Row::new(
                Styles::default().with(Header(true)).with(Separator(true)),
                header_cells,
            )
        });
    for home_goals in 0..scoregrid.rows() {
        let mut row_cells = vec![format!("{home_goals}").into()];
        for &prob in &scoregrid[home_goals] {
            row_cells.push(percent(prob).into());
        }
        table.push_row(Row::new(Styles::default(), row_cells));
    }
    table
}

pub fn tabulate_prediction(prediction: &PredictionResult) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(30))),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec![
                format!("{} vs {}", prediction.home_team.name, prediction.away_team.name).into(),
                "".into(),
            ],
        ));
    let rows = [
        (
            format!("Expected goals ({})", prediction.home_team.name),
            format!("{:.3}", prediction.expected_goals_home),
        ),
        (
            format!("Expected goals ({})", prediction.away_team.name),
            format!("{:.3}", prediction.expected_goals_away),
        ),
        (format!("{} win", prediction.home_team.name), percent(prediction.home_win)),
        ("Draw".into(), percent(prediction.draw)),
        (format!("{} win", prediction.away_team.name), percent(prediction.away_win)),
        (
            format!("Most likely score {}", prediction.most_likely),
            percent(prediction.most_likely_prob),
        ),
        (format!("Over {} goals", prediction.goals_line), percent(prediction.over)),
        (format!("Under {} goals", prediction.goals_line), percent(prediction.under)),
    ];
    table.push_rows(
        rows.into_iter()
            .map(|(label, value)| Row::new(Styles::default(), vec![label.into(), value.into()])),
    );
    table
}

pub fn tabulate_ranking(title: &str, ranking: &[RankedTeam]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(6)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(24))),
            Col::new(Styles::default().with(MinWidth(12)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec!["Rank".into(), title.into(), "Coefficient".into()],
        ));
    table.push_rows(ranking.iter().map(|ranked| {
        Row::new(
            Styles::default(),
            vec![
                format!("{}", ranked.rank).into(),
                ranked.name.clone().into(),
                format!("{:.4}", ranked.coefficient).into(),
            ],
        )
    }));
    table
}

pub fn tabulate_comparison(comparison: &[TeamComparison]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(24))),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec!["Team".into(), "Attack".into(), "Defense".into()],
        ));
    table.push_rows(comparison.iter().map(|row| {
        Row::new(
            Styles::default(),
            vec![
                row.team.name.clone().into(),
                format!("{:.4}", row.attack).into(),
                format!("{:.4}", row.defense).into(),
            ],
        )
    }));
    table
}

pub fn tabulate_profile(profile: &TeamProfile) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(10))),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(24))),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec![
                profile.team.name.clone().into(),
                "Multiplier".into(),
                "Rating".into(),
                "vs average".into(),
                "Percentile".into(),
            ],
        ));
    table.push_row(Row::new(
        Styles::default(),
        vec![
            "Attack".into(),
            format!("{:.4}", profile.attack).into(),
            profile.attack_rating.to_string().into(),
            format!("{:+.1}%", profile.attack_vs_average).into(),
            format!("{:.0}", profile.attack_percentile).into(),
        ],
    ));
    table.push_row(Row::new(
        Styles::default(),
        vec![
            "Defense".into(),
            format!("{:.4}", profile.defense).into(),
            profile.defense_rating.to_string().into(),
            format!("{:+.1}%", profile.defense_vs_average).into(),
            format!("{:.0}", profile.defense_percentile).into(),
        ],
    ));
    table
}

pub fn tabulate_matchday(predictions: &[PredictionResult]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(20))),
            Col::new(Styles::default().with(MinWidth(20))),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Centred)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec![
                "Home".into(),
                "Away".into(),
                "1".into(),
                "X".into(),
                "2".into(),
                "Score".into(),
            ],
        ));
    table.push_rows(predictions.iter().map(|prediction| {
        Row::new(
            Styles::default(),
            vec![
                prediction.home_team.name.clone().into(),
                prediction.away_team.name.clone().into(),
                percent(prediction.home_win).into(),
                percent(prediction.draw).into(),
                percent(prediction.away_win).into(),
                prediction.most_likely.to_string().into(),
            ],
        )
    }));
    table
}

pub fn tabulate_summary(summary: &ModelSummary) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(24))),
            Col::new(Styles::default().with(MinWidth(30))),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec!["Model summary".into(), "".into()],
        ));
    let mut push = |label: &str, value: String| {
        table.push_row(Row::new(Styles::default(), vec![label.into(), right(value)]));
    };
    if let Some(statistics) = &summary.statistics {
        push("Matches", format!("{}", statistics.matches));
        push("Seasons", format!("{}", statistics.seasons));
        push("Observations", format!("{}", statistics.observations));
        push("Iterations", format!("{}", statistics.iterations));
        push("Log-likelihood", format!("{:.2}", statistics.log_likelihood));
        push("AIC", format!("{:.2}", statistics.aic));
        push("Deviance", format!("{:.2}", statistics.deviance));
        push("Null deviance", format!("{:.2}", statistics.null_deviance));
    }
    push("Teams", format!("{}", summary.teams));
    push(
        "Home advantage",
        format!(
            "{:.4} ({:+.1}%)",
            summary.home_advantage,
            (summary.home_advantage - 1.0) * 100.0
        ),
    );
    let names = |ranking: &[RankedTeam]| {
        ranking
            .iter()
            .map(|ranked| ranked.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    push("Best attack", names(&summary.top_attack));
    push("Best defense", names(&summary.top_defense));
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::predict;
    use crate::ranking::{compare, rank_attack, team_profile};
    use crate::testing::two_team_params;
    use stanza::renderer::console::Console;
    use stanza::renderer::Renderer;

    #[test]
    fn render_prediction() {
        let prediction = predict("A", "B", &two_team_params(), 5).unwrap();
        let scoregrid = tabulate_scoregrid(&prediction);
        assert_eq!(7, scoregrid.num_rows());
        let rendered = Console::default().render(&scoregrid).to_string();
        assert!(rendered.contains("A \\ B"), "{rendered}");

        let summary = Console::default().render(&tabulate_prediction(&prediction)).to_string();
        assert!(summary.contains("Most likely score 2-0"), "{summary}");
    }

    #[test]
    fn render_rankings_and_comparison() {
        let params = two_team_params();
        assert_eq!(3, tabulate_ranking("Attack", &rank_attack(&params, None)).num_rows());
        assert_eq!(2, tabulate_comparison(&compare(&params, &["B"])).num_rows());
        let profile = team_profile(&params, "A").unwrap();
        let rendered = Console::default().render(&tabulate_profile(&profile)).to_string();
        assert!(rendered.contains("Very strong"), "{rendered}");
        assert!(rendered.contains("+50.0%"), "{rendered}");
    }
}
