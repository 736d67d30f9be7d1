//! Ordering rules shared by the leaderboard view and the CSV exports.

use std::cmp::Ordering;

use uuid::Uuid;

use crate::state::model::{Contest, Entrant};

const CSV_HEADER: &str = "Contest,Entrant,Score";

/// One ranked line of a contest leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow {
    /// Competition rank (ties share a rank, the next rank skips).
    pub rank: usize,
    pub entrant_id: Uuid,
    pub name: String,
    pub score: u32,
}

/// Compare two strings ignoring case.
fn caseless(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Score descending, then name ascending ignoring case.
fn by_score_then_name(a: &Entrant, b: &Entrant) -> Ordering {
    b.score.cmp(&a.score).then_with(|| caseless(&a.name, &b.name))
}

/// Entrants of `contest` in leaderboard order.
pub fn sorted_entrants(contest: &Contest) -> Vec<&Entrant> {
    let mut entrants: Vec<&Entrant> = contest.entrants.iter().collect();
    entrants.sort_by(|a, b| by_score_then_name(a, b));
    entrants
}

/// Ranked rows for a contest, as handed to the leaderboard renderers.
pub fn ranked(contest: &Contest) -> Vec<LeaderboardRow> {
    let mut rows: Vec<LeaderboardRow> = Vec::with_capacity(contest.entrants.len());
    for (position, entrant) in sorted_entrants(contest).into_iter().enumerate() {
        let rank = match rows.last() {
            Some(previous) if previous.score == entrant.score => previous.rank,
            _ => position + 1,
        };
        rows.push(LeaderboardRow {
            rank,
            entrant_id: entrant.id,
            name: entrant.name.clone(),
            score: entrant.score,
        });
    }
    rows
}

/// CSV grouped by contest: contests by name ignoring case, entrants in
/// leaderboard order within each contest.
pub fn grouped_csv(contests: &[Contest]) -> String {
    let mut ordered: Vec<&Contest> = contests.iter().collect();
    ordered.sort_by(|a, b| caseless(&a.name, &b.name));

    let mut out = csv_header();
    for contest in ordered {
        for entrant in sorted_entrants(contest) {
            push_row(&mut out, &contest.name, &entrant.name, entrant.score);
        }
    }
    out
}

/// CSV ranking every entrant across all contests: score descending, then
/// contest name, then entrant name, both ignoring case.
pub fn ranking_csv(contests: &[Contest]) -> String {
    let mut rows: Vec<(&Contest, &Entrant)> = contests
        .iter()
        .flat_map(|contest| contest.entrants.iter().map(move |entrant| (contest, entrant)))
        .collect();
    rows.sort_by(|(ca, ea), (cb, eb)| {
        eb.score
            .cmp(&ea.score)
            .then_with(|| caseless(&ca.name, &cb.name))
            .then_with(|| caseless(&ea.name, &eb.name))
    });

    let mut out = csv_header();
    for (contest, entrant) in rows {
        push_row(&mut out, &contest.name, &entrant.name, entrant.score);
    }
    out
}

fn csv_header() -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    out
}

fn push_row(out: &mut String, contest: &str, entrant: &str, score: u32) {
    out.push_str(&csv_field(contest));
    out.push(',');
    out.push_str(&csv_field(entrant));
    out.push(',');
    out.push_str(&score.to_string());
    out.push('\n');
}

/// Quote a field when it contains a separator, quote or line break.
pub fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::model::AccentColor;

    fn contest(name: &str, entrants: &[(&str, u32)]) -> Contest {
        let mut contest = Contest::new(name.into(), AccentColor::default());
        contest.entrants = entrants
            .iter()
            .map(|(name, score)| {
                let mut entrant = Entrant::new((*name).into());
                entrant.score = *score;
                entrant
            })
            .collect();
        contest
    }

    #[test]
    fn grouped_csv_breaks_ties_alphabetically() {
        let jam = contest("Jam A", &[("Alice", 3), ("Bob", 3), ("Carol", 5)]);

        assert_eq!(
            grouped_csv(&[jam]),
            "Contest,Entrant,Score\nJam A,Carol,5\nJam A,Alice,3\nJam A,Bob,3\n"
        );
    }

    #[test]
    fn grouped_csv_orders_contests_ignoring_case() {
        let contests = [
            contest("zeta", &[("Zed", 1)]),
            contest("Alpha", &[("amy", 2), ("Ben", 2)]),
        ];

        assert_eq!(
            grouped_csv(&contests),
            "Contest,Entrant,Score\nAlpha,amy,2\nAlpha,Ben,2\nzeta,Zed,1\n"
        );
    }

    #[test]
    fn ranking_csv_flattens_all_contests() {
        let contests = [
            contest("Jam B", &[("Dana", 4), ("Eve", 9)]),
            contest("Jam A", &[("Alice", 4), ("Bob", 1)]),
        ];

        assert_eq!(
            ranking_csv(&contests),
            "Contest,Entrant,Score\nJam B,Eve,9\nJam A,Alice,4\nJam B,Dana,4\nJam A,Bob,1\n"
        );
    }

    #[test]
    fn fields_with_special_characters_are_quoted() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("Smith, Jo"), "\"Smith, Jo\"");
        assert_eq!(csv_field("The \"Ace\""), "\"The \"\"Ace\"\"\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");

        let jam = contest("Finals, Day 1", &[("O\"Neil", 2)]);
        assert_eq!(
            grouped_csv(&[jam]),
            "Contest,Entrant,Score\n\"Finals, Day 1\",\"O\"\"Neil\",2\n"
        );
    }

    #[test]
    fn ranks_share_positions_on_ties() {
        let jam = contest("Jam A", &[("Alice", 3), ("Bob", 3), ("Carol", 5), ("Dan", 1)]);
        let ranks: Vec<_> = ranked(&jam)
            .into_iter()
            .map(|row| (row.rank, row.name))
            .collect();

        assert_eq!(
            ranks,
            [
                (1, "Carol".to_string()),
                (2, "Alice".to_string()),
                (2, "Bob".to_string()),
                (4, "Dan".to_string()),
            ]
        );
    }

    #[test]
    fn empty_inputs_produce_only_the_header() {
        assert_eq!(grouped_csv(&[]), "Contest,Entrant,Score\n");
        assert_eq!(ranking_csv(&[contest("Empty", &[])]), "Contest,Entrant,Score\n");
    }
}
