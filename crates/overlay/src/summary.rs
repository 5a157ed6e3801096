//! Console summary of a snapshot, printed by one-shot runs.

use match_engine::{MatchState, SideState};

fn team_tag(side: &SideState) -> String {
    let id = side.id.as_ref().map(ToString::to_string).unwrap_or_default();
    let color = side.color.as_deref().unwrap_or("N/A");
    format!("{}#{}:{}", side.name, id, color)
}

pub fn render_summary(state: &MatchState) -> String {
    let home = &state.home;
    let away = &state.away;

    let colors = if home.color.is_some() || away.color.is_some() {
        format!(" (Colors: {}, {})", team_tag(home), team_tag(away))
    } else {
        String::new()
    };
    let points_heading = if state.match_ended {
        "Score in Final Set:"
    } else {
        "Score in Current Set:"
    };

    let mut out = vec![
        "--- Volleyball Match Summary ---".to_string(),
        String::new(),
        format!("Teams: {} vs. {}{}", home.name, away.name, colors),
        String::new(),
        "Sets:".to_string(),
        format!("  - {}: {}", home.name, home.sets_won),
        format!("  - {}: {}", away.name, away.sets_won),
        String::new(),
        points_heading.to_string(),
        format!("  - {}: {}", home.name, home.current_points),
        format!("  - {}: {}", away.name, away.current_points),
        String::new(),
        "Set-by-Set Breakdown:".to_string(),
    ];
    for (idx, set) in state.set_scores.iter().enumerate() {
        let goals = |g: Option<i64>| g.map(|g| g.to_string()).unwrap_or_else(|| "-".to_string());
        out.push(format!("  - Set {}: {} - {}", idx + 1, goals(set.home), goals(set.away)));
    }
    out.join("\n")
}
