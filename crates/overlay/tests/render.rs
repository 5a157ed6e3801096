use std::fs;

use match_engine::{
    extract_match_state, ExternalId, Highlight, MatchState, Roster, RosterEntry, SetScore,
    SideState, TeamColorEntry, TeamPalette,
};
use overlay::{render_overlay, render_summary, OverlayWriter};
use serde_json::json;

fn side(name: &str, id: i64, color: Option<&str>) -> SideState {
    SideState {
        id: Some(ExternalId::Num(id)),
        name: name.to_string(),
        color: color.map(str::to_string),
        sets_won: 0,
        current_points: 0,
        is_serving: false,
    }
}

fn base_state() -> MatchState {
    MatchState {
        home: side("Lions", 5, Some("#FF0000")),
        away: side("Tigers", 9, Some("#00f")),
        match_started: true,
        in_set: true,
        match_ended: false,
        roster: None,
        highlight: None,
        set_scores: Vec::new(),
    }
}

#[test]
fn renders_full_scoreboard() {
    let mut state = base_state();
    state.home.sets_won = 1;
    state.home.current_points = 14;
    state.away.current_points = 12;
    state.away.is_serving = true;
    state.set_scores = vec![
        SetScore { home: Some(25), away: Some(20) },
        SetScore { home: Some(14), away: Some(12) },
    ];

    let expected = [
        "<div xmlns=\"http://www.w3.org/1999/xhtml\">",
        "    <div id=\"scoreboard\" class=\"scoreboard\">",
        "        <div class=\"home\">",
        "            <div id=\"home_set\" class=\"set\">1</div>",
        "            <div id=\"home_color\" class=\"color\" style=\"background: rgb(255, 0, 0);\">\u{a0}</div>",
        "            <div id=\"home_team\" class=\"team\" contenteditable=\"true\">Lions</div>",
        "            <div id=\"home_serve\" class=\"serve\">\u{a0}</div>",
        "            <div class=\"ended-sets\">",
        "                <div id=\"home_ended_1\" class=\"ended\" data-set=\"1\">25</div>",
        "                <div id=\"home_ended_2\" class=\"ended\" data-set=\"2\">14</div>",
        "            </div>",
        "            <div id=\"home_score\" class=\"score\">14</div>",
        "        </div>",
        "        <div class=\"away\">",
        "            <div id=\"away_set\" class=\"set\">0</div>",
        "            <div id=\"away_color\" class=\"color\" style=\"background: rgb(0, 0, 255);\">\u{a0}</div>",
        "            <div id=\"away_team\" class=\"team\" contenteditable=\"true\">Tigers</div>",
        "            <div id=\"away_serve\" class=\"serve serving\">\u{a0}</div>",
        "            <div class=\"ended-sets\">",
        "                <div id=\"away_ended_1\" class=\"ended\" data-set=\"1\">20</div>",
        "                <div id=\"away_ended_2\" class=\"ended\" data-set=\"2\">12</div>",
        "            </div>",
        "            <div id=\"away_score\" class=\"score\">12</div>",
        "        </div>",
        "    </div>",
        "</div>",
    ]
    .join("\n");
    assert_eq!(render_overlay(&state).as_str(), expected);
}

#[test]
fn rendering_is_idempotent() {
    let mut state = base_state();
    state.highlight = Some(Highlight {
        description: "Block".into(),
        player_name: "Cy".into(),
        player_number: "3".into(),
    });
    let first = render_overlay(&state);
    let second = render_overlay(&state.clone());
    assert_eq!(first.as_str().as_bytes(), second.as_str().as_bytes());
}

#[test]
fn ended_match_drops_live_points() {
    let doc = json!({
        "gamestate": {"currentScore": {"homeGoals": 2, "awayGoals": 0}, "currentSetScores": []},
        "events": [{"stopsMatch": true}]
    });
    let state = extract_match_state(&doc, None, false).expect("valid feed");
    let rendered = render_overlay(&state);
    assert!(!rendered.as_str().contains("home_score"));
    assert!(!rendered.as_str().contains("away_score"));
    assert!(rendered.as_str().contains(r#"<div id="home_set" class="set">2</div>"#));
}

#[test]
fn transparent_and_invalid_colors() {
    let mut palette = TeamPalette::new();
    palette.insert("5", TeamColorEntry { color: "transparent".into(), name: "Lions".into() });
    palette.insert("9", TeamColorEntry { color: "xyz".into(), name: "Tigers".into() });
    let doc = json!({"gamestate": {}, "events": []});
    let state = extract_match_state(&doc, Some(&palette), false).expect("valid feed");

    let rendered = render_overlay(&state);
    let text = rendered.as_str();
    assert!(text.contains("<div id=\"home_color\" class=\"color\">\u{a0}</div>"));
    assert!(text.contains(r#"<div id="away_color" class="color" style="background: rgb(128, 128, 128);">"#));
}

#[test]
fn set_history_skips_incomplete_entries() {
    let mut state = base_state();
    state.set_scores = vec![
        SetScore { home: Some(25), away: Some(23) },
        SetScore { home: None, away: Some(10) },
        SetScore { home: Some(8), away: Some(9) },
    ];
    let rendered = render_overlay(&state);
    let text = rendered.as_str();
    assert!(text.contains(r#"id="home_ended_1""#));
    assert!(!text.contains(r#"id="home_ended_2""#));
    assert!(!text.contains(r#"id="away_ended_2""#));
    assert!(text.contains(r#"<div id="away_ended_3" class="ended" data-set="3">9</div>"#));
    assert_eq!(text.matches(r#"class="ended-sets""#).count(), 2);
}

#[test]
fn no_history_means_no_ended_block() {
    assert!(!render_overlay(&base_state()).as_str().contains("ended-sets"));
}

#[test]
fn roster_block_follows_visibility() {
    let doc = json!({
        "gamestate": {"currentScore": {"homeGoals": 1, "awayGoals": 0}},
        "events": [
            {"teamId": 1, "teamName": "One", "startsMatch": true},
            {"teamId": 2, "teamName": "Two", "startsPeriod": true}
        ],
        "lineup": [
            {"webTeamId": 1, "personId": 11, "type": "player", "number": "4", "name": "Ann", "libero": true},
            {"webTeamId": 2, "personId": 21, "type": "player", "number": "5", "name": "Ben", "libero": false}
        ]
    });
    let state = extract_match_state(&doc, None, false).expect("valid feed");
    assert!(!render_overlay(&state).as_str().contains("id=\"lineup\""));

    let mut between_sets = doc.clone();
    between_sets["events"][1]["startsPeriod"] = json!(false);
    between_sets["events"][1]["stopsPeriod"] = json!(true);
    let state = extract_match_state(&between_sets, None, false).expect("valid feed");
    let rendered = render_overlay(&state);
    let text = rendered.as_str();
    assert!(text.contains(r#"<div id="lineup" class="lineup">"#));
    assert!(text.contains(r#"<div id="home_team_name" class="team_name">One</div>"#));
    assert!(text.contains(r#"<div class="player libero">"#));
    assert!(text.contains(r#"<div class="name">Ben</div>"#));
}

#[test]
fn highlight_and_names_are_escaped() {
    let mut state = base_state();
    state.home.name = "Smith & Sons".into();
    state.roster = Some(Roster {
        home: vec![RosterEntry { number: "1".into(), name: "<Ann>".into(), libero: false }],
        away: Vec::new(),
    });
    state.highlight = Some(Highlight {
        description: "Attack".into(),
        player_name: "Ann".into(),
        player_number: "1".into(),
    });
    let rendered = render_overlay(&state);
    let text = rendered.as_str();
    assert!(text.contains("Smith &amp; Sons"));
    assert!(text.contains("&lt;Ann&gt;"));
    assert!(text.contains(r#"<div class="highlight_player">1 Ann</div>"#));
    assert!(text.ends_with("    </div>\n</div>"));
}

#[test]
fn publish_writes_rendered_document() {
    let dir = tempfile::tempdir().expect("tempdir");
    let writer = OverlayWriter::new(dir.path().join("html").join("scoreboard.xml"));
    writer.ensure_parent().expect("mkdir");

    let state = base_state();
    writer.publish(&state).expect("publish");
    let on_disk = fs::read_to_string(writer.path()).expect("read back");
    assert_eq!(on_disk, render_overlay(&state).into_string());
}

#[test]
fn summary_lists_sets_and_colors() {
    let mut state = base_state();
    state.set_scores = vec![SetScore { home: Some(25), away: Some(19) }];
    let summary = render_summary(&state);
    assert!(summary.contains("Teams: Lions vs. Tigers (Colors: Lions#5:#FF0000, Tigers#9:#00f)"));
    assert!(summary.contains("  - Set 1: 25 - 19"));
    assert!(summary.contains("Score in Current Set:"));
}
