use std::fs;
use std::process::Command;

const FEED: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/crates/match_engine/tests/fixtures/live_feed.json");

#[test]
fn replays_saved_feed_into_overlay() {
    let dir = tempfile::tempdir().unwrap();
    let palette = dir.path().join("palette.json");
    fs::write(
        &palette,
        r##"{"5": {"color": "#123456", "name": "Lions VC"}, "9": {"color": "transparent", "name": "Tigers VC"}}"##,
    )
    .unwrap();
    let out = dir.path().join("out").join("scoreboard.xml");

    let status = Command::new(env!("CARGO_BIN_EXE_scoreboard-replay"))
        .arg(FEED)
        .arg(&palette)
        .args(["--no-summary", "--output"])
        .arg(&out)
        .status()
        .unwrap();
    assert!(status.success());

    let written = fs::read_to_string(&out).unwrap();
    assert!(written.contains(r#"contenteditable="true">Lions VC</div>"#));
    assert!(written.contains("rgb(18, 52, 86)"));
    assert!(written.contains("<div id=\"away_color\" class=\"color\">\u{a0}</div>"));
}

#[test]
fn malformed_feed_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let feed = dir.path().join("broken.json");
    fs::write(&feed, r#"{"gamestate": [], "events": []}"#).unwrap();
    let out = dir.path().join("scoreboard.xml");

    let status = Command::new(env!("CARGO_BIN_EXE_scoreboard-replay"))
        .arg(&feed)
        .arg("--output")
        .arg(&out)
        .status()
        .unwrap();
    assert!(!status.success());
    assert!(!out.exists());
}
