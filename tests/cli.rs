use std::path::{Path, PathBuf};

use assert_cmd::Command;

mod common;

const DOG_DETECTIONS: &str = r#"[
    {"label": "dog", "confidence": 0.95, "box": {"xmin": 40, "ymin": 20, "xmax": 140, "ymax": 120}},
    {"label": "ball", "confidence": 0.30, "box": {"xmin": 0.8, "ymin": 0.8, "xmax": 0.9, "ymax": 0.9}}
]"#;

/// Writes `scene.png` (300x200) and its sidecar detections into `dir`.
fn scene_with_sidecar(dir: &Path) -> PathBuf {
    let image = dir.join("scene.png");
    common::write_gray(&image, &common::squares(300, 200, 0));
    common::write_detections(&dir.join("scene.detections.json"), DOG_DETECTIONS);
    image
}

fn composure() -> Command {
    let mut cmd = Command::cargo_bin("composure").unwrap();
    cmd.env_remove("COMPOSURE_CONFIG").env_remove("RUST_LOG");
    cmd
}

#[test]
fn runs() {
    composure().assert().success();
}

#[test]
fn outputs_tool_name() {
    let mut cmd = composure();
    cmd.arg("-V");
    cmd.assert().success().stdout("composure 0.1.0\n");
}

// rot subcommand tests

#[test]
fn rot_scores_subjects_against_vertical_thirds() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let image = scene_with_sidecar(temp.path());

    let mut cmd = composure();
    cmd.arg("rot").arg("-i").arg(&image).args(["-o", "vertical", "-g", "3"]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("thirds grid vertical/3, 400 guide points"))
        .stdout(predicates::str::contains(
            "dog (0.950): center (90.00, 70.00) -> point #70 (100.00, 70.35), distance 10.01",
        ))
        .stdout(predicates::str::contains("ball (0.300)"))
        .stdout(predicates::str::contains("best placed:"));

    assert!(temp.path().join("scene-bounded.png").is_file());
}

#[test]
fn rot_rejects_mismatched_grid_before_reading_anything() {
    let mut cmd = composure();
    cmd.args(["rot", "-i", "does/not/exist.jpg", "-o", "vertical", "-g", "9"]);
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicates::str::contains("require 3 as grid size"));
}

#[test]
fn rot_rejects_blocks_with_grid_three() {
    let mut cmd = composure();
    cmd.args(["rot", "-i", "does/not/exist.jpg", "-o", "blocks", "-g", "3"]);
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicates::str::contains("requires 9 as grid size"));
}

#[test]
fn rot_json_output_with_confidence_filter() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let image = scene_with_sidecar(temp.path());

    let mut cmd = composure();
    cmd.arg("rot")
        .arg("-i")
        .arg(&image)
        .args(["-o", "blocks", "-g", "9", "--min-confidence", "0.5"])
        .args(["--no-render", "--output", "json"]);
    let output = cmd.assert().success().get_output().stdout.clone();

    let report: serde_json::Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(report["guide_kind"], "thirds_grid");
    assert_eq!(report["width"], 300);
    assert_eq!(report["height"], 200);
    let results = report["results"].as_array().expect("results array");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["detection"]["label"], "dog");
    assert!(report.get("annotated_image").is_none());
    assert!(!temp.path().join("scene-bounded.png").exists());
}

#[test]
fn rot_without_detections_reports_no_subjects() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let image = temp.path().join("empty.png");
    common::write_gray(&image, &common::uniform(90, 60, 40));

    let mut cmd = composure();
    cmd.arg("rot").arg("-i").arg(&image).args(["-o", "horizontal", "--no-render"]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("no detections"));
}

#[test]
fn rot_explicit_detections_and_render_target() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let image = temp.path().join("photo.png");
    common::write_gray(&image, &common::squares(300, 200, 1));
    let detections = temp.path().join("dets.json");
    common::write_detections(&detections, DOG_DETECTIONS);
    let out = temp.path().join("out").join("annotated.png");
    std::fs::create_dir_all(out.parent().unwrap()).expect("create out dir");

    let mut cmd = composure();
    cmd.arg("rot")
        .arg("-i")
        .arg(&image)
        .arg("-d")
        .arg(&detections)
        .arg("--render-to")
        .arg(&out);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("annotated image:"));
    assert!(out.is_file());
}

#[test]
fn rot_renders_box_far_outside_the_image() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let image = temp.path().join("wide.png");
    common::write_gray(&image, &common::uniform(100, 100, 30));
    common::write_detections(
        &temp.path().join("wide.detections.json"),
        r#"[{"label": "wall", "confidence": 0.9, "box": {"xmin": 0, "ymin": 0, "xmax": 1e13, "ymax": 10}}]"#,
    );

    let mut cmd = composure();
    cmd.arg("rot").arg("-i").arg(&image);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("wall (0.900)"));
    assert!(temp.path().join("wide-bounded.png").is_file());
}

#[test]
fn rot_malformed_detections_fails() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let image = temp.path().join("photo.png");
    common::write_gray(&image, &common::uniform(30, 30, 0));
    let detections = temp.path().join("dets.json");
    common::write_detections(&detections, "{not json");

    let mut cmd = composure();
    cmd.arg("rot").arg("-i").arg(&image).arg("-d").arg(&detections);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("Failed to parse detections JSON"));
}

#[test]
fn rot_missing_image_fails() {
    let mut cmd = composure();
    cmd.args(["rot", "-i", "no/such/image.png"]);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("Failed to read image dimensions"));
}

// spiral subcommand tests

#[test]
fn spiral_scores_subjects() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let image = scene_with_sidecar(temp.path());

    let mut cmd = composure();
    cmd.arg("spiral").arg("-i").arg(&image).arg("--no-render");
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("golden spiral, 1000 guide points"))
        .stdout(predicates::str::contains("dog (0.950)"));
}

#[test]
fn spiral_resolution_override() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let image = scene_with_sidecar(temp.path());

    let mut cmd = composure();
    cmd.arg("spiral")
        .arg("-i")
        .arg(&image)
        .args(["--resolution", "250", "--no-render"]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("250 guide points"));
}

#[test]
fn spiral_rejects_tiny_resolution() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let image = scene_with_sidecar(temp.path());

    let mut cmd = composure();
    cmd.arg("spiral")
        .arg("-i")
        .arg(&image)
        .args(["--resolution", "1"]);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("Invalid configuration"));
}

#[test]
fn spiral_reads_settings_file() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let image = scene_with_sidecar(temp.path());
    let settings = temp.path().join("composure.yaml");
    std::fs::write(&settings, "spiral:\n  resolution: 321\n").expect("write settings");

    let mut cmd = composure();
    cmd.arg("spiral")
        .arg("-i")
        .arg(&image)
        .arg("--no-render")
        .arg("--config")
        .arg(&settings);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("321 guide points"));
}

// similarity subcommand tests

#[test]
fn similarity_ranks_corpus() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let query = temp.path().join("query.png");
    let scene = common::squares(200, 160, 0);
    common::write_gray(&query, &scene);

    let corpus = temp.path().join("corpus");
    common::write_gray(&corpus.join("flat.png"), &common::uniform(200, 160, 70));
    common::write_gray(&corpus.join("same.png"), &scene);

    let mut cmd = composure();
    cmd.arg("similarity")
        .arg("-q")
        .arg(&query)
        .arg("-f")
        .arg(&corpus)
        .args(["-m", "orb"]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("Most similar images to"))
        .stdout(predicates::str::contains("same.png, Similarity Score: 1.00"))
        .stdout(predicates::str::contains("flat.png, Similarity Score: 0.00"))
        .stdout(predicates::str::contains("Best match:"));
}

#[test]
fn similarity_json_output() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let query = temp.path().join("query.png");
    common::write_gray(&query, &common::squares(200, 160, 0));
    let corpus = temp.path().join("corpus");
    common::write_gray(&corpus.join("same.png"), &common::squares(200, 160, 0));

    let mut cmd = composure();
    cmd.arg("similarity")
        .arg("-q")
        .arg(&query)
        .arg("-f")
        .arg(&corpus)
        .args(["-m", "brief", "--output", "json"]);
    let output = cmd.assert().success().get_output().stdout.clone();

    let report: serde_json::Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(report["extractor"], "brief");
    assert_eq!(report["scores"][0]["score"], 1.0);
    assert!(report["scores"][0]["imagePath"]
        .as_str()
        .expect("image path")
        .ends_with("same.png"));
}

#[test]
fn similarity_missing_query_fails() {
    let temp = tempfile::tempdir().expect("create temp dir");

    let mut cmd = composure();
    cmd.arg("similarity")
        .arg("-q")
        .arg(temp.path().join("missing.png"))
        .arg("-f")
        .arg(temp.path());
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicates::str::contains("cannot read query image"));
}

#[test]
fn similarity_rejects_zero_top_k() {
    let temp = tempfile::tempdir().expect("create temp dir");

    let mut cmd = composure();
    cmd.arg("similarity")
        .arg("-q")
        .arg(temp.path().join("q.png"))
        .arg("-f")
        .arg(temp.path())
        .args(["--top-k", "0"]);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("top_k must be at least 1"));
}

#[test]
fn similarity_rejects_unknown_model() {
    let mut cmd = composure();
    cmd.args(["similarity", "-q", "q.png", "-f", "corpus", "-m", "yolo-small"]);
    cmd.assert().failure();
}
