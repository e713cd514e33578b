use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use predicates::prelude::*;
use tempfile::TempDir;

/// A command isolated from the user's config and data directories.
fn decimo(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("decimo").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data"))
        .arg("--book")
        .arg(book_path(home));
    cmd
}

fn book_path(home: &TempDir) -> PathBuf {
    home.path().join("tickets.json")
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// A one-page results PDF, one entry per text line.
fn results_pdf(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 12.into()]),
        Operation::new("Td", vec![50.into(), 750.into()]),
    ];
    for line in lines {
        operations.push(Operation::new("Tj", vec![Object::string_literal(format!("{} ", line))]));
        operations.push(Operation::new("Td", vec![0.into(), (-20).into()]));
    }
    operations.push(Operation::new("ET", vec![]));

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let path = dir.join(name);
    doc.save(&path).unwrap();
    path
}

fn list_json(home: &TempDir) -> serde_json::Value {
    let output = decimo(home)
        .args(["list", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn scan_text_picks_barcode_window() {
    let home = TempDir::new().unwrap();
    let input = write(
        home.path(),
        "ticket.txt",
        "LOTERIA NACIONAL\nSORTEO 102/25\n51025040905074873555\n20 EUROS\n",
    );

    decimo(&home)
        .arg("scan")
        .arg(&input)
        .assert()
        .success()
        .stdout("{\"number\":\"74873\"}\n");
}

#[test]
fn scan_without_number_prints_null_and_hint() {
    let home = TempDir::new().unwrap();
    let input = write(home.path(), "blurry.txt", "LOTERIA NACIONAL 20 EUROS");

    decimo(&home)
        .arg("scan")
        .arg(&input)
        .assert()
        .success()
        .stdout("{\"number\":null}\n")
        .stderr(predicate::str::contains("decimo add"));
}

#[test]
fn scan_token_dump_uses_geometry() {
    let home = TempDir::new().unwrap();
    let input = write(
        home.path(),
        "ocr.json",
        r#"{
            "text": "64823\n64827",
            "tokens": [
                {"text": "64823", "confidence": 90.0, "bbox": {"x0": 20.0, "y0": 20.0, "x1": 80.0, "y1": 35.0}},
                {"text": "64827", "confidence": 85.0, "bbox": {"x0": 100.0, "y0": 200.0, "x1": 500.0, "y1": 320.0}}
            ]
        }"#,
    );

    decimo(&home)
        .args(["scan", "--format", "text"])
        .arg(&input)
        .assert()
        .success()
        .stdout("64827\n");
}

#[test]
fn scan_explain_lists_rule_contributions() {
    let home = TempDir::new().unwrap();
    let input = write(home.path(), "ticket.txt", "51025040905074873555");

    decimo(&home)
        .args(["scan", "--format", "text", "--explain"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Selected: 74873"))
        .stdout(predicate::str::contains("known_decoy"));
}

#[test]
fn scan_rejects_unsupported_input() {
    let home = TempDir::new().unwrap();
    let input = write(home.path(), "ticket.doc", "74873");

    decimo(&home)
        .arg("scan")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));
}

#[test]
fn scan_add_records_ticket() {
    let home = TempDir::new().unwrap();
    let input = write(home.path(), "ticket.txt", "SORTEO\n74873\n");

    decimo(&home)
        .args(["scan", "--add", "Ana"])
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::contains("Added 74873 for Ana"));

    let tickets = list_json(&home);
    assert_eq!(tickets[0]["number"], "74873");
    assert_eq!(tickets[0]["name"], "Ana");
}

#[test]
fn add_validates_tickets() {
    let home = TempDir::new().unwrap();

    decimo(&home)
        .args(["add", "7487", "--name", "Ana"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exactly 5 digits"));

    decimo(&home)
        .args(["add", "74873", "--name", "Ana"])
        .assert()
        .success();

    decimo(&home)
        .args(["add", "74873", "--name", "Luis"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already added"));

    assert_eq!(list_json(&home).as_array().unwrap().len(), 1);
}

#[test]
fn remove_by_id() {
    let home = TempDir::new().unwrap();
    decimo(&home)
        .args(["add", "74873", "--name", "Ana"])
        .assert()
        .success();

    let id = list_json(&home)[0]["id"].as_str().unwrap().to_string();

    decimo(&home)
        .args(["remove", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 74873"));

    decimo(&home)
        .args(["remove", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no ticket with id"));
}

#[test]
fn check_marks_winners() {
    let home = TempDir::new().unwrap();
    for (number, name) in [("74873", "Ana"), ("06345", "Luis"), ("11111", "Eva")] {
        decimo(&home)
            .args(["add", number, "--name", name])
            .assert()
            .success();
    }

    let results = write(
        home.path(),
        "premios.txt",
        "PREMIOS SORTEO 102/25\n74873 ........ 400.000,00 €\n11111 ..... 20 €\n",
    );

    decimo(&home)
        .arg("check")
        .arg(&results)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 winning tickets out of 3"))
        .stdout(predicate::str::contains("400.000,00 €"))
        .stdout(predicate::str::contains("400.020,00 €"));

    let winners = decimo(&home)
        .args(["list", "--winners", "--format", "csv"])
        .output()
        .unwrap();
    let csv = String::from_utf8(winners.stdout).unwrap();
    assert_eq!(csv.lines().count(), 3);
    assert!(!csv.contains("06345"));
}

#[test]
fn check_reads_results_pdf() {
    let home = TempDir::new().unwrap();
    for (number, name) in [("74873", "Ana"), ("06345", "Luis")] {
        decimo(&home)
            .args(["add", number, "--name", name])
            .assert()
            .success();
    }

    let results = results_pdf(
        home.path(),
        "premios.pdf",
        &["PREMIOS SORTEO 102/25", "74873 ........ 400.000,00 EUR", "11111 ..... 20,00 EUR"],
    );

    decimo(&home)
        .arg("check")
        .arg(&results)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 winning tickets out of 2"))
        .stdout(predicate::str::contains("400.000,00 €"));

    let tickets = list_json(&home);
    let ana = tickets
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["number"] == "74873")
        .unwrap();
    assert_eq!(ana["prize"], "400000.00");
}

#[test]
fn check_dry_run_leaves_book_untouched() {
    let home = TempDir::new().unwrap();
    decimo(&home)
        .args(["add", "74873", "--name", "Ana"])
        .assert()
        .success();
    let before = fs::read_to_string(book_path(&home)).unwrap();

    let results = write(home.path(), "premios.txt", "74873 1.000,00 €\n");
    decimo(&home)
        .args(["check", "--dry-run"])
        .arg(&results)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 winning tickets"));

    assert_eq!(fs::read_to_string(book_path(&home)).unwrap(), before);
}

#[test]
fn check_without_prizes_fails() {
    let home = TempDir::new().unwrap();
    let results = write(home.path(), "empty.txt", "nothing to see");

    decimo(&home)
        .arg("check")
        .arg(&results)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No prizes found"));
}

#[test]
fn batch_writes_summary_csv() {
    let home = TempDir::new().unwrap();
    let scans = home.path().join("scans");
    fs::create_dir(&scans).unwrap();
    write(&scans, "a.txt", "51025040905074873555");
    write(&scans, "b.txt", "LOTERIA NACIONAL");
    let summary = home.path().join("summary.csv");

    decimo(&home)
        .arg("batch")
        .arg(format!("{}/*.txt", scans.display()))
        .arg("--output")
        .arg(&summary)
        .assert()
        .success()
        .stderr(predicate::str::contains("1 found, 1 not found, 0 failed"));

    let csv = fs::read_to_string(&summary).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "filename,status,number,candidates,processing_time_ms,error");
    assert!(lines[1].starts_with("a.txt,found,74873,16,"));
    assert!(lines[2].starts_with("b.txt,not_found,,0,"));
}

#[test]
fn batch_without_matches_fails() {
    let home = TempDir::new().unwrap();

    decimo(&home)
        .arg("batch")
        .arg(format!("{}/*.txt", home.path().display()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn config_set_and_get() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("config.json");

    decimo(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "scan.min_sequence_score", "35"])
        .assert()
        .success();

    decimo(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "scan.min_sequence_score"])
        .assert()
        .success()
        .stdout("35\n");

    decimo(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "scan.nope", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}
