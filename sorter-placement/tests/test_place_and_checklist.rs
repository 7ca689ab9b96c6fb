use chrono::Local;
use sorter_core::{EngineConfig, SensitiveAccountRegistry};
use sorter_ingest::{Classifier, SidecarTextSource};
use sorter_placement::{
    FilePlacer, LogEntry, Outcome, RunStats, plan_placement, write_checklist, write_json_log,
};
use std::fs;
use std::path::Path;

fn write_pdf(dir: &Path, name: &str, text: Option<&str>) {
    fs::write(dir.join(name), b"%PDF-1.4 test").unwrap();
    if let Some(t) = text {
        fs::write(dir.join(format!("{name}.txt")), t).unwrap();
    }
}

/// Classified files are copied under bank folders; the unlabeled one stays
/// put and still appears in the checklist.
#[test]
fn test_end_to_end_placement() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_pdf(
        input.path(),
        "upload_1.pdf",
        Some(
            "Cambridge Savings Bank\nHILLTOP FUND LP\n\
             Statement Period 01/01/2024 - 01/31/2024\nAccount 12-34",
        ),
    );
    write_pdf(input.path(), "IMG_0001.pdf", Some("grocery receipt"));

    let classifier = Classifier::new(
        EngineConfig::default(),
        SensitiveAccountRegistry::empty(),
        Box::new(SidecarTextSource),
    )
    .unwrap();
    let mut placer = FilePlacer::new(false, false);

    let mut entries = Vec::new();
    for name in ["upload_1.pdf", "IMG_0001.pdf"] {
        let path = input.path().join(name);
        let c = classifier.classify_path(&path);
        let strategy = classifier.strategy_for(&c.info);
        match plan_placement(&path, &c.info, &strategy, output.path()) {
            Ok(plan) => {
                let out = placer.place(&plan).unwrap();
                entries.push(
                    LogEntry::new(&path, Outcome::Placed)
                        .with_destination(out.destination)
                        .with_classification(c),
                );
            }
            Err(e) => entries.push(
                LogEntry::new(&path, Outcome::LeftUnlabeled)
                    .with_detail(e.to_string())
                    .with_classification(c),
            ),
        }
    }

    let placed = output
        .path()
        .join("Cambridge/2024-01/HILLTOP FUND LP 12-34 Cambridge Savings January 2024.pdf");
    assert!(placed.exists());
    assert!(input.path().join("IMG_0001.pdf").exists());
    assert!(!output.path().join("Unlabeled").exists());

    let stats = RunStats::from_entries(&entries);
    assert_eq!(stats.unlabeled, 1);
    assert_eq!(stats.needs_review, 1);

    let checklist =
        write_checklist(&entries, &output.path().join("logs"), false, Local::now()).unwrap();
    let mut rdr = csv::Reader::from_path(&checklist).unwrap();
    let headers: Vec<String> = rdr.headers().unwrap().iter().map(str::to_string).collect();
    assert_eq!(
        headers,
        [
            "Original File",
            "Destination File",
            "Bank Type",
            "Status",
            "Match Status",
            "Match Basis",
            "Verified"
        ]
    );
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    // Sorted by original path: IMG_0001 before upload_1.
    assert_eq!(&rows[0][2], "Unlabeled");
    assert_eq!(&rows[0][1], "");
    assert_eq!(&rows[1][2], "Cambridge");

    let log = write_json_log(&entries, &checklist).unwrap();
    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(log).unwrap()).unwrap();
    assert_eq!(v.as_array().unwrap().len(), 2);
}

#[test]
fn test_repeated_placement_gets_suffix() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let text = "PNC Bank\nHILLTOP FUND LLC\nFor the period 03/01/2024 to 03/31/2024\n\
                Account Number: 12-3456-7890";
    write_pdf(input.path(), "Statement_a.pdf", Some(text));
    write_pdf(input.path(), "Statement_b.pdf", Some(text));

    let classifier = Classifier::new(
        EngineConfig::default(),
        SensitiveAccountRegistry::empty(),
        Box::new(SidecarTextSource),
    )
    .unwrap();
    let mut placer = FilePlacer::new(false, false);

    let mut dests = Vec::new();
    for name in ["Statement_a.pdf", "Statement_b.pdf"] {
        let path = input.path().join(name);
        let c = classifier.classify_path(&path);
        let strategy = classifier.strategy_for(&c.info);
        let plan = plan_placement(&path, &c.info, &strategy, output.path()).unwrap();
        dests.push(placer.place(&plan).unwrap().destination);
    }
    let names: Vec<String> = dests
        .iter()
        .map(|d| d.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names[1], names[0].replace(".pdf", " (1).pdf"));
    assert!(dests[0].starts_with(output.path().join("PNC/2024/March")));
}
