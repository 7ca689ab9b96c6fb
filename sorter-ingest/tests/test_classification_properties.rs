use chrono::{Local, NaiveDate};
use sorter_core::{
    Bank, EngineConfig, MatchBasis, MatchStatus, SensitiveAccount, SensitiveAccountRegistry,
};
use sorter_ingest::{Classifier, PageText, SidecarTextSource};
use std::fs;

fn registry() -> SensitiveAccountRegistry {
    SensitiveAccountRegistry::from_accounts([
        SensitiveAccount {
            bank: Bank::BankUnited,
            name: "ACME CORP".to_string(),
            number: "7770001111".to_string(),
        },
        SensitiveAccount {
            bank: Bank::BankUnited,
            name: "ACME CORP".to_string(),
            number: "7770002222".to_string(),
        },
        SensitiveAccount {
            bank: Bank::BankUnited,
            name: "ACME CORP MMK".to_string(),
            number: "7770003333".to_string(),
        },
    ])
}

fn classifier(registry: SensitiveAccountRegistry) -> Classifier {
    Classifier::new(EngineConfig::default(), registry, Box::new(SidecarTextSource)).unwrap()
}

/// Inputs covering every bank plus unidentifiable documents.
fn corpus() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "Statement_0001.pdf",
            "For the period 03/01/2024 to 03/31/2024\nACME FUND LLC\nAccount ending in 7890",
        ),
        ("PNC_1234_statement.pdf", ""),
        ("Online Statements_1.pdf", "Statement Period: 02/01/2024 -\n02/29/2024"),
        (
            "dxweb.pdf",
            "ACCOUNT # ******2222\nStatement Period\nJanuary 1, 2024 - January 31, 2024",
        ),
        ("NewStatement_1234.pdf", ""),
        ("IMG_0001.pdf", "hello world"),
        ("IMG_0002.pdf", ""),
        ("IMG_0003.pdf", "Statement Date 13/45/2024"),
    ]
}

#[test]
fn test_unlabeled_files_keep_their_name() {
    let c = classifier(registry());
    for (name, text) in corpus() {
        let out = c.classify_text(name, &PageText::from_text(text));
        if out.info.bank() == Bank::Unlabeled {
            assert_eq!(out.info.match_status(), MatchStatus::Unresolved);
            assert!(!out.info.is_placeable());
            let strategy = c.strategy_for(&out.info);
            assert_eq!(strategy.get_filename(&out.info), name);
        }
    }
}

#[test]
fn test_statement_date_is_never_today() {
    let today = Local::now().date_naive();
    let c = classifier(registry());
    for (name, text) in corpus() {
        let out = c.classify_text(name, &PageText::from_text(text));
        assert_ne!(out.info.statement_date(), Some(today), "{name}");
    }
}

/// BankUnited: the masked number names entry 2222 while the printed name is
/// closest to the MMK entry; the number decides.
#[test]
fn test_bank_united_number_beats_fuzzy_name() {
    let c = classifier(registry());
    let text = "ACME CORP MMK\nACCOUNT # ******2222\nStatement Date\nMarch 31, 2024";
    let out = c.classify_text("dxweb.pdf", &PageText::from_text(text));
    assert_eq!(out.info.bank(), Bank::BankUnited);
    assert_eq!(out.info.account_name(), Some("ACME CORP"));
    assert_eq!(out.info.account_number_display(), Some("7770002222"));
    assert_eq!(out.info.match_basis(), MatchBasis::SensitiveNumber);
}

#[test]
fn test_cambridge_split_period_end_date() {
    let c = classifier(SensitiveAccountRegistry::empty());
    let text =
        "Cambridge Savings Bank\nStatement Period: 11/01/2023 through\n11/30/2023\nAccount 12-34";
    let out = c.classify_text("scan.pdf", &PageText::from_text(text));
    assert_eq!(out.info.bank(), Bank::Cambridge);
    assert_eq!(out.info.statement_date(), NaiveDate::from_ymd_opt(2023, 11, 30));
}

#[test]
fn test_filename_alone_identifies_pnc() {
    let c = classifier(SensitiveAccountRegistry::empty());
    let out = c.classify_text("PNC_1234_statement.pdf", &PageText::from_text("nothing useful"));
    assert_eq!(out.info.bank(), Bank::Pnc);
    assert_eq!(out.identified_by, "filename");
}

#[test]
fn test_berkshire_without_text_is_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("NewStatement_2024-06-30_4455.pdf");
    fs::write(&pdf, b"%PDF-1.4 image only").unwrap();

    let c = classifier(SensitiveAccountRegistry::empty());
    let out = c.classify_path(&pdf);
    assert!(!out.text_extracted());
    assert_eq!(out.info.bank(), Bank::Berkshire);
    assert_eq!(out.info.match_status(), MatchStatus::Fallback);
    assert_eq!(out.info.account_number_display(), Some("xxxx4455"));
    assert_eq!(out.info.statement_date(), NaiveDate::from_ymd_opt(2024, 6, 30));
}

/// Two registry entries share the name "Acme Corp"; only the number tells
/// them apart.
#[test]
fn test_same_name_entries_resolved_by_number() {
    let c = classifier(registry());
    let text = "Acme Corp\nACCOUNT # ******2222";
    let out = c.classify_text("dxweb.pdf", &PageText::from_text(text));
    assert_eq!(out.info.account_number_display(), Some("7770002222"));
    assert_eq!(out.info.match_status(), MatchStatus::Success);
}

#[test]
fn test_sidecar_text_drives_classification() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("upload_17.pdf");
    fs::write(&pdf, b"%PDF-1.4").unwrap();
    fs::write(
        dir.path().join("upload_17.pdf.txt"),
        "PNC Bank\nFor the period 04/01/2024 to 04/30/2024\x0cpage two",
    )
    .unwrap();

    let out = classifier(SensitiveAccountRegistry::empty()).classify_path(&pdf);
    assert!(out.text_extracted());
    assert_eq!(out.info.bank(), Bank::Pnc);
    assert_eq!(out.identified_by, "content");
    assert_eq!(out.info.statement_date(), NaiveDate::from_ymd_opt(2024, 4, 30));
}

#[test]
fn test_bank_united_identified_by_content() {
    let c = classifier(SensitiveAccountRegistry::empty());
    let text = "BankUnited, N.A.\nHARBOR FUND LLC\nACCOUNT # ******4321\n\
                Statement Period\nMarch 1, 2024 through March 31, 2024";
    let out = c.classify_text("scan_01.pdf", &PageText::from_text(text));
    assert_eq!(out.info.bank(), Bank::BankUnited);
    assert_eq!(out.identified_by, "content");
    assert_eq!(out.info.account_name(), Some("HARBOR FUND LLC"));
    assert_eq!(out.info.account_number_display(), Some("xxxx4321"));
    assert_eq!(out.info.statement_date(), NaiveDate::from_ymd_opt(2024, 3, 31));
}

#[test]
fn test_berkshire_identified_by_content() {
    let c = classifier(SensitiveAccountRegistry::empty());
    let text = "Berkshire Bank\nHILLTOP HOLDINGS LLC\nAccount Number: 123456789\n\
                Statement Date\n04/30/2024";
    let out = c.classify_text("scan_02.pdf", &PageText::from_text(text));
    assert_eq!(out.info.bank(), Bank::Berkshire);
    assert_eq!(out.identified_by, "content");
    assert_eq!(out.info.account_number_display(), Some("123456789"));
    assert_eq!(out.info.statement_date(), NaiveDate::from_ymd_opt(2024, 4, 30));
}

/// The printed name equals a registry entry but the masked number belongs to
/// no entry: the document keeps its own number and goes to review.
#[test]
fn test_bank_united_name_match_with_foreign_number() {
    let c = classifier(registry());
    let text = "BankUnited, N.A.\nACME CORP MMK\nACCOUNT # ******9999\n\
                Statement Date\nMarch 31, 2024";
    let out = c.classify_text("dxweb.pdf", &PageText::from_text(text));
    assert_eq!(out.info.bank(), Bank::BankUnited);
    assert_eq!(out.info.account_number_display(), Some("xxxx9999"));
    assert_ne!(out.info.account_name(), Some("ACME CORP MMK"));
    assert_eq!(out.info.match_status(), MatchStatus::RegexMatchReview);
    assert_eq!(out.info.match_basis(), MatchBasis::RegexOnly);
}

#[test]
fn test_cambridge_statement_date_marker() {
    let c = classifier(SensitiveAccountRegistry::empty());
    let text = "Cambridge Savings Bank\nHILLTOP FUND LP\nStatement Date\nJanuary 31, 2024";
    let out = c.classify_text("scan_03.pdf", &PageText::from_text(text));
    assert_eq!(out.info.bank(), Bank::Cambridge);
    assert_eq!(out.info.statement_date(), NaiveDate::from_ymd_opt(2024, 1, 31));
}
