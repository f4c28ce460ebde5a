mod common;

use std::fs;

use common::{acme_with_invoice, cli, temp_home, write_export};
use predicates::{prelude::PredicateBooleanExt, str::contains};

#[test]
fn cli_version_command_prints_build_info() {
    let home = temp_home();
    cli(home.path())
        .arg("version")
        .assert()
        .success()
        .stdout(contains("Billing Core").and(contains("Book schema")));
}

#[test]
fn cli_tenant_add_then_list() {
    let home = temp_home();
    cli(home.path())
        .args(["tenant", "add", "Acme Corp", "--currency", "usd", "--email", "ops@acme.test"])
        .assert()
        .success()
        .stdout(contains("Created tenant `acme_corp` (USD)"));

    cli(home.path())
        .args(["tenant", "list"])
        .assert()
        .success()
        .stdout(contains("acme_corp").and(contains("Trial")));

    cli(home.path())
        .args(["tenant", "add", "Acme Corp", "--email", "ops@acme.test"])
        .assert()
        .failure()
        .stderr(contains("already exists"));
}

#[test]
fn cli_unknown_tenant_gets_a_suggestion() {
    let home = temp_home();
    let export = write_export(home.path(), &acme_with_invoice());
    cli(home.path())
        .args(["tenant", "import"])
        .arg(&export)
        .assert()
        .success();

    cli(home.path())
        .args(["run", "--tenant", "acne", "--date", "2025-02-01"])
        .assert()
        .failure()
        .stderr(contains("unknown tenant `acne`").and(contains("did you mean `acme`")));
}

#[test]
fn cli_rejects_unknown_job_names() {
    let home = temp_home();
    cli(home.path())
        .args(["run", "--job", "payroll", "--date", "2025-02-01"])
        .assert()
        .failure()
        .stderr(contains("unknown job `payroll`"));
}

#[test]
fn cli_run_advances_overdue_invoice_and_spools_notice() {
    let home = temp_home();
    let export = write_export(home.path(), &acme_with_invoice());
    cli(home.path())
        .args(["tenant", "import"])
        .arg(&export)
        .assert()
        .success();

    cli(home.path())
        .args(["run", "--date", "2025-02-01"])
        .assert()
        .success()
        .stdout(contains("INV-0001: none -> late_fee_applied"));

    let spool = fs::read_to_string(home.path().join("data/outbox/acme.jsonl")).expect("spool");
    assert_eq!(spool.lines().count(), 1);
    assert!(spool.contains("ap@globex.test"));

    cli(home.path())
        .args(["outbox", "--tenant", "acme"])
        .assert()
        .success()
        .stdout(contains("late_fee_applied").and(contains("Delivered")));

    cli(home.path())
        .args(["audit"])
        .assert()
        .success()
        .stdout(contains("overdue-documents"));

    // a second run on the same day changes nothing
    cli(home.path())
        .args(["run", "--date", "2025-02-01"])
        .assert()
        .success()
        .stdout(contains("->").not());
    let spool = fs::read_to_string(home.path().join("data/outbox/acme.jsonl")).expect("spool");
    assert_eq!(spool.lines().count(), 1);
}

#[test]
fn cli_dry_run_reports_without_saving() {
    let home = temp_home();
    let export = write_export(home.path(), &acme_with_invoice());
    cli(home.path())
        .args(["tenant", "import"])
        .arg(&export)
        .assert()
        .success();

    cli(home.path())
        .args(["run", "--date", "2025-03-01", "--dry-run"])
        .env("BILLING_CORE_DATE", "2025-03-01")
        .assert()
        .success()
        .stdout(contains("dry run").and(contains("late_fee_applied")));

    assert!(!home.path().join("data/outbox/acme.jsonl").exists());
    cli(home.path())
        .args(["report", "overdue", "--tenant", "acme", "--date", "2025-03-01"])
        .assert()
        .success()
        .stdout(contains("INV-0001").and(contains("none")));
}

#[test]
fn cli_reports_render_for_imported_book() {
    let home = temp_home();
    let export = write_export(home.path(), &acme_with_invoice());
    cli(home.path())
        .args(["tenant", "import"])
        .arg(&export)
        .assert()
        .success();

    cli(home.path())
        .args(["report", "aging", "--tenant", "acme", "--date", "2025-03-15"])
        .assert()
        .success()
        .stdout(contains("Globex").and(contains("100.00")));

    cli(home.path())
        .args(["report", "payables", "--tenant", "acme", "--date", "2025-03-15"])
        .assert()
        .success()
        .stdout(contains("No open bills."));
}

#[test]
fn cli_config_init_and_show() {
    let home = temp_home();
    cli(home.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(contains("Wrote"));
    assert!(home.path().join("config/config.json").exists());

    cli(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(contains("max_delivery_attempts").and(contains("termination_after_days")));
}

#[test]
fn cli_config_backups_can_be_listed_and_restored() {
    let home = temp_home();
    cli(home.path()).args(["config", "init"]).assert().success();
    cli(home.path())
        .args(["config", "backups"])
        .assert()
        .success()
        .stdout(contains("No configuration backups."));

    cli(home.path())
        .args(["config", "init", "--force"])
        .assert()
        .success()
        .stdout(contains("Previous configuration saved as config_"));

    let backups: Vec<String> = fs::read_dir(home.path().join("config/backups"))
        .expect("backups dir")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(backups.len(), 1);
    let name = &backups[0];

    cli(home.path())
        .args(["config", "backups"])
        .assert()
        .success()
        .stdout(contains(name.as_str()));
    cli(home.path())
        .args(["config", "restore", name.as_str()])
        .assert()
        .success()
        .stdout(contains("Restored configuration"));
    cli(home.path())
        .args(["config", "restore", "config_19990101_0000.json"])
        .assert()
        .failure()
        .stderr(contains("not found"));
}

#[test]
fn cli_import_rejects_non_canonical_slugs() {
    let home = temp_home();
    let mut book = acme_with_invoice();
    book.tenant.slug = "Acme Corp".into();
    let export = write_export(home.path(), &book);

    cli(home.path())
        .args(["tenant", "import"])
        .arg(&export)
        .assert()
        .failure()
        .stderr(contains("not canonical").and(contains("acme_corp")));
    assert!(!home.path().join("data/books/Acme Corp.json").exists());
}

#[test]
fn cli_tenant_backup_and_export() {
    let home = temp_home();
    cli(home.path())
        .args(["tenant", "add", "Initech", "--email", "ops@initech.test"])
        .assert()
        .success();

    cli(home.path())
        .args(["tenant", "backup", "initech", "--note", "first"])
        .assert()
        .success()
        .stdout(contains("Backup written"));
    cli(home.path())
        .args(["tenant", "backups", "initech"])
        .assert()
        .success()
        .stdout(contains("_first.json"));

    let target = home.path().join("initech.json");
    cli(home.path())
        .args(["tenant", "export", "initech"])
        .arg(&target)
        .assert()
        .success();
    assert!(target.exists());
}
