//! Integration tests for the `booker` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to drive the slots, book,
//! cancel, list, audit and services subcommands through the actual binary,
//! against a booking file in a fresh temp directory. The clock is frozen with
//! `--now` so results don't depend on when the tests run.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const NOW: &str = "2024-06-10T10:07";
const DATE: &str = "2024-06-10";

const ENV_VARS: &[&str] = &[
    "BOOKING_STORE",
    "BOOKING_OWNER",
    "BOOKING_OPEN_HOUR",
    "BOOKING_CLOSE_HOUR",
    "BOOKING_SLOT_MINUTES",
    "BOOKING_DELETE_POLICY",
    "BOOKING_NOW",
];

/// Helper: a `booker` command with a clean environment, run inside `dir` and
/// pointed at `dir/bookings.json`, with the clock frozen at `NOW`.
fn booker(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("booker").unwrap();
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.current_dir(dir.path())
        .env("RUST_LOG", "off")
        .arg("--store")
        .arg(store_path(dir.path()))
        .arg("--now")
        .arg(NOW);
    cmd
}

fn store_path(dir: &Path) -> std::path::PathBuf {
    dir.join("bookings.json")
}

/// Helper: book `time` on `DATE` as `owner`.
fn book(dir: &TempDir, owner: &str, time: &str) -> assert_cmd::assert::Assert {
    booker(dir)
        .args(["--owner", owner, "book", "--date", DATE, "--time", time])
        .args(["--name", "John Doe", "--contact", "555-1234"])
        .assert()
}

/// Helper: stdout of a command as a string.
fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "command failed: {:?}", output);
    String::from_utf8(output.stdout).unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Slots subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn slots_on_empty_store_start_at_next_boundary() {
    let dir = TempDir::new().unwrap();
    let out = stdout_of(booker(&dir).args(["slots", "--date", DATE]));
    let lines: Vec<&str> = out.lines().collect();

    assert_eq!(lines.first(), Some(&"10:30"));
    assert_eq!(lines.last(), Some(&"16:30"));
    assert_eq!(lines.len(), 13);
}

#[test]
fn slots_json_output_is_an_array() {
    let dir = TempDir::new().unwrap();
    let out = stdout_of(booker(&dir).args(["slots", "--date", "2024-06-11", "--json"]));
    let slots: Vec<String> = serde_json::from_str(out.trim()).unwrap();

    assert_eq!(slots.len(), 16);
    assert_eq!(slots[0], "09:00");
    assert_eq!(slots[15], "16:30");
}

#[test]
fn slots_for_past_date_reports_none() {
    let dir = TempDir::new().unwrap();
    booker(&dir)
        .args(["slots", "--date", "2024-06-09"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No available slots for this date."));
}

#[test]
fn slots_rejects_bad_date() {
    let dir = TempDir::new().unwrap();
    booker(&dir)
        .args(["slots", "--date", "June 10"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid date"));
}

#[test]
fn slot_width_from_environment() {
    let dir = TempDir::new().unwrap();
    let out = stdout_of(
        booker(&dir)
            .env("BOOKING_SLOT_MINUTES", "60")
            .args(["slots", "--date", DATE]),
    );
    let lines: Vec<&str> = out.lines().collect();

    assert_eq!(lines, vec!["11:00", "12:00", "13:00", "14:00", "15:00", "16:00"]);
}

#[test]
fn malformed_now_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("booker").unwrap();
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.current_dir(dir.path())
        .env("RUST_LOG", "off")
        .env("BOOKING_NOW", "10:07")
        .args(["slots", "--date", DATE])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid --now value"));
}

#[test]
fn invalid_hours_are_rejected() {
    let dir = TempDir::new().unwrap();
    booker(&dir)
        .args(["--open-hour", "17", "--close-hour", "9", "slots", "--date", DATE])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid schedule configuration"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Book subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn book_then_slot_disappears() {
    let dir = TempDir::new().unwrap();
    book(&dir, "alice", "10:30")
        .success()
        .stdout(predicate::str::contains("Appointment booked successfully!"));

    assert!(store_path(dir.path()).exists());

    let out = stdout_of(booker(&dir).args(["slots", "--date", DATE]));
    assert!(!out.lines().any(|l| l == "10:30"));
    assert_eq!(out.lines().next(), Some("11:00"));
}

#[test]
fn booking_a_taken_slot_is_a_conflict() {
    let dir = TempDir::new().unwrap();
    book(&dir, "alice", "10:30").success();

    book(&dir, "bob", "10:30")
        .failure()
        .code(3)
        .stderr(predicate::str::contains(
            "This time slot is no longer available. Please choose another one.",
        ))
        .stderr(predicate::str::contains("overlaps the 10:30 booking by 30 minutes"));
}

#[test]
fn off_grid_overlap_is_a_conflict() {
    let dir = TempDir::new().unwrap();
    book(&dir, "alice", "10:30").success();

    book(&dir, "bob", "10:45")
        .failure()
        .code(3)
        .stderr(predicate::str::contains("by 15 minutes"));
}

#[test]
fn booking_an_elapsed_slot_is_a_conflict() {
    let dir = TempDir::new().unwrap();
    book(&dir, "alice", "09:30")
        .failure()
        .code(3)
        .stderr(predicate::str::contains("already started"));
}

#[test]
fn blank_name_is_rejected() {
    let dir = TempDir::new().unwrap();
    booker(&dir)
        .args(["book", "--date", DATE, "--time", "11:00"])
        .args(["--name", "  ", "--contact", "555-1234"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("please fill in all fields"));

    assert!(!store_path(dir.path()).exists());
}

#[test]
fn unknown_service_lists_the_menu() {
    let dir = TempDir::new().unwrap();
    booker(&dir)
        .args(["book", "--date", DATE, "--time", "11:00"])
        .args(["--name", "John", "--contact", "555", "--service", "Perm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Available services"));
}

// ─────────────────────────────────────────────────────────────────────────────
// List and cancel subcommands
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn list_with_no_bookings() {
    let dir = TempDir::new().unwrap();
    booker(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No appointments booked yet."));
}

#[test]
fn list_splits_mine_from_others() {
    let dir = TempDir::new().unwrap();
    book(&dir, "alice", "14:00").success();
    book(&dir, "alice", "11:00").success();
    book(&dir, "bob", "12:00").success();

    let out = stdout_of(booker(&dir).args(["--owner", "alice", "list", "--json"]));
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();

    let mine = value["mine"].as_array().unwrap();
    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0]["time"], "11:00");
    assert_eq!(mine[1]["time"], "14:00");
    assert_eq!(value["others"][0]["bookedBy"], "bob");

    booker(&dir)
        .args(["--owner", "alice", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Your Booked Appointments"))
        .stdout(predicate::str::contains("Other Booked Appointments"))
        .stdout(predicate::str::contains("booked by bob"));
}

fn first_booking_id(dir: &TempDir, owner: &str) -> String {
    let out = stdout_of(booker(dir).args(["--owner", owner, "list", "--json"]));
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    value["mine"][0]["id"].as_str().unwrap().to_string()
}

#[test]
fn cancel_frees_the_slot() {
    let dir = TempDir::new().unwrap();
    book(&dir, "alice", "10:30").success();
    let id = first_booking_id(&dir, "alice");

    booker(&dir)
        .args(["--owner", "alice", "cancel", "--id", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Appointment deleted successfully!"));

    let out = stdout_of(booker(&dir).args(["slots", "--date", DATE]));
    assert_eq!(out.lines().next(), Some("10:30"));
}

#[test]
fn shared_policy_lets_anyone_cancel() {
    let dir = TempDir::new().unwrap();
    book(&dir, "alice", "10:30").success();
    let id = first_booking_id(&dir, "alice");

    booker(&dir)
        .args(["--owner", "bob", "cancel", "--id", &id])
        .assert()
        .success();
}

#[test]
fn owner_only_policy_refuses_other_clients() {
    let dir = TempDir::new().unwrap();
    book(&dir, "alice", "10:30").success();
    let id = first_booking_id(&dir, "alice");

    booker(&dir)
        .env("BOOKING_DELETE_POLICY", "owner-only")
        .args(["--owner", "bob", "cancel", "--id", &id])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Not allowed"));

    booker(&dir)
        .env("BOOKING_DELETE_POLICY", "owner-only")
        .args(["--owner", "alice", "cancel", "--id", &id])
        .assert()
        .success();
}

#[test]
fn cancel_unknown_id_fails() {
    let dir = TempDir::new().unwrap();
    booker(&dir)
        .args(["cancel", "--id", "6f1c7a8e-2f1e-4a4b-9a53-0d6c1c3a9b10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Booking not found"));
}

#[test]
fn cancel_rejects_malformed_id() {
    let dir = TempDir::new().unwrap();
    booker(&dir)
        .args(["cancel", "--id", "not-a-uuid"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid booking id"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Audit and services subcommands
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn audit_clean_store() {
    let dir = TempDir::new().unwrap();
    book(&dir, "alice", "10:30").success();
    book(&dir, "bob", "11:00").success();

    booker(&dir)
        .arg("audit")
        .assert()
        .success()
        .stdout(predicate::str::contains("No double bookings found."));
}

#[test]
fn audit_reports_double_booking() {
    let dir = TempDir::new().unwrap();
    let record = |id: &str, time: &str, by: &str| {
        serde_json::json!({
            "id": id,
            "date": DATE,
            "time": time,
            "clientName": "John Doe",
            "clientContact": "555-1234",
            "service": "Haircut",
            "bookedBy": by,
            "createdAt": "2024-06-09T12:00:00Z"
        })
    };
    let bookings = serde_json::json!([
        record("6f1c7a8e-2f1e-4a4b-9a53-0d6c1c3a9b10", "10:30", "alice"),
        record("0b7e1f7c-9a4c-4e0f-8c55-2a9f5d3e6b21", "10:45", "bob"),
    ]);
    std::fs::write(store_path(dir.path()), bookings.to_string()).unwrap();

    booker(&dir)
        .arg("audit")
        .assert()
        .failure()
        .stdout(predicate::str::contains("10:30 overlaps 10:45 by 15 minutes"))
        .stderr(predicate::str::contains("1 double booking(s) found"));
}

#[test]
fn corrupt_store_is_reported() {
    let dir = TempDir::new().unwrap();
    std::fs::write(store_path(dir.path()), "{not json").unwrap();

    booker(&dir)
        .args(["slots", "--date", DATE])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read bookings"));
}

#[test]
fn services_lists_the_menu() {
    let dir = TempDir::new().unwrap();
    booker(&dir)
        .arg("services")
        .assert()
        .success()
        .stdout("Haircut\nBeard Trim\nShave\nHaircut & Beard Trim\n");
}
