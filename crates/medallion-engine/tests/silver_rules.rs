//! Behavioural tests for the silver cleaning rules, driven through the
//! public `clean` entry point on hand-built bronze snapshots.

use medallion_engine::silver::{clean, CleanOutcome, RawSnapshot};
use medallion_types::{EnrollmentStatus, PaymentMethod, RawRow, RawTable, Reason, TableName};
use rstest::rstest;

fn rows<const N: usize>(cells: &[[Option<&str>; N]]) -> Vec<RawRow> {
    cells.iter().map(|r| RawRow::new(*r)).collect()
}

fn valid_student(id: &str) -> [Option<&str>; 5] {
    [Some(id), Some("Asha Rao"), Some("asha@x.com"), Some("Pune"), Some("2024-01-10")]
}

fn valid_course(id: &str) -> [Option<&str>; 5] {
    [Some(id), Some("Rust"), Some("programming"), Some("120"), Some("Ada")]
}

fn snapshot(tables: Vec<(TableName, Vec<RawRow>)>) -> RawSnapshot {
    RawSnapshot::new(tables.into_iter().map(|(t, r)| RawTable::new(t, r)))
}

fn reasons(outcome: &CleanOutcome, table: TableName) -> Vec<Reason> {
    outcome
        .audit
        .records()
        .iter()
        .filter(|r| r.table == table)
        .map(|r| r.reason)
        .collect()
}

#[test]
fn valid_rows_survive_without_audit_records() {
    let outcome = clean(&snapshot(vec![
        (TableName::Students, rows(&[valid_student("7")])),
        (TableName::Courses, rows(&[valid_course("3")])),
        (
            TableName::Enrollment,
            rows(&[[Some("1"), Some("7"), Some("3"), Some("2024-02-01"), Some("completed")]]),
        ),
        (
            TableName::Assessment,
            rows(&[[Some("1"), Some("7"), Some("3"), Some("88"), Some("2024-03-01")]]),
        ),
        (
            TableName::Payments,
            rows(&[[
                Some("1"),
                Some("7"),
                Some("3"),
                Some("120"),
                Some("2024-02-01"),
                Some("Credit Card"),
            ]]),
        ),
    ]));

    assert!(outcome.audit.is_empty());
    assert_eq!(outcome.silver.total_rows(), 5);
    assert_eq!(
        outcome.silver.enrollment[0].status,
        EnrollmentStatus::Completed
    );
    assert_eq!(outcome.silver.payments[0].method, PaymentMethod::CreditCard);
    assert!(outcome.tables.iter().all(|t| t.rejected == 0));
}

#[test]
fn student_is_normalized_and_audited_but_kept() {
    let outcome = clean(&snapshot(vec![(
        TableName::Students,
        rows(&[[Some("5"), Some("john smith"), Some(" j@x.com "), Some("Pune"), None]]),
    )]));

    let student = &outcome.silver.students[0];
    assert_eq!(student.name.as_deref(), Some("John Smith"));
    assert_eq!(student.email.as_deref(), Some("j@x.com"));
    assert_eq!(student.city, "Pune");
    assert_eq!(
        reasons(&outcome, TableName::Students),
        [Reason::WhitespaceInEmail, Reason::InvalidNameCasing]
    );

    // Snapshots hold the values as they were in bronze.
    let first = &outcome.audit.records()[0];
    assert_eq!(first.rejected_data["email"], " j@x.com ");
    assert_eq!(first.rejected_data["name"], "john smith");

    let report = &outcome.tables[0];
    assert_eq!((report.flagged, report.rejected, report.accepted), (2, 0, 1));
}

#[test]
fn payment_out_of_range_is_rejected_before_method_normalization() {
    let outcome = clean(&snapshot(vec![
        (TableName::Students, rows(&[valid_student("7")])),
        (TableName::Courses, rows(&[valid_course("3")])),
        (
            TableName::Payments,
            rows(&[
                [Some("1"), Some("7"), Some("3"), Some("600"), None, Some(" upi ")],
                [Some("2"), Some("7"), Some("3"), Some("100"), None, Some(" upi ")],
            ]),
        ),
    ]));

    assert_eq!(
        reasons(&outcome, TableName::Payments),
        [Reason::AmountOutOfRange]
    );
    let rejected = &outcome.audit.records()[0];
    assert_eq!(rejected.rejected_data["payment_id"], "1");
    assert_eq!(rejected.rejected_data["method"], " upi ");

    assert_eq!(outcome.silver.payments.len(), 1);
    assert_eq!(outcome.silver.payments[0].method, PaymentMethod::Upi);
}

#[test]
fn unknown_payment_method_is_rejected_after_normalization() {
    let outcome = clean(&snapshot(vec![
        (TableName::Students, rows(&[valid_student("7")])),
        (TableName::Courses, rows(&[valid_course("3")])),
        (
            TableName::Payments,
            rows(&[
                [Some("1"), Some("7"), Some("3"), Some("100"), None, Some("bank transfer")],
                [Some("2"), Some("7"), Some("3"), Some("100"), None, Some("crypto")],
                [Some("3"), Some("7"), Some("3"), Some("100"), None, None],
            ]),
        ),
    ]));

    assert_eq!(outcome.silver.payments.len(), 1);
    assert_eq!(
        outcome.silver.payments[0].method,
        PaymentMethod::BankTransfer
    );
    assert_eq!(
        reasons(&outcome, TableName::Payments),
        [Reason::InvalidMethod, Reason::InvalidMethod]
    );
}

#[test]
fn student_missing_city_cascades_to_children() {
    let outcome = clean(&snapshot(vec![
        (
            TableName::Students,
            rows(&[
                valid_student("7"),
                [Some("9"), Some("Ravi Kumar"), Some("r@x.com"), Some("   "), None],
            ]),
        ),
        (TableName::Courses, rows(&[valid_course("3")])),
        (
            TableName::Enrollment,
            rows(&[
                [Some("1"), Some("9"), Some("3"), None, Some("active")],
                [Some("2"), Some("7"), Some("3"), None, Some("active")],
            ]),
        ),
        (
            TableName::Assessment,
            rows(&[[Some("1"), Some("9"), Some("3"), Some("80"), None]]),
        ),
        (
            TableName::Payments,
            rows(&[[Some("1"), Some("9"), Some("3"), Some("100"), None, Some("Cash")]]),
        ),
    ]));

    assert_eq!(reasons(&outcome, TableName::Students), [Reason::MissingCity]);
    for table in [TableName::Enrollment, TableName::Assessment, TableName::Payments] {
        assert_eq!(reasons(&outcome, table), [Reason::InvalidForeignKey], "{table}");
    }
    assert_eq!(outcome.silver.students.len(), 1);
    assert_eq!(outcome.silver.enrollment.len(), 1);
    assert!(outcome.silver.assessment.is_empty());
    assert!(outcome.silver.payments.is_empty());
}

#[test]
fn child_rows_referencing_unknown_course_are_rejected() {
    let outcome = clean(&snapshot(vec![
        (TableName::Students, rows(&[valid_student("7")])),
        (
            TableName::Courses,
            rows(&[[Some("3"), Some("Rust"), Some("programming"), Some("abc"), None]]),
        ),
        (
            TableName::Enrollment,
            rows(&[[Some("1"), Some("7"), Some("3"), None, Some("active")]]),
        ),
    ]));

    assert_eq!(reasons(&outcome, TableName::Courses), [Reason::NonNumericPrice]);
    assert_eq!(
        reasons(&outcome, TableName::Enrollment),
        [Reason::InvalidForeignKey]
    );
}

#[rstest]
#[case("50", true)]
#[case("500", true)]
#[case("49.99", false)]
#[case("500.01", false)]
fn course_price_bounds(#[case] price: &str, #[case] kept: bool) {
    let outcome = clean(&snapshot(vec![(
        TableName::Courses,
        rows(&[[Some("1"), Some("Rust"), Some("programming"), Some(price), None]]),
    )]));

    assert_eq!(outcome.silver.courses.len() == 1, kept);
    let expected: &[Reason] = if kept { &[] } else { &[Reason::PriceOutOfRange] };
    assert_eq!(reasons(&outcome, TableName::Courses), expected);
}

#[rstest]
#[case("0", true)]
#[case("100", true)]
#[case("-0.01", false)]
#[case("100.01", false)]
fn assessment_score_bounds(#[case] score: &str, #[case] kept: bool) {
    let outcome = clean(&snapshot(vec![
        (TableName::Students, rows(&[valid_student("7")])),
        (TableName::Courses, rows(&[valid_course("3")])),
        (
            TableName::Assessment,
            rows(&[[Some("1"), Some("7"), Some("3"), Some(score), None]]),
        ),
    ]));

    assert_eq!(outcome.silver.assessment.len() == 1, kept);
    let expected: &[Reason] = if kept { &[] } else { &[Reason::ScoreOutOfRange] };
    assert_eq!(reasons(&outcome, TableName::Assessment), expected);
}

#[rstest]
#[case("50", true)]
#[case("500", true)]
#[case("49.99", false)]
#[case("500.01", false)]
fn payment_amount_bounds(#[case] amount: &str, #[case] kept: bool) {
    let outcome = clean(&snapshot(vec![
        (TableName::Students, rows(&[valid_student("7")])),
        (TableName::Courses, rows(&[valid_course("3")])),
        (
            TableName::Payments,
            rows(&[[Some("1"), Some("7"), Some("3"), Some(amount), None, Some("Paypal")]]),
        ),
    ]));

    assert_eq!(outcome.silver.payments.len() == 1, kept);
    let expected: &[Reason] = if kept { &[] } else { &[Reason::AmountOutOfRange] };
    assert_eq!(reasons(&outcome, TableName::Payments), expected);
}

#[rstest]
#[case("active", true)]
#[case("dropped", true)]
#[case("Active", false)]
#[case(" completed", false)]
#[case("paused", false)]
fn enrollment_status_matches_exactly(#[case] status: &str, #[case] kept: bool) {
    let outcome = clean(&snapshot(vec![
        (TableName::Students, rows(&[valid_student("7")])),
        (TableName::Courses, rows(&[valid_course("3")])),
        (
            TableName::Enrollment,
            rows(&[[Some("1"), Some("7"), Some("3"), None, Some(status)]]),
        ),
    ]));

    assert_eq!(outcome.silver.enrollment.len() == 1, kept);
    let expected: &[Reason] = if kept { &[] } else { &[Reason::InvalidStatus] };
    assert_eq!(reasons(&outcome, TableName::Enrollment), expected);
}

#[test]
fn duplicate_keys_are_dropped_silently_but_missing_keys_are_audited() {
    let outcome = clean(&snapshot(vec![(
        TableName::Students,
        rows(&[
            valid_student("1"),
            [Some("1"), Some("Other Name"), Some("o@x.com"), Some("Goa"), None],
            [None, Some("No Id"), Some("n@x.com"), Some("Goa"), None],
            [Some("abc"), Some("Bad Id"), Some("b@x.com"), Some("Goa"), None],
        ]),
    )]));

    assert_eq!(outcome.silver.students.len(), 1);
    assert_eq!(outcome.silver.students[0].city, "Pune");
    assert_eq!(
        reasons(&outcome, TableName::Students),
        [Reason::NonNumericStudentId, Reason::NonNumericStudentId]
    );
    assert_eq!(outcome.tables[0].duplicates_removed, 1);
}

#[test]
fn unparseable_dates_become_null_without_audit() {
    let outcome = clean(&snapshot(vec![(
        TableName::Students,
        rows(&[[Some("1"), Some("Asha Rao"), Some("a@x.com"), Some("Pune"), Some("someday")]]),
    )]));

    assert_eq!(outcome.silver.students[0].signup_date, None);
    assert!(outcome.audit.is_empty());
    assert_eq!(outcome.tables[0].null_dates, 1);
}

#[test]
fn empty_snapshot_produces_empty_layer() {
    let outcome = clean(&RawSnapshot::new([]));
    assert_eq!(outcome.silver.total_rows(), 0);
    assert!(outcome.audit.is_empty());
    assert_eq!(outcome.tables.len(), TableName::ALL.len());
}

#[test]
fn wide_integer_keys_stay_distinct_and_exact() {
    let ids = ["9007199254740992", "9007199254740993", "12345678901234567891"];
    let outcome = clean(&snapshot(vec![(
        TableName::Students,
        rows(&ids.map(valid_student)),
    )]));

    assert_eq!(outcome.silver.students.len(), 3);
    assert_eq!(outcome.tables[0].duplicates_removed, 0);
    assert!(outcome.audit.is_empty());
    let kept: Vec<String> = outcome
        .silver
        .students
        .iter()
        .map(|s| s.student_id.to_string())
        .collect();
    assert_eq!(kept, ids);
}
