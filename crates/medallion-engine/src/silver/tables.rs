//! The five per-table cleaning pipelines.
//!
//! Rule order is part of the contract: a row rejected by one rule is never
//! evaluated by a later one, and flag rules audit the value as it was
//! before the normalization that follows them.

use chrono::NaiveDate;
use medallion_types::{
    Assessment, Course, Enrollment, Numeric, Payment, RawRow, Reason, Student, TableName,
};

use crate::result::TableReport;
use crate::silver::audit::AuditLog;
use crate::silver::coerce;
use crate::silver::rules::{TableRun, Tracked};

pub(crate) type Cleaned<R> = (Vec<Tracked<R>>, TableReport);

fn text(raw: &RawRow, table: TableName, column: &str) -> Option<String> {
    raw.field(table, column).map(str::to_owned)
}

fn numeric(raw: &RawRow, table: TableName, column: &str) -> Option<Numeric> {
    coerce::numeric(raw.field(table, column))
}

fn date(raw: &RawRow, table: TableName, column: &str) -> Option<NaiveDate> {
    coerce::date(raw.field(table, column))
}

// ---------------------------------------------------------------------------
// Students
// ---------------------------------------------------------------------------

struct StudentDraft {
    student_id: Option<Numeric>,
    name: Option<String>,
    email: Option<String>,
    city: Option<String>,
    signup_date: Option<NaiveDate>,
}

impl StudentDraft {
    fn parse(raw: &RawRow) -> Self {
        let t = TableName::Students;
        Self {
            student_id: numeric(raw, t, "student_id"),
            name: text(raw, t, "name"),
            email: text(raw, t, "email"),
            city: text(raw, t, "city"),
            signup_date: date(raw, t, "signup_date"),
        }
    }

    /// `None` when the city is missing or blank.
    fn into_student(self) -> Option<Student> {
        let city = self.city.filter(|c| !c.trim().is_empty())?;
        Some(Student {
            student_id: self.student_id?,
            name: self.name,
            email: self.email,
            city,
            signup_date: self.signup_date,
        })
    }
}

pub(crate) fn clean_students(raw: &[RawRow], audit: &mut AuditLog) -> Cleaned<Student> {
    TableRun::start(TableName::Students, raw, audit, StudentDraft::parse)
        .dedup_by(|d| d.student_id.clone())
        .reject_where(Reason::NonNumericStudentId, |d| d.student_id.is_none())
        .refine(Reason::MissingCity, StudentDraft::into_student)
        .flag_where(Reason::WhitespaceInEmail, |s| {
            s.email.as_deref().is_some_and(|e| e.trim() != e)
        })
        .normalize(|s| {
            if let Some(email) = s.email.as_mut() {
                *email = email.trim().to_string();
            }
        })
        .flag_where(Reason::InvalidNameCasing, |s| {
            s.name.as_deref().is_some_and(|n| !coerce::is_title_case(n))
        })
        .normalize(|s| {
            if let Some(name) = s.name.as_mut() {
                *name = coerce::to_title_case(name);
            }
        })
        .count_null_dates("signup_date", |s| s.signup_date.is_none())
        .finish()
}

// ---------------------------------------------------------------------------
// Courses
// ---------------------------------------------------------------------------

struct CourseDraft {
    course_id: Option<Numeric>,
    course_name: Option<String>,
    category: Option<String>,
    price: Option<Numeric>,
    instructor: Option<String>,
}

impl CourseDraft {
    fn parse(raw: &RawRow) -> Self {
        let t = TableName::Courses;
        Self {
            course_id: numeric(raw, t, "course_id"),
            course_name: text(raw, t, "course_name"),
            category: text(raw, t, "category"),
            price: numeric(raw, t, "price"),
            instructor: text(raw, t, "instructor"),
        }
    }

    fn into_course(self) -> Option<Course> {
        Some(Course {
            course_id: self.course_id?,
            course_name: self.course_name,
            category: self.category,
            price: self.price?,
            instructor: self.instructor,
        })
    }
}

pub(crate) fn clean_courses(raw: &[RawRow], audit: &mut AuditLog) -> Cleaned<Course> {
    TableRun::start(TableName::Courses, raw, audit, CourseDraft::parse)
        .dedup_by(|d| d.course_id.clone())
        .reject_where(Reason::NonNumericCourseId, |d| d.course_id.is_none())
        .reject_where(Reason::NonNumericPrice, |d| d.price.is_none())
        .flag_where(Reason::InvalidCategoryCasing, |d| {
            d.category.as_deref().is_some_and(|c| !coerce::is_lower_case(c))
        })
        .normalize(|d| {
            if let Some(category) = d.category.as_mut() {
                *category = category.to_lowercase();
            }
        })
        .refine(Reason::PriceOutOfRange, |d| {
            d.into_course().filter(|c| c.price.between(50, 500))
        })
        .finish()
}

// ---------------------------------------------------------------------------
// Enrollment
// ---------------------------------------------------------------------------

struct EnrollmentDraft {
    enrollment_id: Option<Numeric>,
    student_id: Option<Numeric>,
    course_id: Option<Numeric>,
    enroll_date: Option<NaiveDate>,
    status: Option<String>,
}

impl EnrollmentDraft {
    fn parse(raw: &RawRow) -> Self {
        let t = TableName::Enrollment;
        Self {
            enrollment_id: numeric(raw, t, "enrollment_id"),
            student_id: numeric(raw, t, "student_id"),
            course_id: numeric(raw, t, "course_id"),
            enroll_date: date(raw, t, "enroll_date"),
            status: text(raw, t, "status"),
        }
    }

    /// `None` unless the status is exactly one of the allowed values.
    fn into_enrollment(self) -> Option<Enrollment> {
        Some(Enrollment {
            enrollment_id: self.enrollment_id?,
            student_id: self.student_id?,
            course_id: self.course_id?,
            enroll_date: self.enroll_date,
            status: self.status?.parse().ok()?,
        })
    }
}

pub(crate) fn clean_enrollment(raw: &[RawRow], audit: &mut AuditLog) -> Cleaned<Enrollment> {
    TableRun::start(TableName::Enrollment, raw, audit, EnrollmentDraft::parse)
        .dedup_by(|d| d.enrollment_id.clone())
        .reject_where(Reason::NonNumericEnrollmentId, |d| d.enrollment_id.is_none())
        .reject_where(Reason::NonNumericForeignKey, |d| {
            d.student_id.is_none() || d.course_id.is_none()
        })
        .refine(Reason::InvalidStatus, EnrollmentDraft::into_enrollment)
        .count_null_dates("enroll_date", |e| e.enroll_date.is_none())
        .finish()
}

// ---------------------------------------------------------------------------
// Assessment
// ---------------------------------------------------------------------------

struct AssessmentDraft {
    assessment_id: Option<Numeric>,
    student_id: Option<Numeric>,
    course_id: Option<Numeric>,
    score: Option<Numeric>,
    attempt_date: Option<NaiveDate>,
}

impl AssessmentDraft {
    fn parse(raw: &RawRow) -> Self {
        let t = TableName::Assessment;
        Self {
            assessment_id: numeric(raw, t, "assessment_id"),
            student_id: numeric(raw, t, "student_id"),
            course_id: numeric(raw, t, "course_id"),
            score: numeric(raw, t, "score"),
            attempt_date: date(raw, t, "attempt_date"),
        }
    }

    fn into_assessment(self) -> Option<Assessment> {
        Some(Assessment {
            assessment_id: self.assessment_id?,
            student_id: self.student_id?,
            course_id: self.course_id?,
            score: self.score?,
            attempt_date: self.attempt_date,
        })
    }
}

pub(crate) fn clean_assessment(raw: &[RawRow], audit: &mut AuditLog) -> Cleaned<Assessment> {
    TableRun::start(TableName::Assessment, raw, audit, AssessmentDraft::parse)
        .dedup_by(|d| d.assessment_id.clone())
        .reject_where(Reason::NonNumericAssessmentId, |d| d.assessment_id.is_none())
        .reject_where(Reason::NonNumericForeignKey, |d| {
            d.student_id.is_none() || d.course_id.is_none()
        })
        .reject_where(Reason::NonNumericScore, |d| d.score.is_none())
        .refine(Reason::ScoreOutOfRange, |d| {
            d.into_assessment().filter(|a| a.score.between(0, 100))
        })
        .count_null_dates("attempt_date", |a| a.attempt_date.is_none())
        .finish()
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

struct PaymentDraft {
    payment_id: Option<Numeric>,
    student_id: Option<Numeric>,
    course_id: Option<Numeric>,
    amount: Option<Numeric>,
    payment_date: Option<NaiveDate>,
    method: Option<String>,
}

impl PaymentDraft {
    fn parse(raw: &RawRow) -> Self {
        let t = TableName::Payments;
        Self {
            payment_id: numeric(raw, t, "payment_id"),
            student_id: numeric(raw, t, "student_id"),
            course_id: numeric(raw, t, "course_id"),
            amount: numeric(raw, t, "amount"),
            payment_date: date(raw, t, "payment_date"),
            method: text(raw, t, "method"),
        }
    }

    /// `None` unless the (already normalized) method is a known one.
    fn into_payment(self) -> Option<Payment> {
        Some(Payment {
            payment_id: self.payment_id?,
            student_id: self.student_id?,
            course_id: self.course_id?,
            amount: self.amount?,
            payment_date: self.payment_date,
            method: self.method?.parse().ok()?,
        })
    }
}

pub(crate) fn clean_payments(raw: &[RawRow], audit: &mut AuditLog) -> Cleaned<Payment> {
    TableRun::start(TableName::Payments, raw, audit, PaymentDraft::parse)
        .dedup_by(|d| d.payment_id.clone())
        .reject_where(Reason::NonNumericPaymentId, |d| d.payment_id.is_none())
        .reject_where(Reason::NonNumericForeignKey, |d| {
            d.student_id.is_none() || d.course_id.is_none()
        })
        .reject_where(Reason::NonNumericAmount, |d| d.amount.is_none())
        .reject_where(Reason::AmountOutOfRange, |d| {
            d.amount.as_ref().is_some_and(|a| !a.between(50, 500))
        })
        .normalize(|d| {
            if let Some(method) = d.method.as_mut() {
                *method = coerce::to_title_case(method.trim());
            }
        })
        .refine(Reason::InvalidMethod, PaymentDraft::into_payment)
        .count_null_dates("payment_date", |p| p.payment_date.is_none())
        .finish()
}

#[cfg(test)]
mod tests {
    use medallion_types::{EnrollmentStatus, PaymentMethod};

    use super::*;

    fn table<const N: usize>(rows: &[[Option<&str>; N]]) -> Vec<RawRow> {
        rows.iter().map(|r| RawRow::new(*r)).collect()
    }

    fn num(text: &str) -> Numeric {
        text.parse().unwrap()
    }

    fn reasons(audit: &AuditLog) -> Vec<Reason> {
        audit.records().iter().map(|r| r.reason).collect()
    }

    #[test]
    fn student_is_trimmed_and_title_cased_with_two_audits() {
        let raw = table(
            &[[Some("5"), Some("john smith"), Some(" j@x.com "), Some("Pune"), None]],
        );
        let mut audit = AuditLog::new();
        let (rows, report) = clean_students(&raw, &mut audit);

        assert_eq!(rows.len(), 1);
        let s = &rows[0].record;
        assert_eq!(s.student_id, num("5"));
        assert_eq!(s.name.as_deref(), Some("John Smith"));
        assert_eq!(s.email.as_deref(), Some("j@x.com"));
        assert_eq!(s.city, "Pune");
        assert_eq!(
            reasons(&audit),
            [Reason::WhitespaceInEmail, Reason::InvalidNameCasing]
        );
        assert_eq!(report.flagged, 2);
        assert_eq!(report.null_dates, 1);
        assert_eq!(audit.records()[0].rejected_data["email"], " j@x.com ");
    }

    #[test]
    fn student_with_blank_city_is_rejected_before_casing_checks() {
        let raw = table(
            &[[Some("6"), Some("lower name"), None, Some("   "), None]],
        );
        let mut audit = AuditLog::new();
        let (rows, _) = clean_students(&raw, &mut audit);
        assert!(rows.is_empty());
        assert_eq!(reasons(&audit), [Reason::MissingCity]);
    }

    #[test]
    fn null_name_and_email_are_not_flagged() {
        let raw = table(
            &[[Some("7"), None, None, Some("Goa"), Some("2024-03-01")]],
        );
        let mut audit = AuditLog::new();
        let (rows, report) = clean_students(&raw, &mut audit);
        assert_eq!(rows.len(), 1);
        assert!(audit.is_empty());
        assert_eq!(report.null_dates, 0);
    }

    #[test]
    fn course_category_flagged_then_price_range_checked() {
        let raw = table(
            &[
                [Some("1"), Some("Rust"), Some("Systems"), Some("100"), Some("Ann")],
                [Some("2"), Some("Go"), Some("Systems"), Some("600"), None],
                [Some("3"), Some("C"), Some("systems"), Some("cheap"), None],
            ],
        );
        let mut audit = AuditLog::new();
        let (rows, report) = clean_courses(&raw, &mut audit);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].record.category.as_deref(), Some("systems"));
        assert_eq!(
            reasons(&audit),
            [
                Reason::NonNumericPrice,
                Reason::InvalidCategoryCasing,
                Reason::InvalidCategoryCasing,
                Reason::PriceOutOfRange,
            ]
        );
        assert_eq!(report.rejected, 2);
        assert_eq!(report.flagged, 2);
    }

    #[test]
    fn enrollment_status_must_match_exactly() {
        let raw = table(
            &[
                [Some("1"), Some("1"), Some("1"), Some("01/02/2024"), Some("active")],
                [Some("2"), Some("1"), Some("1"), None, Some("Active")],
                [Some("3"), Some("1"), Some("x"), None, Some("active")],
                [Some("4"), Some("1"), Some("1"), None, None],
            ],
        );
        let mut audit = AuditLog::new();
        let (rows, _) = clean_enrollment(&raw, &mut audit);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].record.status, EnrollmentStatus::Active);
        assert_eq!(
            rows[0].record.enroll_date,
            NaiveDate::from_ymd_opt(2024, 1, 2)
        );
        assert_eq!(
            reasons(&audit),
            [
                Reason::NonNumericForeignKey,
                Reason::InvalidStatus,
                Reason::InvalidStatus,
            ]
        );
    }

    #[test]
    fn assessment_score_range_is_inclusive() {
        let raw = table(
            &[
                [Some("1"), Some("1"), Some("1"), Some("0"), None],
                [Some("2"), Some("1"), Some("1"), Some("100"), None],
                [Some("3"), Some("1"), Some("1"), Some("100.01"), None],
                [Some("4"), Some("1"), Some("1"), Some("-1"), None],
                [Some("5"), Some("1"), Some("1"), Some("n/a"), None],
            ],
        );
        let mut audit = AuditLog::new();
        let (rows, _) = clean_assessment(&raw, &mut audit);

        assert_eq!(rows.len(), 2);
        assert_eq!(
            reasons(&audit),
            [
                Reason::NonNumericScore,
                Reason::ScoreOutOfRange,
                Reason::ScoreOutOfRange,
            ]
        );
    }

    #[test]
    fn payment_amount_checked_before_method() {
        let raw = table(
            &[[Some("1"), Some("7"), Some("3"), Some("600"), None, Some(" upi ")]],
        );
        let mut audit = AuditLog::new();
        let (rows, _) = clean_payments(&raw, &mut audit);
        assert!(rows.is_empty());
        assert_eq!(reasons(&audit), [Reason::AmountOutOfRange]);
        assert_eq!(audit.records()[0].rejected_data["method"], " upi ");
    }

    #[test]
    fn payment_method_normalized_without_audit() {
        let raw = table(
            &[
                [Some("1"), Some("7"), Some("3"), Some("50"), None, Some(" upi ")],
                [Some("2"), Some("7"), Some("3"), Some("500"), None, Some("BANK TRANSFER")],
                [Some("3"), Some("7"), Some("3"), Some("75"), None, Some("crypto")],
                [Some("4"), Some("7"), Some("3"), Some("75"), None, None],
            ],
        );
        let mut audit = AuditLog::new();
        let (rows, _) = clean_payments(&raw, &mut audit);

        let methods: Vec<PaymentMethod> = rows.iter().map(|r| r.record.method).collect();
        assert_eq!(methods, [PaymentMethod::Upi, PaymentMethod::BankTransfer]);
        assert_eq!(reasons(&audit), [Reason::InvalidMethod, Reason::InvalidMethod]);
    }

    #[test]
    fn duplicate_keys_keep_first_seen_silently() {
        let raw = table(
            &[
                [Some("1"), Some("First"), Some("web"), Some("60"), None],
                [Some("1.0"), Some("Second"), Some("web"), Some("70"), None],
            ],
        );
        let mut audit = AuditLog::new();
        let (rows, report) = clean_courses(&raw, &mut audit);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].record.course_name.as_deref(), Some("First"));
        assert_eq!(report.duplicates_removed, 1);
        assert!(audit.is_empty());
    }
}
