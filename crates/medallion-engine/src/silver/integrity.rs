//! Cross-table foreign key pass.
//!
//! Runs after all five tables are cleaned, against the student and course
//! ids that survived, so children of a rejected parent are cascaded out.

use std::collections::HashSet;

use medallion_types::{Assessment, Course, Enrollment, Numeric, Payment, Reason, SilverRecord, Student};

use crate::silver::audit::AuditLog;
use crate::silver::rules::{TableRun, Tracked};
use crate::silver::tables::Cleaned;

/// A silver record that references a student and a course.
pub(crate) trait ForeignKeys: SilverRecord {
    fn student_id(&self) -> &Numeric;
    fn course_id(&self) -> &Numeric;
}

impl ForeignKeys for Enrollment {
    fn student_id(&self) -> &Numeric {
        &self.student_id
    }
    fn course_id(&self) -> &Numeric {
        &self.course_id
    }
}

impl ForeignKeys for Assessment {
    fn student_id(&self) -> &Numeric {
        &self.student_id
    }
    fn course_id(&self) -> &Numeric {
        &self.course_id
    }
}

impl ForeignKeys for Payment {
    fn student_id(&self) -> &Numeric {
        &self.student_id
    }
    fn course_id(&self) -> &Numeric {
        &self.course_id
    }
}

/// Surviving parent keys.
pub(crate) struct ParentKeys {
    students: HashSet<Numeric>,
    courses: HashSet<Numeric>,
}

impl ParentKeys {
    pub(crate) fn collect(students: &[Tracked<Student>], courses: &[Tracked<Course>]) -> Self {
        Self {
            students: students.iter().map(|s| s.record.student_id.clone()).collect(),
            courses: courses.iter().map(|c| c.record.course_id.clone()).collect(),
        }
    }

    fn resolves(&self, record: &impl ForeignKeys) -> bool {
        self.students.contains(record.student_id()) && self.courses.contains(record.course_id())
    }
}

/// Drop and audit every row whose student or course is not in `keys`.
pub(crate) fn cascade<R: ForeignKeys>(
    (rows, report): Cleaned<R>,
    keys: &ParentKeys,
    audit: &mut AuditLog,
) -> Cleaned<R> {
    debug_assert_eq!(report.table, R::TABLE);
    TableRun::resume(rows, audit, report)
        .reject_where(Reason::InvalidForeignKey, |r| !keys.resolves(r))
        .finish()
}

#[cfg(test)]
mod tests {
    use medallion_types::{PaymentMethod, RawRow, TableName};

    use super::*;
    use crate::result::TableReport;

    fn num(v: i64) -> Numeric {
        Numeric::from(v)
    }

    fn tracked<R>(record: R) -> Tracked<R> {
        Tracked {
            raw: RawRow::new([Some("raw")]),
            record,
        }
    }

    fn payment(id: i64, student: i64, course: i64) -> Tracked<Payment> {
        tracked(Payment {
            payment_id: num(id),
            student_id: num(student),
            course_id: num(course),
            amount: num(100),
            payment_date: None,
            method: PaymentMethod::Cash,
        })
    }

    #[test]
    fn children_of_missing_parents_are_rejected() {
        let students = vec![tracked(Student {
            student_id: num(1),
            name: None,
            email: None,
            city: "Pune".into(),
            signup_date: None,
        })];
        let courses = vec![tracked(Course {
            course_id: num(10),
            course_name: None,
            category: None,
            price: num(100),
            instructor: None,
        })];
        let keys = ParentKeys::collect(&students, &courses);

        let mut report = TableReport::new(TableName::Payments, 3);
        report.accepted = 3;
        let rows = vec![
            payment(1, 1, 10),
            payment(2, 2, 10),
            payment(3, 1, 11),
        ];

        let mut audit = AuditLog::new();
        let (kept, report) = cascade((rows, report), &keys, &mut audit);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].record.payment_id, num(1));
        assert_eq!(report.accepted, 1);
        assert_eq!(report.rejected, 2);
        assert!(audit
            .records()
            .iter()
            .all(|r| r.reason == Reason::InvalidForeignKey && r.table == TableName::Payments));
    }
}
