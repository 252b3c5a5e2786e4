//! The fixed catalog of gold result sets.
//!
//! Each entry is one read-only query over the `silver` schema. The name is
//! also the name of the materialized table.

/// A named gold query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoldQuery {
    pub name: &'static str,
    pub sql: &'static str,
}

/// Score at or above which an assessment attempt counts as a pass.
pub const PASS_THRESHOLD: u32 = 70;

pub const CATALOG: &[GoldQuery] = &[
    GoldQuery {
        name: "student_overview",
        sql: "
SELECT
    s.student_id,
    s.name,
    s.email,
    s.city,
    s.signup_date
FROM silver.students s
ORDER BY s.student_id",
    },
    GoldQuery {
        name: "students_with_no_payments",
        sql: "
SELECT DISTINCT
    s.student_id,
    s.name AS student_name,
    s.email,
    s.signup_date
FROM silver.students s
LEFT JOIN silver.payments p ON s.student_id = p.student_id
WHERE p.student_id IS NULL",
    },
    GoldQuery {
        name: "student_engagement",
        sql: "
WITH enrolled_students AS (
    SELECT DISTINCT student_id FROM silver.enrollment
),
attempted_students AS (
    SELECT DISTINCT a.student_id
    FROM silver.assessment a
    JOIN silver.enrollment e ON a.student_id = e.student_id
)
SELECT
    (SELECT COUNT(*) FROM enrolled_students) AS total_enrolled_students,
    (SELECT COUNT(*) FROM attempted_students) AS students_attempted_assessment,
    ROUND(
        (SELECT COUNT(*)::NUMERIC FROM attempted_students) * 100.0 /
        NULLIF((SELECT COUNT(*) FROM enrolled_students), 0), 2
    ) AS percentage_engaged",
    },
    GoldQuery {
        name: "top_students_by_score",
        sql: "
SELECT
    a.student_id,
    s.name AS student_name,
    s.email,
    AVG(a.score) AS average_score,
    MAX(a.attempt_date) AS last_attempt_date
FROM silver.assessment a
JOIN silver.students s ON a.student_id = s.student_id
GROUP BY a.student_id, s.name, s.email
ORDER BY AVG(a.score) DESC",
    },
    GoldQuery {
        name: "monthly_revenue_summary",
        sql: "
SELECT
    DATE_TRUNC('month', p.payment_date) AS payment_month,
    SUM(p.amount) AS total_monthly_revenue
FROM silver.payments p
GROUP BY 1
ORDER BY payment_month",
    },
    GoldQuery {
        name: "top_students_by_spending",
        sql: "
SELECT
    p.student_id,
    s.name AS student_name,
    s.email,
    SUM(p.amount) AS total_spent,
    COUNT(DISTINCT p.course_id) AS courses_purchased_count,
    MAX(p.payment_date) AS last_payment_date
FROM silver.payments p
JOIN silver.students s ON p.student_id = s.student_id
GROUP BY p.student_id, s.name, s.email
ORDER BY SUM(p.amount) DESC",
    },
    GoldQuery {
        name: "course_payments_summary",
        sql: "
SELECT
    c.course_id,
    c.course_name,
    SUM(p.amount) AS total_revenue,
    COUNT(p.payment_id) AS total_payments,
    MIN(p.payment_date) AS first_payment_date,
    MAX(p.payment_date) AS last_payment_date
FROM silver.courses c
JOIN silver.payments p ON c.course_id = p.course_id
GROUP BY c.course_id, c.course_name
ORDER BY total_revenue DESC",
    },
    GoldQuery {
        name: "course_assessment_summary",
        sql: "
SELECT
    c.course_id,
    c.course_name,
    AVG(a.score) AS avg_score,
    COUNT(a.assessment_id) AS total_attempts,
    MAX(a.attempt_date) AS last_attempt_date
FROM silver.courses c
JOIN silver.assessment a ON c.course_id = a.course_id
GROUP BY c.course_id, c.course_name
ORDER BY avg_score DESC",
    },
    GoldQuery {
        name: "payment_method_distribution",
        sql: "
SELECT
    method,
    COUNT(payment_id) AS payment_count,
    SUM(amount) AS total_revenue,
    ROUND(COUNT(payment_id) * 100.0 /
        NULLIF((SELECT COUNT(*) FROM silver.payments), 0), 2
    ) AS percentage_of_payments,
    MAX(payment_date) AS last_payment_date
FROM silver.payments
GROUP BY method
ORDER BY total_revenue DESC",
    },
    GoldQuery {
        name: "students_with_active_courses",
        sql: "
SELECT
    s.student_id,
    s.name AS student_name,
    COUNT(e.enrollment_id) AS active_courses_count,
    MAX(e.enroll_date) AS last_enroll_date
FROM silver.students s
JOIN silver.enrollment e ON s.student_id = e.student_id
WHERE e.status = 'active'
GROUP BY s.student_id, s.name
ORDER BY active_courses_count DESC",
    },
    GoldQuery {
        name: "students_with_courses_not_attempted",
        sql: "
SELECT
    s.student_id,
    s.name AS student_name,
    COUNT(e.enrollment_id) AS courses_not_attempted_count,
    MAX(e.enroll_date) AS last_enroll_date
FROM silver.students s
JOIN silver.enrollment e ON s.student_id = e.student_id
LEFT JOIN silver.assessment a
    ON s.student_id = a.student_id AND e.course_id = a.course_id
WHERE a.assessment_id IS NULL
GROUP BY s.student_id, s.name
ORDER BY courses_not_attempted_count DESC",
    },
    GoldQuery {
        name: "revenue_per_course",
        sql: "
SELECT
    c.course_name,
    c.category,
    SUM(p.amount) AS total_revenue,
    DATE_TRUNC('month', p.payment_date) AS payment_month
FROM silver.courses c
JOIN silver.payments p ON c.course_id = p.course_id
GROUP BY c.course_name, c.category, DATE_TRUNC('month', p.payment_date)
ORDER BY payment_month, total_revenue DESC",
    },
    GoldQuery {
        name: "dropout_rate_per_course",
        sql: "
SELECT
    c.course_name,
    COUNT(CASE WHEN e.status = 'dropped' THEN 1 END) AS dropped_students,
    COUNT(e.student_id) AS total_enrolled_students,
    ROUND(
        COUNT(CASE WHEN e.status = 'dropped' THEN 1 END) * 100.0 /
        NULLIF(COUNT(e.student_id), 0), 2
    ) AS dropout_rate_percentage,
    MAX(e.enroll_date) AS last_enroll_date
FROM silver.courses c
JOIN silver.enrollment e ON c.course_id = e.course_id
GROUP BY c.course_name
ORDER BY dropout_rate_percentage DESC",
    },
    GoldQuery {
        name: "total_spending_per_student",
        sql: "
SELECT
    s.student_id,
    s.name AS student_name,
    SUM(p.amount) AS total_spent,
    MAX(p.payment_date) AS last_payment_date
FROM silver.students s
JOIN silver.payments p ON s.student_id = p.student_id
GROUP BY s.student_id, s.name
ORDER BY total_spent DESC",
    },
    // One row per course; only each student's latest attempt counts.
    GoldQuery {
        name: "pass_fail_rate",
        sql: "
WITH latest_attempt AS (
    SELECT
        a.course_id,
        a.student_id,
        a.score,
        a.attempt_date,
        ROW_NUMBER() OVER (
            PARTITION BY a.course_id, a.student_id
            ORDER BY a.attempt_date DESC, a.assessment_id DESC
        ) AS rn
    FROM silver.assessment a
),
per_student AS (
    SELECT
        course_id,
        student_id,
        CASE WHEN score >= 70 THEN 1 ELSE 0 END AS is_pass,
        CASE WHEN score < 70 THEN 1 ELSE 0 END AS is_fail
    FROM latest_attempt
    WHERE rn = 1
)
SELECT
    c.course_name,
    SUM(is_fail) AS failing_students,
    SUM(is_pass) AS passing_students,
    ROUND(100.0 * SUM(is_pass) / NULLIF(SUM(is_pass) + SUM(is_fail), 0), 2) AS pass_rate_percentage
FROM per_student ps
JOIN silver.courses c ON c.course_id = ps.course_id
GROUP BY c.course_name
ORDER BY pass_rate_percentage DESC, course_name",
    },
];

/// Look up a catalog entry by name.
#[must_use]
pub fn find(name: &str) -> Option<&'static GoldQuery> {
    CATALOG.iter().find(|q| q.name == name)
}
