// The final SQL answer and the registration-number variant rule.

use std::fmt;

/// Highest payment not made on the first day of a month, with the employee's
/// full name, age and department.
const FINAL_QUERY: &str = concat!(
    "SELECT p.AMOUNT AS SALARY, ",
    "CONCAT(e.FIRST_NAME, ' ', e.LAST_NAME) AS NAME, ",
    "TIMESTAMPDIFF(YEAR, e.DOB, CURDATE()) AS AGE, ",
    "d.DEPARTMENT_NAME ",
    "FROM PAYMENTS p ",
    "JOIN EMPLOYEE e ON p.EMP_ID = e.EMP_ID ",
    "JOIN DEPARTMENT d ON e.DEPARTMENT = d.DEPARTMENT_ID ",
    "WHERE DAY(p.PAYMENT_TIME) <> 1 ",
    "ORDER BY p.AMOUNT DESC ",
    "LIMIT 1;",
);

/// Build the query that gets submitted. Always the same statement; the
/// variant assigned to a registration number does not change it.
pub fn build_final_query() -> String {
    FINAL_QUERY.to_string()
}

/// Question set assigned to a registration number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryVariant {
    Odd,
    Even,
}

impl QueryVariant {
    /// Parity of the trailing digit run of `reg_no`: the last two digits when
    /// there are at least two, the single digit otherwise. A number without
    /// trailing digits counts as even.
    pub fn for_reg_no(reg_no: &str) -> Self {
        let digits: Vec<u32> = reg_no
            .trim()
            .chars()
            .rev()
            .map_while(|c| c.to_digit(10))
            .take(2)
            .collect();

        // `digits` is reversed, so the units digit comes first. Parity of a
        // two-digit number only depends on its units digit.
        match digits.first() {
            Some(units) if units % 2 == 1 => QueryVariant::Odd,
            _ => QueryVariant::Even,
        }
    }
}

impl fmt::Display for QueryVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryVariant::Odd => f.write_str("odd"),
            QueryVariant::Even => f.write_str("even"),
        }
    }
}
