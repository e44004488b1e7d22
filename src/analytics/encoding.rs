use crate::data::model::{Value, columns};

/// Fixed category → code table for one column. Values outside the table have
/// no code.
#[derive(Debug, Clone, Copy)]
pub struct Encoding {
    pub column: &'static str,
    table: &'static [(&'static str, i64)],
}

impl Encoding {
    pub fn code(&self, value: &Value) -> Option<f64> {
        let label = value.as_str()?;
        self.table
            .iter()
            .find(|(name, _)| *name == label)
            .map(|&(_, code)| code as f64)
    }

    pub fn labels(&self) -> impl Iterator<Item = &'static str> {
        self.table.iter().map(|(name, _)| *name)
    }
}

pub const OCCUPATION: Encoding = Encoding {
    column: columns::OCCUPATION,
    table: &[
        ("Accountant", 0),
        ("Architect", 1),
        ("Developer", 2),
        ("Doctor", 3),
        ("Engineer", 4),
        ("Entrepreneur", 5),
        ("Journalist", 6),
        ("Lawyer", 7),
        ("Manager", 8),
        ("Mechanic", 9),
        ("Media_Manager", 10),
        ("Musician", 11),
        ("Scientist", 12),
        ("Teacher", 13),
        ("Writer", 14),
    ],
};

pub const CREDIT_MIX: Encoding = Encoding {
    column: columns::CREDIT_MIX,
    table: &[("Bad", 0), ("Standard", 1), ("Good", 2)],
};

pub const CREDIT_SCORE: Encoding = Encoding {
    column: columns::CREDIT_SCORE,
    table: &[("Poor", 0), ("Standard", 1), ("Good", 2)],
};

pub const MONTH: Encoding = Encoding {
    column: columns::MONTH,
    table: &[
        ("January", 1),
        ("February", 2),
        ("March", 3),
        ("April", 4),
        ("May", 5),
        ("June", 6),
        ("July", 7),
        ("August", 8),
    ],
};

pub static ALL: [Encoding; 4] = [OCCUPATION, CREDIT_MIX, CREDIT_SCORE, MONTH];

/// The encoding for a categorical column, if it has one.
pub fn for_column(column: &str) -> Option<&'static Encoding> {
    ALL.iter().find(|e| e.column == column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lawyer_is_seven() {
        assert_eq!(OCCUPATION.code(&Value::from("Lawyer")), Some(7.0));
        assert_eq!(OCCUPATION.code(&Value::from("Writer")), Some(14.0));
    }

    #[test]
    fn unknown_or_non_text_values_have_no_code() {
        assert_eq!(OCCUPATION.code(&Value::from("Astronaut")), None);
        assert_eq!(OCCUPATION.code(&Value::from("lawyer")), None);
        assert_eq!(OCCUPATION.code(&Value::Missing), None);
        assert_eq!(OCCUPATION.code(&Value::Number(7.0)), None);
    }

    #[test]
    fn codes_are_unique_per_column() {
        for enc in ALL.iter() {
            let mut codes: Vec<_> = enc.table.iter().map(|(_, c)| *c).collect();
            codes.sort();
            codes.dedup();
            assert_eq!(codes.len(), enc.table.len(), "{}", enc.column);
        }
    }

    #[test]
    fn lookup_by_column() {
        assert_eq!(for_column("Credit_Mix").map(|e| e.column), Some("Credit_Mix"));
        assert!(for_column("Age_Category").is_none());
        assert_eq!(MONTH.labels().count(), 8);
    }
}
