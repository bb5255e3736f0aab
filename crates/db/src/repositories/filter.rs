//! Dynamic WHERE-clause building shared by the list queries.

use sqlx::postgres::PgArguments;
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::Postgres;

/// Typed bind value for dynamically-built queries.
pub(crate) enum BindValue {
    BigInt(i64),
    Text(String),
}

/// Accumulates `AND`-joined conditions and their bind values.
pub(crate) struct Filter {
    conditions: Vec<String>,
    binds: Vec<BindValue>,
}

impl Filter {
    pub(crate) fn new() -> Self {
        Self {
            conditions: Vec::new(),
            binds: Vec::new(),
        }
    }

    /// Index the next bind value will take.
    fn next_idx(&self) -> usize {
        self.binds.len() + 1
    }

    /// Add `column = $n` when `value` is present.
    pub(crate) fn eq_bigint(&mut self, column: &str, value: Option<i64>) -> &mut Self {
        if let Some(v) = value {
            let idx = self.next_idx();
            self.conditions.push(format!("{column} = ${idx}"));
            self.binds.push(BindValue::BigInt(v));
        }
        self
    }

    /// Add `column = $n` when `value` is present.
    pub(crate) fn eq_text(&mut self, column: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value {
            let idx = self.next_idx();
            self.conditions.push(format!("{column} = ${idx}"));
            self.binds.push(BindValue::Text(v.to_string()));
        }
        self
    }

    /// Add a case-insensitive substring match over several columns.
    ///
    /// Blank terms are ignored.
    pub(crate) fn search(&mut self, columns: &[&str], term: Option<&str>) -> &mut Self {
        let Some(term) = term.filter(|t| !t.trim().is_empty()) else {
            return self;
        };
        let idx = self.next_idx();
        let any = columns
            .iter()
            .map(|c| format!("{c} ILIKE ${idx}"))
            .collect::<Vec<_>>()
            .join(" OR ");
        self.conditions.push(format!("({any})"));
        self.binds
            .push(BindValue::Text(admissions_core::pagination::like_pattern(term)));
        self
    }

    /// `WHERE ...` or an empty string.
    pub(crate) fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    /// Placeholder index for `LIMIT`; `OFFSET` takes the one after.
    pub(crate) fn limit_idx(&self) -> usize {
        self.next_idx()
    }

    pub(crate) fn bind_as<'q, O>(
        &'q self,
        mut q: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> QueryAs<'q, Postgres, O, PgArguments> {
        for val in &self.binds {
            match val {
                BindValue::BigInt(v) => q = q.bind(*v),
                BindValue::Text(v) => q = q.bind(v.as_str()),
            }
        }
        q
    }

    pub(crate) fn bind_scalar<'q>(
        &'q self,
        mut q: QueryScalar<'q, Postgres, i64, PgArguments>,
    ) -> QueryScalar<'q, Postgres, i64, PgArguments> {
        for val in &self.binds {
            match val {
                BindValue::BigInt(v) => q = q.bind(*v),
                BindValue::Text(v) => q = q.bind(v.as_str()),
            }
        }
        q
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_has_no_where() {
        let f = Filter::new();
        assert_eq!(f.where_clause(), "");
        assert_eq!(f.limit_idx(), 1);
    }

    #[test]
    fn placeholders_are_numbered_in_order() {
        let mut f = Filter::new();
        f.eq_text("status", Some("New"))
            .eq_bigint("student_id", None)
            .search(&["lead_id", "email"], Some("ali"))
            .eq_bigint("entity_id", Some(3));
        assert_eq!(
            f.where_clause(),
            "WHERE status = $1 AND (lead_id ILIKE $2 OR email ILIKE $2) AND entity_id = $3"
        );
        assert_eq!(f.limit_idx(), 4);
    }

    #[test]
    fn blank_search_is_ignored() {
        let mut f = Filter::new();
        f.search(&["name"], Some("   "));
        assert_eq!(f.where_clause(), "");
    }
}
