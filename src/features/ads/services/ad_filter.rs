use sqlx::{Postgres, QueryBuilder};

use crate::shared::validation::contains_pattern;

/// Optional listing criteria, combined with AND.
///
/// Built fresh for every request and rendered into the `WHERE` clause of a
/// query over `ads a` joined with the author's location as `l`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdFilter {
    /// Category ids; an ad matches if its category is any of them
    pub categories: Vec<i64>,
    /// Case-insensitive substring of the ad name
    pub text: Option<String>,
    /// Case-insensitive substring of the author's location name
    pub location: Option<String>,
    /// Inclusive lower price bound
    pub price_from: Option<i64>,
    /// Inclusive upper price bound
    pub price_to: Option<i64>,
}

impl AdFilter {
    /// Append the `WHERE` clause for the supplied criteria, if any
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        let mut first = true;

        if !self.categories.is_empty() {
            push_condition(qb, &mut first, "a.category_id = ANY(");
            qb.push_bind(self.categories.clone()).push(")");
        }

        if let Some(text) = &self.text {
            push_condition(qb, &mut first, "a.name ILIKE ");
            qb.push_bind(contains_pattern(text));
        }

        if let Some(location) = &self.location {
            push_condition(qb, &mut first, "l.name ILIKE ");
            qb.push_bind(contains_pattern(location));
        }

        if let Some(price_from) = self.price_from {
            push_condition(qb, &mut first, "a.price >= ");
            qb.push_bind(price_from);
        }

        if let Some(price_to) = self.price_to {
            push_condition(qb, &mut first, "a.price <= ");
            qb.push_bind(price_to);
        }
    }
}

fn push_condition(qb: &mut QueryBuilder<'_, Postgres>, first: &mut bool, condition: &str) {
    qb.push(if *first { " WHERE " } else { " AND " });
    qb.push(condition);
    *first = false;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(filter: &AdFilter) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT a.id FROM ads a");
        filter.push_where(&mut qb);
        qb.sql().to_string()
    }

    #[test]
    fn test_empty_filter_adds_no_clause() {
        assert_eq!(render(&AdFilter::default()), "SELECT a.id FROM ads a");
    }

    #[test]
    fn test_all_criteria_are_anded_in_order() {
        let filter = AdFilter {
            categories: vec![1, 2],
            text: Some("shirt".to_string()),
            location: Some("моск".to_string()),
            price_from: Some(10),
            price_to: Some(20),
        };

        assert_eq!(
            render(&filter),
            "SELECT a.id FROM ads a WHERE a.category_id = ANY($1) AND a.name ILIKE $2 \
             AND l.name ILIKE $3 AND a.price >= $4 AND a.price <= $5"
        );
    }

    #[test]
    fn test_single_bound_starts_the_clause() {
        let filter = AdFilter {
            price_to: Some(30),
            ..Default::default()
        };

        assert_eq!(render(&filter), "SELECT a.id FROM ads a WHERE a.price <= $1");
    }
}
