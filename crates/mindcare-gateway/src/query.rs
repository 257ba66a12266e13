//! Row queries
//!
//! A [`Query`] is a conjunction of column filters plus an optional ordering,
//! row limit and client embed. It renders to PostgREST query parameters for
//! the HTTP gateway and evaluates directly against JSON rows for the
//! in-memory one.

use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;

/// Column predicate
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    /// Column equals value
    Eq(Value),
    /// Column equals one of the values
    In(Vec<Value>),
}

/// Filter on one column
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
}

impl Filter {
    /// `column = value`
    pub fn eq(column: impl Into<String>, value: impl Serialize) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::Eq(to_value(value)),
        }
    }

    /// `column IN (values)`
    pub fn any_of<I, V>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Serialize,
    {
        Self {
            column: column.into(),
            op: FilterOp::In(values.into_iter().map(to_value).collect()),
        }
    }

    /// Evaluate against a JSON row
    #[must_use]
    pub fn matches(&self, row: &Value) -> bool {
        let cell = row.get(&self.column).unwrap_or(&Value::Null);
        match &self.op {
            FilterOp::Eq(value) => cell == value,
            FilterOp::In(values) => values.contains(cell),
        }
    }

    /// PostgREST `(column, predicate)` pair
    #[must_use]
    pub fn to_param(&self) -> (String, String) {
        let predicate = match &self.op {
            FilterOp::Eq(value) => format!("eq.{}", render(value)),
            FilterOp::In(values) => {
                let list = values.iter().map(render).collect::<Vec<_>>().join(",");
                format!("in.({list})")
            }
        };
        (self.column.clone(), predicate)
    }
}

fn to_value(value: impl Serialize) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Sort key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

impl Order {
    #[must_use]
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    #[must_use]
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }

    /// Compare two rows on this key; nulls sort last
    #[must_use]
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        let left = a.get(&self.column).unwrap_or(&Value::Null);
        let right = b.get(&self.column).unwrap_or(&Value::Null);
        let ordering = match (left, right) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => return Ordering::Greater,
            (_, Value::Null) => return Ordering::Less,
            (Value::Number(x), Value::Number(y)) => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
            (Value::String(x), Value::String(y)) => x.cmp(y),
            (x, y) => x.to_string().cmp(&y.to_string()),
        };
        if self.ascending {
            ordering
        } else {
            ordering.reverse()
        }
    }
}

/// Select query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
    /// Embed the owning client's name and email under `profiles`
    pub embed_client: bool,
}

impl Query {
    /// Match every visible row
    #[inline]
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    #[must_use]
    pub fn eq(self, column: impl Into<String>, value: impl Serialize) -> Self {
        self.filter(Filter::eq(column, value))
    }

    #[must_use]
    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_client(mut self) -> Self {
        self.embed_client = true;
        self
    }

    /// Check every filter against `row`
    #[must_use]
    pub fn matches(&self, row: &Value) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }

    /// Filter, sort and truncate `rows` in place
    pub fn apply(&self, rows: &mut Vec<Value>) {
        rows.retain(|row| self.matches(row));
        if let Some(order) = &self.order {
            rows.sort_by(|a, b| order.compare(a, b));
        }
        if let Some(limit) = self.limit {
            rows.truncate(limit);
        }
    }

    /// PostgREST query parameters
    #[must_use]
    pub fn to_params(&self) -> Vec<(String, String)> {
        let select = if self.embed_client {
            "*,profiles:client_id(full_name,email)"
        } else {
            "*"
        };
        let mut params = vec![("select".to_string(), select.to_string())];
        params.extend(self.filters.iter().map(Filter::to_param));
        if let Some(order) = &self.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            params.push(("order".to_string(), format!("{}.{direction}", order.column)));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_postgrest_params() {
        let query = Query::all()
            .eq("status", "pending")
            .filter(Filter::any_of("status", ["pending", "confirmed"]))
            .order(Order::asc("appointment_date"))
            .limit(5)
            .with_client();

        let params = query.to_params();
        assert_eq!(params[0].1, "*,profiles:client_id(full_name,email)");
        assert!(params.contains(&("status".to_string(), "eq.pending".to_string())));
        assert!(params.contains(&("status".to_string(), "in.(pending,confirmed)".to_string())));
        assert!(params.contains(&("order".to_string(), "appointment_date.asc".to_string())));
        assert!(params.contains(&("limit".to_string(), "5".to_string())));
    }

    #[test]
    fn applies_filters_order_and_limit() {
        let mut rows = vec![
            json!({ "n": 3, "status": "pending" }),
            json!({ "n": 1, "status": "pending" }),
            json!({ "n": 2, "status": "cancelled" }),
            json!({ "n": 4, "status": "pending" }),
        ];
        let query = Query::all()
            .eq("status", "pending")
            .order(Order::desc("n"))
            .limit(2);
        query.apply(&mut rows);

        assert_eq!(rows, vec![json!({ "n": 4, "status": "pending" }), json!({ "n": 3, "status": "pending" })]);
    }

    #[test]
    fn nulls_sort_last() {
        let order = Order::asc("d");
        assert_eq!(order.compare(&json!({ "d": null }), &json!({ "d": "2030-01-01" })), Ordering::Greater);
    }
}
