//! Typed queries over the host's `blocks`/`attributes` tables.
//!
//! A [`Query`] is assembled from named primitives and rendered either as a
//! self-contained statement with quoted literals (SiYuan's `/api/query/sql`
//! takes no bind parameters) or as a placeholder statement plus parameters
//! for the local SQLite store.

use std::fmt::Write;

/// Columns every host row carries
const COLUMNS: &str = "id, type, hpath, content, ial, created, updated";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    fn sql(&self) -> &'static str {
        match self {
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Filter {
    PathPrefix(String),
    AttrEq { name: String, value: String },
    AttrCmp { name: String, op: CmpOp, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Order {
    Created(Direction),
    Attr(String, Direction),
}

/// A query for document blocks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    filters: Vec<Filter>,
    order: Option<Order>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl Query {
    /// All document blocks
    pub fn documents() -> Self {
        Self::default()
    }

    /// Documents whose human-readable path starts with `prefix`
    pub fn path_prefix(mut self, prefix: &str) -> Self {
        self.filters.push(Filter::PathPrefix(prefix.to_string()));
        self
    }

    pub fn attr_eq(mut self, name: &str, value: &str) -> Self {
        self.filters.push(Filter::AttrEq {
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }

    /// Attribute compared as text, which orders ISO dates correctly
    pub fn attr_cmp(mut self, name: &str, op: CmpOp, value: &str) -> Self {
        self.filters.push(Filter::AttrCmp {
            name: name.to_string(),
            op,
            value: value.to_string(),
        });
        self
    }

    pub fn order_by_created(mut self, direction: Direction) -> Self {
        self.order = Some(Order::Created(direction));
        self
    }

    pub fn order_by_attr(mut self, name: &str, direction: Direction) -> Self {
        self.order = Some(Order::Attr(name.to_string(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Copy of this query with `limit` applied if none was set
    pub fn with_default_limit(&self, limit: usize) -> Self {
        let mut query = self.clone();
        if query.limit.is_none() {
            query.limit = Some(limit);
        }
        query
    }

    /// Statement with every value inlined as a quoted literal
    pub fn to_inline_sql(&self) -> String {
        let mut writer = SqlWriter::inline();
        self.write(&mut writer, COLUMNS);
        writer.sql
    }

    /// Statement with `?N` placeholders and the values to bind
    pub fn to_bound_sql(&self) -> (String, Vec<String>) {
        let mut writer = SqlWriter::bound();
        self.write(&mut writer, COLUMNS);
        (writer.sql, writer.params.unwrap_or_default())
    }

    /// Embedded query block (`{{SELECT * ...}}`) the host renders live inside a document
    pub fn to_embed(&self) -> String {
        let mut writer = SqlWriter::inline();
        self.write(&mut writer, "*");
        format!("{{{{{}}}}}", writer.sql)
    }

    fn write(&self, w: &mut SqlWriter, columns: &str) {
        let _ = write!(w.sql, "SELECT {} FROM blocks WHERE type = 'd'", columns);

        for filter in &self.filters {
            match filter {
                Filter::PathPrefix(prefix) => {
                    w.sql.push_str(" AND hpath LIKE ");
                    w.lit(&format!("{}%", escape_like(prefix)));
                    w.sql.push_str(" ESCAPE '\\'");
                }
                Filter::AttrEq { name, value } => {
                    w.sql
                        .push_str(" AND id IN (SELECT block_id FROM attributes WHERE name = ");
                    w.lit(name);
                    w.sql.push_str(" AND value = ");
                    w.lit(value);
                    w.sql.push(')');
                }
                Filter::AttrCmp { name, op, value } => {
                    w.sql
                        .push_str(" AND id IN (SELECT block_id FROM attributes WHERE name = ");
                    w.lit(name);
                    let _ = write!(w.sql, " AND value {} ", op.sql());
                    w.lit(value);
                    w.sql.push(')');
                }
            }
        }

        match &self.order {
            Some(Order::Created(direction)) => {
                let _ = write!(w.sql, " ORDER BY created {}", direction.sql());
            }
            Some(Order::Attr(name, direction)) => {
                w.sql.push_str(
                    " ORDER BY (SELECT value FROM attributes WHERE block_id = blocks.id AND name = ",
                );
                w.lit(name);
                let _ = write!(w.sql, ") {}", direction.sql());
            }
            None => {}
        }

        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => {
                let _ = write!(w.sql, " LIMIT {} OFFSET {}", limit, offset);
            }
            (Some(limit), None) => {
                let _ = write!(w.sql, " LIMIT {}", limit);
            }
            (None, Some(offset)) => {
                let _ = write!(w.sql, " LIMIT -1 OFFSET {}", offset);
            }
            (None, None) => {}
        }
    }
}

struct SqlWriter {
    sql: String,
    params: Option<Vec<String>>,
}

impl SqlWriter {
    fn inline() -> Self {
        Self {
            sql: String::new(),
            params: None,
        }
    }

    fn bound() -> Self {
        Self {
            sql: String::new(),
            params: Some(Vec::new()),
        }
    }

    fn lit(&mut self, value: &str) {
        match &mut self.params {
            Some(params) => {
                params.push(value.to_string());
                let _ = write!(self.sql, "?{}", params.len());
            }
            None => {
                self.sql.push('\'');
                self.sql.push_str(&value.replace('\'', "''"));
                self.sql.push('\'');
            }
        }
    }
}

fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
