//! Parameterized query construction for event searches.
//!
//! A [`QuerySpec`] is an ordered list of [`Clause`]s plus the values bound to
//! their placeholders. Clauses are generated from a fixed field order, never
//! from input order, so equal criteria always render byte-identical SQL.
//! Values are only ever bound; they never appear in the SQL text.

use seismo_map_database_models::{FilterCriteria, FilterField, FilterValue};

use crate::spatial::SpatialPredicate;

/// Name of the event catalog table.
pub const EVENTS_TABLE: &str = "sismos";

/// Column list selected for event rows.
///
/// Dates and times are selected as text and parsed client-side.
pub(crate) const ROW_COLUMNS: &str = "fecha::text AS date, hora::text AS time, \
     latitud::float8 AS latitude, longitud::float8 AS longitude, \
     profundidad::float8 AS depth_km, magnitud::float8 AS magnitude, \
     ST_X(geom) AS geom_longitude, ST_Y(geom) AS geom_latitude";

/// Comparison operator of a simple clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `>=`
    AtLeast,
    /// `<=`
    AtMost,
}

impl Operator {
    /// The SQL spelling of this operator.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::AtLeast => ">=",
            Self::AtMost => "<=",
        }
    }
}

/// Server-side cast applied to a placeholder.
///
/// Parameters are sent in binary form, so each placeholder is pinned to the
/// type its bound value is encoded as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cast {
    /// Bound as a timestamp at midnight; compares against `date` columns.
    Timestamp,
    /// Bound as text and converted to `time`.
    Time,
    /// Bound as a double.
    Float,
}

impl Cast {
    /// The cast suffix appended to the placeholder.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Timestamp => "::timestamp",
            Self::Time => "::text::time",
            Self::Float => "::float8",
        }
    }
}

/// A single predicate in the `WHERE` clause.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Clause {
    /// `column <op> $n`
    Compare {
        /// The criteria field this clause constrains.
        field: FilterField,
        /// Catalog column compared against.
        column: &'static str,
        /// Comparison operator.
        operator: Operator,
        /// Placeholder cast.
        cast: Cast,
    },
    /// Epicenter within a fixed radius of a point; binds longitude then
    /// latitude.
    WithinRadius(SpatialPredicate),
}

impl Clause {
    /// Number of placeholders this clause binds.
    #[must_use]
    pub const fn arity(&self) -> usize {
        match self {
            Self::Compare { .. } => 1,
            Self::WithinRadius(_) => 2,
        }
    }

    /// Renders the clause with placeholders numbered from `first`.
    #[must_use]
    pub fn render(&self, first: usize) -> String {
        match self {
            Self::Compare {
                column,
                operator,
                cast,
                ..
            } => format!("{column} {} ${first}{}", operator.as_sql(), cast.as_sql()),
            Self::WithinRadius(predicate) => predicate.render(first),
        }
    }
}

/// A simple comparison generated from one criteria field.
struct Comparison {
    field: FilterField,
    column: &'static str,
    operator: Operator,
    cast: Cast,
}

/// Simple comparisons in their fixed generation order. The radius clause,
/// when present, always follows them.
const COMPARISONS: [Comparison; 8] = [
    Comparison {
        field: FilterField::DateFrom,
        column: "fecha",
        operator: Operator::AtLeast,
        cast: Cast::Timestamp,
    },
    Comparison {
        field: FilterField::DateTo,
        column: "fecha",
        operator: Operator::AtMost,
        cast: Cast::Timestamp,
    },
    Comparison {
        field: FilterField::TimeFrom,
        column: "hora",
        operator: Operator::AtLeast,
        cast: Cast::Time,
    },
    Comparison {
        field: FilterField::TimeTo,
        column: "hora",
        operator: Operator::AtMost,
        cast: Cast::Time,
    },
    Comparison {
        field: FilterField::MagnitudeMin,
        column: "magnitud",
        operator: Operator::AtLeast,
        cast: Cast::Float,
    },
    Comparison {
        field: FilterField::MagnitudeMax,
        column: "magnitud",
        operator: Operator::AtMost,
        cast: Cast::Float,
    },
    Comparison {
        field: FilterField::DepthMin,
        column: "profundidad",
        operator: Operator::AtLeast,
        cast: Cast::Float,
    },
    Comparison {
        field: FilterField::DepthMax,
        column: "profundidad",
        operator: Operator::AtMost,
        cast: Cast::Float,
    },
];

/// What a query selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Full event rows.
    Rows,
    /// A single `count` column.
    Count,
}

impl Projection {
    const fn select_list(self) -> &'static str {
        match self {
            Self::Rows => ROW_COLUMNS,
            Self::Count => "COUNT(*) AS count",
        }
    }
}

/// A parameterized query against the event catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    projection: Projection,
    clauses: Vec<Clause>,
    params: Vec<FilterValue>,
}

impl QuerySpec {
    /// What this query selects.
    #[must_use]
    pub const fn projection(&self) -> Projection {
        self.projection
    }

    /// The predicate clauses, in generation order.
    #[must_use]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// The bound values, positionally matching the placeholders.
    #[must_use]
    pub fn params(&self) -> &[FilterValue] {
        &self.params
    }

    /// Total number of placeholders across all clauses.
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.clauses.iter().map(Clause::arity).sum()
    }

    /// Renders the full SQL text.
    ///
    /// Without clauses there is no `WHERE` and every row matches.
    #[must_use]
    pub fn sql(&self) -> String {
        let mut sql = format!("SELECT {} FROM {EVENTS_TABLE}", self.projection.select_list());

        let mut next = 1;
        for (i, clause) in self.clauses.iter().enumerate() {
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            sql.push_str(&clause.render(next));
            next += clause.arity();
        }

        sql
    }
}

/// The row query and count query for one search. Both share the same
/// clauses and parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    /// Selects matching events.
    pub rows: QuerySpec,
    /// Counts matching events.
    pub count: QuerySpec,
}

/// Builds [`SearchQuery`]s from [`FilterCriteria`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QueryBuilder {
    spatial: SpatialPredicate,
}

impl QueryBuilder {
    /// Creates a builder that uses `spatial` for radius searches.
    #[must_use]
    pub const fn new(spatial: SpatialPredicate) -> Self {
        Self { spatial }
    }

    /// The radius predicate used for center-point searches.
    #[must_use]
    pub const fn spatial(&self) -> SpatialPredicate {
        self.spatial
    }

    /// Builds the row and count queries for `criteria`.
    ///
    /// Populated fields become clauses in the order date, time, magnitude,
    /// depth, then the radius clause. Empty criteria produce no clauses.
    #[must_use]
    pub fn build(&self, criteria: &FilterCriteria) -> SearchQuery {
        let mut clauses = Vec::new();
        let mut params = Vec::new();

        for comparison in &COMPARISONS {
            let Some(value) = criteria.value(comparison.field) else {
                continue;
            };
            clauses.push(Clause::Compare {
                field: comparison.field,
                column: comparison.column,
                operator: comparison.operator,
                cast: comparison.cast,
            });
            params.push(value);
        }

        if let Some(center) = criteria.center_point {
            clauses.push(Clause::WithinRadius(self.spatial));
            params.extend(SpatialPredicate::params(center));
        }

        debug_assert_eq!(
            clauses.iter().map(Clause::arity).sum::<usize>(),
            params.len()
        );

        SearchQuery {
            count: QuerySpec {
                projection: Projection::Count,
                clauses: clauses.clone(),
                params: params.clone(),
            },
            rows: QuerySpec {
                projection: Projection::Rows,
                clauses,
                params,
            },
        }
    }
}
