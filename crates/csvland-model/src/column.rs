//! Column types and the inferred schema.

use std::fmt;

use serde::Serialize;

/// Format-free discriminant of a [`ColumnType`].
///
/// The declaration order is the inference cascade: narrowest first, `Text`
/// last. A value that satisfies an earlier kind is never typed as a later one
/// unless another sampled value in the same column forces the demotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeKind {
    Integer,
    Decimal,
    Date,
    DateTime,
    Text,
}

impl TypeKind {
    /// All kinds in cascade order.
    pub const CASCADE: [TypeKind; 5] = [
        TypeKind::Integer,
        TypeKind::Decimal,
        TypeKind::Date,
        TypeKind::DateTime,
        TypeKind::Text,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Decimal => "DECIMAL",
            Self::Date => "DATE",
            Self::DateTime => "DATETIME",
            Self::Text => "TEXT",
        }
    }

    /// Cascade prefix ending at (and including) `self`.
    #[must_use]
    pub fn cascade_through(self) -> Vec<TypeKind> {
        Self::CASCADE
            .iter()
            .copied()
            .take_while(|kind| *kind <= self)
            .collect()
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Relational type inferred for one CSV column.
///
/// Date and datetime types keep the chrono format every sampled value
/// matched, so loading converts with exactly the format inference accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnType {
    Integer,
    Decimal { precision: u32, scale: u32 },
    Date { format: String },
    DateTime { format: String },
    Text,
}

impl ColumnType {
    #[must_use]
    pub fn kind(&self) -> TypeKind {
        match self {
            Self::Integer => TypeKind::Integer,
            Self::Decimal { .. } => TypeKind::Decimal,
            Self::Date { .. } => TypeKind::Date,
            Self::DateTime { .. } => TypeKind::DateTime,
            Self::Text => TypeKind::Text,
        }
    }

    /// SQL type name used in generated DDL.
    #[must_use]
    pub fn sql_type(&self) -> String {
        match self {
            Self::Decimal { precision, scale } => format!("DECIMAL({precision},{scale})"),
            other => other.kind().label().to_string(),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql_type())
    }
}

/// Inference result for a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnProfile {
    /// Normalized header name.
    pub name: String,
    /// Candidate kinds evaluated, in cascade order, ending at the chosen kind.
    pub evaluated: Vec<TypeKind>,
    pub column_type: ColumnType,
    pub nullable: bool,
    /// Sampled values that were non-empty after trimming.
    pub non_empty: usize,
    /// Sampled values that were empty or whitespace-only.
    pub empty: usize,
    /// Longest non-empty sampled value, in characters.
    pub max_length: usize,
}

/// Ordered column profiles for one file, in header order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InferredSchema {
    pub columns: Vec<ColumnProfile>,
    /// Data rows that contributed to the profiles.
    pub rows_sampled: usize,
    /// Sampled rows skipped because their field count differed from the header.
    pub rows_skipped: usize,
    /// Sampled values that could not be decoded in the configured encoding.
    pub undecodable_values: usize,
}

impl InferredSchema {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cascade_is_declaration_order() {
        let mut sorted = TypeKind::CASCADE.to_vec();
        sorted.sort();
        assert_eq!(sorted, TypeKind::CASCADE.to_vec());
    }

    #[test]
    fn cascade_through_includes_target() {
        assert_eq!(TypeKind::Integer.cascade_through(), vec![TypeKind::Integer]);
        assert_eq!(
            TypeKind::Date.cascade_through(),
            vec![TypeKind::Integer, TypeKind::Decimal, TypeKind::Date]
        );
        assert_eq!(TypeKind::Text.cascade_through().len(), 5);
    }

    #[test]
    fn sql_type_names() {
        assert_eq!(ColumnType::Integer.sql_type(), "INTEGER");
        assert_eq!(
            ColumnType::Decimal {
                precision: 10,
                scale: 2
            }
            .sql_type(),
            "DECIMAL(10,2)"
        );
        assert_eq!(
            ColumnType::Date {
                format: "%Y-%m-%d".to_string()
            }
            .sql_type(),
            "DATE"
        );
        assert_eq!(ColumnType::Text.to_string(), "TEXT");
    }

    #[test]
    fn column_type_serializes_with_kind_tag() {
        let json = serde_json::to_value(ColumnType::Decimal {
            precision: 3,
            scale: 1,
        })
        .unwrap();
        assert_eq!(json["kind"], "DECIMAL");
        assert_eq!(json["precision"], 3);
    }
}
