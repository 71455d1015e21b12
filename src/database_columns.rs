// Declared mapping between item fields and storage columns.
// It is deliberately kept apart from the serde (wire) names in `item_model`,
// so the table can be renamed without touching the HTTP API and vice versa.

pub const ITEMS_TABLE: &str = "todo_items";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ItemField {
    Id,
    Title,
    Description,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub field: ItemField,
    pub column: &'static str,
}

pub const ITEM_COLUMNS: [ColumnMapping; 6] = [
    ColumnMapping {
        field: ItemField::Id,
        column: "id",
    },
    ColumnMapping {
        field: ItemField::Title,
        column: "title",
    },
    ColumnMapping {
        field: ItemField::Description,
        column: "description",
    },
    ColumnMapping {
        field: ItemField::Status,
        column: "status",
    },
    ColumnMapping {
        field: ItemField::CreatedAt,
        column: "created_at",
    },
    ColumnMapping {
        field: ItemField::UpdatedAt,
        column: "updated_at",
    },
];

pub fn column(field: ItemField) -> &'static str {
    ITEM_COLUMNS
        .iter()
        .find(|mapping| mapping.field == field)
        .map(|mapping| mapping.column)
        .unwrap_or_else(|| unreachable!("every ItemField has a column mapping"))
}

/// Comma-separated column list in mapping order, for SELECT statements.
pub fn select_list() -> String {
    ITEM_COLUMNS
        .iter()
        .map(|mapping| mapping.column)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_field_is_mapped_once() {
        for mapping in &ITEM_COLUMNS {
            let count = ITEM_COLUMNS
                .iter()
                .filter(|other| other.field == mapping.field)
                .count();
            assert_eq!(count, 1, "{:?}", mapping.field);
        }
        assert_eq!(column(ItemField::CreatedAt), "created_at");
        assert_eq!(
            select_list(),
            "id, title, description, status, created_at, updated_at"
        );
    }
}
