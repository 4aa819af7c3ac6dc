use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::models::Category;

/// Id/name pairs for every category, used by the category pickers.
pub fn fetch_categories(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt = conn
        .prepare("SELECT id, nome FROM categorias ORDER BY id")
        .context("failed to prepare category query")?;

    let categories = stmt
        .query_map([], |row| {
            Ok(Category {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })
        .context("failed to load categories")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect categories")?;

    Ok(categories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_store;

    #[test]
    fn lists_seeded_categories() {
        let conn = test_store();
        let names: Vec<String> = fetch_categories(&conn)
            .unwrap()
            .into_iter()
            .map(|category| category.name)
            .collect();

        assert_eq!(
            names,
            vec!["Fantasia", "Mistério", "Terror", "Ficção Científica", "Romance"]
        );
    }
}
